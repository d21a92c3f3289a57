use crate::errors::{ValidationError, DomainResult, DomainError};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

/// ISO 8601 calendar date format used for every stored date
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?\(?[0-9][0-9 ().\-]{5,18}[0-9]$").unwrap())
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(DomainError::Validation(first)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    /// Treats whitespace-only input as missing
    pub fn not_blank(mut self) -> Self {
        let blank = self.value.as_ref().map(|v| v.trim().is_empty()).unwrap_or(true);
        if blank {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value.trim()) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn phone(self) -> Self {
        self.matches_pattern(phone_regex(), "must be a valid phone number")
    }
}

/// Decimal validations
impl ValidationBuilder<Decimal> {
    pub fn positive(mut self) -> Self {
        if let Some(value) = &self.value {
            if *value <= Decimal::ZERO {
                self.errors.push(ValidationError::invalid_value(&self.field_name, "must be greater than zero"));
            }
        }
        self
    }
}

/// UUID validation helpers
impl ValidationBuilder<Uuid> {
    pub fn not_nil(mut self) -> Self {
        if let Some(value) = &self.value {
            if *value == Uuid::nil() {
                self.errors.push(ValidationError::invalid_value(
                    &self.field_name,
                    "cannot be a nil UUID"
                ));
            }
        }
        self
    }
}

/// Parse a user-entered or stored amount into a decimal.
///
/// Accepts surrounding whitespace and thousands separators ("1,250.50").
pub fn parse_amount(raw: &str, field_name: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ValidationError::required(field_name));
    }
    Decimal::from_str(&cleaned)
        .map(|d| d.normalize())
        .map_err(|_| ValidationError::format(field_name, "must be a decimal number"))
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_iso_date(raw: &str, field_name: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT)
        .map_err(|_| ValidationError::format(field_name, "must be in the format YYYY-MM-DD"))
}
