use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{parse_iso_date, Validate, ValidationBuilder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const CONTACT_REQUIRED_MESSAGE: &str = "Name and phone are required";

/// A prospective or existing donor, owned by one core devotee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner_devotee_id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub enrolment_date: NaiveDate,
    /// Owning devotee's profile name; `None` when the profile is missing
    pub owner_name: Option<String>,
}

/// Input from the add-contact form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    /// Defaults to today when absent
    pub enrolment_date: Option<NaiveDate>,
}

impl NewContact {
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

impl Validate for NewContact {
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() || self.phone.trim().is_empty() {
            return Err(DomainError::Validation(ValidationError::custom(CONTACT_REQUIRED_MESSAGE)));
        }

        ValidationBuilder::new("contact_name", Some(self.name.trim().to_string()))
            .max_length(120)
            .validate()?;

        ValidationBuilder::new("contact_number", Some(self.phone.trim().to_string()))
            .phone()
            .validate()?;

        ValidationBuilder::new("address", self.address().map(str::to_string))
            .max_length(500)
            .validate()
    }
}

/// Contact list filters. `devotee_id` is honoured for admins only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFilter {
    pub devotee_id: Option<Uuid>,
}

/// ContactRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: String,
    pub core_devotee_id: String,
    pub contact_name: String,
    pub contact_number: String,
    pub address: Option<String>,
    pub enrolment_date: String,
    pub devotee_name: Option<String>,
}

impl ContactRow {
    pub fn into_entity(self) -> DomainResult<Contact> {
        let parse_uuid = |s: &str| Uuid::parse_str(s).map_err(|_| DomainError::InvalidUuid(s.to_string()));

        Ok(Contact {
            id: parse_uuid(&self.id)?,
            owner_devotee_id: parse_uuid(&self.core_devotee_id)?,
            name: self.contact_name,
            phone: self.contact_number,
            address: self.address,
            enrolment_date: parse_iso_date(&self.enrolment_date, "enrolment_date")?,
            owner_name: self.devotee_name,
        })
    }
}
