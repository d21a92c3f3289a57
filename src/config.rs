use crate::errors::{ServiceError, ServiceResult};
use crate::types::{PaginationParams, DEFAULT_ROWS_PER_PAGE};
use std::env;

pub const DATABASE_URL_VAR: &str = "EKADASHI_DATABASE_URL";
pub const JWT_SECRET_VAR: &str = "EKADASHI_JWT_SECRET";
pub const ACCESS_TOKEN_MINUTES_VAR: &str = "EKADASHI_ACCESS_TOKEN_MINUTES";
pub const REFRESH_TOKEN_DAYS_VAR: &str = "EKADASHI_REFRESH_TOKEN_DAYS";
pub const ROWS_PER_PAGE_VAR: &str = "EKADASHI_ROWS_PER_PAGE";

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub rows_per_page: u32,
    pub max_connections: u32,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> ServiceResult<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::Configuration(format!("{} is not set", name)))
}

fn positive<T: std::str::FromStr + PartialOrd + Default>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> ServiceResult<T> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .filter(|v| *v > T::default())
            .ok_or_else(|| ServiceError::Configuration(format!("{} must be a positive number, got '{}'", name, raw))),
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> ServiceResult<Self> {
        if dotenv::dotenv().is_ok() {
            log::debug!("Loaded settings from .env");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServiceResult<Self> {
        Ok(Self {
            database_url: required(&lookup, DATABASE_URL_VAR)?,
            jwt_secret: required(&lookup, JWT_SECRET_VAR)?,
            access_token_minutes: positive(&lookup, ACCESS_TOKEN_MINUTES_VAR, 15)?,
            refresh_token_days: positive(&lookup, REFRESH_TOKEN_DAYS_VAR, 30)?,
            rows_per_page: positive(&lookup, ROWS_PER_PAGE_VAR, DEFAULT_ROWS_PER_PAGE)?,
            max_connections: 5,
        })
    }

    /// Paging for the history and contacts listings at the configured page size
    pub fn pagination(&self, page: u32) -> PaginationParams {
        PaginationParams::new(page, self.rows_per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "sqlite://ekadashi.db"),
            (JWT_SECRET_VAR, "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.access_token_minutes, 15);
        assert_eq!(config.refresh_token_days, 30);
        assert_eq!(config.rows_per_page, 10);
        assert_eq!(config.pagination(0), PaginationParams::new(1, 10));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "sqlite::memory:"),
            (JWT_SECRET_VAR, "s3cret"),
            (ACCESS_TOKEN_MINUTES_VAR, "60"),
            (ROWS_PER_PAGE_VAR, " 25 "),
        ]))
        .unwrap();

        assert_eq!(config.access_token_minutes, 60);
        assert_eq!(config.pagination(3).offset(), 50);
    }

    #[test]
    fn test_missing_required_values() {
        let err = AppConfig::from_lookup(lookup(&[(JWT_SECRET_VAR, "s3cret")])).unwrap_err();
        assert!(err.to_string().contains(DATABASE_URL_VAR));

        let err = AppConfig::from_lookup(lookup(&[(DATABASE_URL_VAR, "sqlite::memory:"), (JWT_SECRET_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        for bad in ["0", "-3", "ten"] {
            let result = AppConfig::from_lookup(lookup(&[
                (DATABASE_URL_VAR, "sqlite::memory:"),
                (JWT_SECRET_VAR, "s3cret"),
                (ROWS_PER_PAGE_VAR, bad),
            ]));
            assert!(result.is_err(), "{} should be rejected", bad);
        }
    }
}
