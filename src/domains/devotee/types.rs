use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::types::UserRole;
use crate::validation::{Validate, ValidationBuilder};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A `core_devotee_profiles` row joined with its centre name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevoteeProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub centre_id: Option<Uuid>,
    pub centre_name: Option<String>,
}

/// Option entry for the admin devotee filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevoteeSummary {
    pub user_id: Uuid,
    pub name: String,
}

impl From<&DevoteeProfile> for DevoteeSummary {
    fn from(profile: &DevoteeProfile) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDevoteeProfile {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub centre_id: Option<Uuid>,
}

impl Validate for NewDevoteeProfile {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("user_id", Some(self.user_id))
            .not_nil()
            .validate()?;

        ValidationBuilder::new("name", Some(self.name.clone()))
            .not_blank()
            .max_length(120)
            .validate()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DevoteeProfileRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub centre_id: Option<String>,
    pub centre_name: Option<String>,
}

impl DevoteeProfileRow {
    pub fn into_entity(self) -> DomainResult<DevoteeProfile> {
        let parse_uuid = |s: &str| Uuid::parse_str(s).map_err(|_| DomainError::InvalidUuid(s.to_string()));

        let role = UserRole::from_str(&self.role).ok_or_else(|| {
            DomainError::Validation(ValidationError::invalid_value("role", &format!("unknown role '{}'", self.role)))
        })?;

        Ok(DevoteeProfile {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            name: self.name,
            role,
            centre_id: self.centre_id.as_deref().map(parse_uuid).transpose()?,
            centre_name: self.centre_name,
        })
    }
}
