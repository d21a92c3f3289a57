use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An organizational grouping of core devotees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centre {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CentreRow {
    pub id: String,
    pub centre_name: String,
}

impl CentreRow {
    pub fn into_entity(self) -> DomainResult<Centre> {
        Ok(Centre {
            id: Uuid::parse_str(&self.id).map_err(|_| DomainError::InvalidUuid(self.id.clone()))?,
            name: self.centre_name,
        })
    }
}
