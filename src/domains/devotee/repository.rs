use crate::domains::devotee::types::{DevoteeProfile, DevoteeProfileRow, NewDevoteeProfile};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, Pool, Sqlite};
use uuid::Uuid;

const PROFILE_SELECT: &str = "SELECT p.id, p.user_id, p.name, p.role, p.centre_id, c.centre_name
     FROM core_devotee_profiles p
     LEFT JOIN centres c ON c.id = p.centre_id";

/// Trait defining devotee profile repository operations
#[async_trait]
pub trait DevoteeRepository: Send + Sync {
    /// Profile for a session's user; `EntityNotFound` when the row is missing
    async fn find_by_user_id(&self, user_id: Uuid) -> DomainResult<DevoteeProfile>;

    /// All profiles ordered by name
    async fn find_all(&self) -> DomainResult<Vec<DevoteeProfile>>;

    async fn create(&self, new_profile: &NewDevoteeProfile) -> DomainResult<DevoteeProfile>;
}

/// SQLite implementation for DevoteeRepository
#[derive(Debug, Clone)]
pub struct SqliteDevoteeRepository {
    pool: Pool<Sqlite>,
}

impl SqliteDevoteeRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DevoteeRepository for SqliteDevoteeRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DomainResult<DevoteeProfile> {
        let row = query_as::<_, DevoteeProfileRow>(&format!("{} WHERE p.user_id = ?", PROFILE_SELECT))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Core devotee profile".to_string(), user_id))?;

        row.into_entity()
    }

    async fn find_all(&self) -> DomainResult<Vec<DevoteeProfile>> {
        let rows = query_as::<_, DevoteeProfileRow>(&format!("{} ORDER BY p.name ASC", PROFILE_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(DevoteeProfileRow::into_entity).collect()
    }

    async fn create(&self, new_profile: &NewDevoteeProfile) -> DomainResult<DevoteeProfile> {
        let id = Uuid::new_v4();
        query(
            "INSERT INTO core_devotee_profiles (id, user_id, name, role, centre_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(new_profile.user_id.to_string())
        .bind(new_profile.name.trim())
        .bind(new_profile.role.as_str())
        .bind(new_profile.centre_id.map(|c| c.to_string()))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_user_id(new_profile.user_id).await
    }
}
