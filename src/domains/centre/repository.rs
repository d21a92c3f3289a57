use crate::domains::centre::types::{Centre, CentreRow};
use crate::errors::{DbError, DomainResult};
use async_trait::async_trait;
use sqlx::{query, query_as, Pool, Sqlite};
use uuid::Uuid;

#[async_trait]
pub trait CentreRepository: Send + Sync {
    /// All centres ordered by name
    async fn find_all(&self) -> DomainResult<Vec<Centre>>;

    async fn create(&self, name: &str) -> DomainResult<Centre>;
}

#[derive(Debug, Clone)]
pub struct SqliteCentreRepository {
    pool: Pool<Sqlite>,
}

impl SqliteCentreRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CentreRepository for SqliteCentreRepository {
    async fn find_all(&self) -> DomainResult<Vec<Centre>> {
        let rows = query_as::<_, CentreRow>("SELECT id, centre_name FROM centres ORDER BY centre_name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(CentreRow::into_entity).collect()
    }

    async fn create(&self, name: &str) -> DomainResult<Centre> {
        let centre = Centre {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
        };

        query("INSERT INTO centres (id, centre_name) VALUES (?, ?)")
            .bind(centre.id.to_string())
            .bind(&centre.name)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(centre)
    }
}
