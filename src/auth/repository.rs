use crate::errors::{DbError, DbResult};
use sqlx::{FromRow, SqlitePool, query_as};
use uuid::Uuid;
use chrono::Utc;
use async_trait::async_trait;

/// Login credentials for one account
#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
}

#[derive(Debug, FromRow)]
struct UserCredentialsRow {
    id: String,
    email: String,
    password_hash: String,
    active: i64,
}

impl UserCredentialsRow {
    fn into_entity(self) -> DbResult<UserCredentials> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|_| DbError::Other(format!("Invalid user id '{}'", self.id)))?;
        Ok(UserCredentials {
            id,
            email: self.email,
            password_hash: self.password_hash,
            active: self.active != 0,
        })
    }
}

#[async_trait]
pub(crate) trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> DbResult<UserCredentials>;
    async fn create_user(&self, email: &str, password_hash: &str) -> DbResult<Uuid>;
    async fn update_last_login(&self, user_id: Uuid) -> DbResult<()>;
    async fn add_revoked_token(&self, jti: &str, expiry: i64) -> DbResult<()>;
    async fn is_token_revoked(&self, jti: &str) -> DbResult<bool>;
    async fn delete_expired_revoked_tokens(&self) -> DbResult<u64>;
}

pub(crate) struct SqliteAuthRepository {
    pool: SqlitePool,
}

impl SqliteAuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for SqliteAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> DbResult<UserCredentials> {
        let row = query_as::<_, UserCredentialsRow>(
            "SELECT id, email, password_hash, active FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DbError::NotFound("User".to_string(), email.to_string()))?;

        row.into_entity()
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> DbResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, active, created_at) VALUES (?, ?, ?, 1, ?)")
            .bind(id.to_string())
            .bind(email.trim())
            .bind(password_hash)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(id)
    }

    async fn update_last_login(&self, user_id: Uuid) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn add_revoked_token(&self, jti: &str, expiry: i64) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expiry) VALUES (?, ?)")
            .bind(jti)
            .bind(expiry)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?")
            .bind(jti)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(count > 0)
    }

    async fn delete_expired_revoked_tokens(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expiry < ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected())
    }
}
