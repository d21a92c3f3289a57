use crate::errors::{DbError, DomainError, ServiceError, ServiceResult};
use crate::auth::{AuthRepository, jwt};
use crate::auth::repository::SqliteAuthRepository;
use uuid::Uuid;
use argon2::{Argon2, PasswordHash, PasswordVerifier, PasswordHasher, password_hash::SaltString};
// argon2 expects the rand_core 0.6 RNG
use rand_core::OsRng as ArgonOsRng;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;

/// An authenticated session as handed out by the store
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub access_expiry: DateTime<Utc>,
    /// Only present on sessions created by a sign-in or refresh
    pub refresh_token: Option<String>,
    pub refresh_expiry: Option<DateTime<Utc>>,
}

/// The identity backend: who is signed in, and signing in and out.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The active session for an access token, `None` when it is missing,
    /// expired, revoked or malformed.
    async fn get_session(&self, access_token: &str) -> ServiceResult<Option<Session>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ServiceResult<Session>;

    /// Revoke the session's tokens
    async fn sign_out(&self, session: &Session) -> ServiceResult<()>;
}

/// Session store backed by the `users` and `revoked_tokens` tables
pub struct SqliteSessionStore {
    auth_repo: Arc<dyn AuthRepository>,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            auth_repo: Arc::new(SqliteAuthRepository::new(pool)),
        }
    }

    /// Create an active account. Used for seeding and by administrators of the data store.
    pub async fn create_user(&self, email: &str, password: &str) -> ServiceResult<Uuid> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Authentication("Email and password are required".to_string()));
        }
        let hash = hash_password(password)?;
        let id = self.auth_repo.create_user(email, &hash).await?;
        log::info!("Created user account {}", id);
        Ok(id)
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh_session(&self, refresh_token: &str) -> ServiceResult<Session> {
        let claims = jwt::verify_token(refresh_token)?;
        if self.is_revoked(&claims.jti).await? {
            return Err(ServiceError::Authentication("Token has been revoked".to_string()));
        }

        let (user_id, access_token, access_expiry) = jwt::refresh_access_token(refresh_token)?;
        let refresh_expiry = claims.refresh_exp.and_then(|ts| DateTime::from_timestamp(ts, 0));

        Ok(Session {
            user_id,
            access_token,
            access_expiry,
            refresh_token: Some(refresh_token.to_string()),
            refresh_expiry,
        })
    }

    /// Drop blocklist entries whose tokens have expired anyway
    pub async fn purge_expired_revocations(&self) -> ServiceResult<u64> {
        Ok(self.auth_repo.delete_expired_revoked_tokens().await?)
    }

    async fn is_revoked(&self, jti: &str) -> ServiceResult<bool> {
        let revoked = self.auth_repo.is_token_revoked(jti).await?;
        if revoked {
            log::warn!("Attempted to use revoked token JTI: {}", jti);
        }
        Ok(revoked)
    }

    async fn revoke(&self, token: &str, user_id: Uuid) {
        match jwt::decode_unverified(token) {
            Ok(claims) => {
                let expiry = claims.refresh_exp.unwrap_or(claims.exp);
                if let Err(e) = self.auth_repo.add_revoked_token(&claims.jti, expiry).await {
                    log::error!("Failed to add token JTI {} to blocklist: {}", claims.jti, e);
                }
            }
            Err(e) => log::error!("Failed to decode token during logout for user {}: {}", user_id, e),
        }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get_session(&self, access_token: &str) -> ServiceResult<Option<Session>> {
        let claims = match jwt::verify_token(access_token) {
            Ok(claims) => claims,
            Err(ServiceError::SessionExpired) | Err(ServiceError::Authentication(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        // Refresh tokens do not grant page access
        if claims.refresh_exp.is_some() || self.is_revoked(&claims.jti).await? {
            return Ok(None);
        }

        let user_id = match jwt::user_id_from_claims(&claims) {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        Ok(Some(Session {
            user_id,
            access_token: access_token.to_string(),
            access_expiry: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
            refresh_token: None,
            refresh_expiry: None,
        }))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ServiceResult<Session> {
        let user = match self.auth_repo.find_user_by_email(email).await {
            Ok(user) => user,
            Err(DbError::NotFound(_, _)) => {
                log::warn!("Failed login attempt for unknown email {}", email);
                return Err(ServiceError::Authentication("Invalid email or password".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !user.active {
            log::warn!("Login attempt for inactive account {}", user.id);
            return Err(ServiceError::Authentication("Account is inactive".to_string()));
        }

        if verify_password(password, &user.password_hash).is_err() {
            log::warn!("Failed login attempt for {}", user.email);
            return Err(ServiceError::Authentication("Invalid email or password".to_string()));
        }

        self.auth_repo.update_last_login(user.id).await?;

        let (access_token, access_expiry) = jwt::generate_token(&user.id, jwt::TokenType::Access)?;
        let (refresh_token, refresh_expiry) = jwt::generate_token(&user.id, jwt::TokenType::Refresh)?;

        log::info!("User {} signed in", user.id);

        Ok(Session {
            user_id: user.id,
            access_token,
            access_expiry,
            refresh_token: Some(refresh_token),
            refresh_expiry: Some(refresh_expiry),
        })
    }

    async fn sign_out(&self, session: &Session) -> ServiceResult<()> {
        self.revoke(&session.access_token, session.user_id).await;
        if let Some(refresh) = &session.refresh_token {
            self.revoke(refresh, session.user_id).await;
        }

        log::info!("User {} signed out", session.user_id);
        Ok(())
    }
}

/// Generate an argon2 hash for a new password
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut ArgonOsRng);

    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Domain(DomainError::Internal(format!("Failed to hash password: {}", e))))?
        .to_string();

    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), ServiceError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ServiceError::Domain(DomainError::Internal("Invalid password hash format".to_string())))?;

    Argon2::default().verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ServiceError::Authentication("Invalid password".to_string()))
}
