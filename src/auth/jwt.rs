use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use crate::errors::{ServiceError, ServiceResult, DomainError};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    /// Present only on refresh tokens
    pub refresh_exp: Option<i64>,
}

/// Signing secret and token lifetimes, fixed once per process
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl JwtSettings {
    pub fn new(secret: &str, access_token_minutes: i64, refresh_token_days: i64) -> Self {
        Self {
            secret: secret.to_string(),
            access_token_minutes,
            refresh_token_days,
        }
    }
}

static JWT_SETTINGS: OnceLock<JwtSettings> = OnceLock::new();

/// Token type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token (short-lived)
    Access,
    /// Refresh token (long-lived)
    Refresh,
}

/// Initialize JWT module. Later calls keep the first settings.
pub fn initialize(settings: JwtSettings) {
    JWT_SETTINGS.get_or_init(|| settings);
}

fn get_settings() -> ServiceResult<&'static JwtSettings> {
    JWT_SETTINGS.get()
        .ok_or_else(|| ServiceError::Configuration("JWT secret not initialized".to_string()))
}

/// Generate a JWT token, returning it with its expiry
pub fn generate_token(user_id: &Uuid, token_type: TokenType) -> ServiceResult<(String, DateTime<Utc>)> {
    let settings = get_settings()?;
    let now = Utc::now();

    let (expiry, refresh_exp) = match token_type {
        TokenType::Access => (now + Duration::minutes(settings.access_token_minutes), None),
        TokenType::Refresh => {
            let exp = now + Duration::days(settings.refresh_token_days);
            (exp, Some(exp.timestamp()))
        }
    };

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        jti: Uuid::new_v4().to_string(),
        refresh_exp,
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Domain(DomainError::Internal(format!("JWT encoding error: {}", e))))?;

    Ok((token, expiry))
}

/// Verify signature and expiry of a token
pub fn verify_token(token: &str) -> ServiceResult<Claims> {
    let settings = get_settings()?;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(settings.secret.as_bytes()),
        &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::SessionExpired,
        _ => ServiceError::Authentication(format!("Invalid token: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Read claims without checking expiry, for revoking tokens at logout
pub fn decode_unverified(token: &str) -> ServiceResult<Claims> {
    let settings = get_settings()?;

    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = false;

    jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| ServiceError::Authentication(format!("Invalid token: {}", e)))
}

/// Subject of a verified token
pub fn user_id_from_claims(claims: &Claims) -> ServiceResult<Uuid> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| ServiceError::Authentication("Invalid user ID in token".to_string()))
}

/// Issue a new access token from a refresh token
pub fn refresh_access_token(refresh_token: &str) -> ServiceResult<(Uuid, String, DateTime<Utc>)> {
    let claims = verify_token(refresh_token)?;

    if claims.refresh_exp.is_none() {
        return Err(ServiceError::Authentication("Not a refresh token".to_string()));
    }

    let user_id = user_id_from_claims(&claims)?;
    let (token, expiry) = generate_token(&user_id, TokenType::Access)?;
    Ok((user_id, token, expiry))
}

#[cfg(test)]
pub(crate) fn init_for_tests() {
    initialize(JwtSettings::new("test-secret-for-unit-tests", 15, 30));
}
