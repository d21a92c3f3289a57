//! Donation tracking core: sessions, the Ekadashi calendar window,
//! role-scoped contact and donation queries, totals and exports.

// Public modules
pub mod auth;
pub mod config;
pub mod database;
pub mod domains;
pub mod errors;
pub mod globals;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

pub use config::AppConfig;
pub use db_migration::initialize_database;

use crate::errors::ServiceResult;

/// Install `env_logger`; `RUST_LOG` wins, otherwise `info`. Safe to call twice.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Open the database, apply migrations and set up token signing.
/// Must be called before any service is used.
pub async fn initialize(config: &AppConfig) -> ServiceResult<sqlx::SqlitePool> {
    init_logging();
    log::info!("Starting initialization");

    auth::jwt::initialize(auth::jwt::JwtSettings::new(
        &config.jwt_secret,
        config.access_token_minutes,
        config.refresh_token_days,
    ));

    let pool = database::connect(&config.database_url, config.max_connections).await?;
    db_migration::initialize_database(&pool).await?;
    globals::set_db_pool(pool.clone());

    log::info!("Initialization complete");
    Ok(pool)
}
