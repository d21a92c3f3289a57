use crate::errors::{ServiceError, ServiceResult};
use sqlx::SqlitePool;
use std::sync::Mutex;
use lazy_static::lazy_static;

// Global state definitions
lazy_static! {
    static ref DB_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);
}

pub fn set_db_pool(pool: SqlitePool) {
    if let Ok(mut guard) = DB_POOL.lock() {
        *guard = Some(pool);
    }
}

/// Get the database pool set up by `initialize`
pub fn get_db_pool() -> ServiceResult<SqlitePool> {
    DB_POOL.lock()
        .map_err(|_| ServiceError::Configuration("Database pool lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| ServiceError::Configuration("Database not initialized".to_string()))
}
