pub mod context;
pub mod gate;
pub mod service;
mod repository;
pub mod jwt;

// Re-export public items
pub use context::AuthContext;
pub use gate::{GateDecision, Page, SessionGate};
pub use service::{hash_password, Session, SessionStore, SqliteSessionStore};

pub(crate) use repository::AuthRepository;
