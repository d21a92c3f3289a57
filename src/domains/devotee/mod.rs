pub mod types;
pub mod repository;
pub mod service;

pub use types::{DevoteeProfile, DevoteeProfileRow, DevoteeSummary, NewDevoteeProfile};
pub use repository::{DevoteeRepository, SqliteDevoteeRepository};
pub use service::{DevoteeService, DevoteeServiceImpl};
