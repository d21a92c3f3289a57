pub mod types;
pub mod repository;

pub use types::{Centre, CentreRow};
pub use repository::{CentreRepository, SqliteCentreRepository};
