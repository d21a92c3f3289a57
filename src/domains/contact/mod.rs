pub mod types;
pub mod query;
pub mod repository;
pub mod service;

pub use types::{Contact, ContactFilter, ContactRow, NewContact, CONTACT_REQUIRED_MESSAGE};
pub use query::{build_contact_query, ContactConstraint, ContactQuery};
pub use repository::{ContactRepository, SqliteContactRepository};
pub use service::{ContactService, ContactServiceImpl};
