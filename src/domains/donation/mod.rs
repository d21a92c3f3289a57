pub mod types;
pub mod query;
pub mod repository;
pub mod service;

pub use types::{
    Donation, DonationDraft, DonationFilter, DonationRecord, DonationRow, NewDonation,
    DONATION_REQUIRED_MESSAGE, TRANSFER_CONFIRMATION_MESSAGE,
};
pub use query::{build_donation_query, DonationConstraint, DonationQuery};
pub use repository::{DonationRepository, SqliteDonationRepository};
pub use service::{DonationService, DonationServiceImpl};
