pub mod calendar;
pub mod centre;
pub mod contact;
pub mod dashboard;
pub mod devotee;
pub mod donation;
pub mod permission;
pub mod reporting;
