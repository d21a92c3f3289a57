pub mod service;

pub use service::{DashboardService, DashboardServiceImpl, DashboardSummary};
