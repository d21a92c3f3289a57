use crate::auth::AuthContext;
use crate::domains::calendar::{CalendarEntry, CalendarService, CalendarWindow, SelectionMode};
use crate::domains::donation::DonationService;
use crate::domains::reporting::{bucket_by_calendar_entry, entry_total, totals, DonationTotals, EntryBucket};
use crate::errors::ServiceResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the dashboard shows for one load
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub greeting: Option<String>,
    pub role_badge: Option<&'static str>,
    /// Over every donation the caller can see
    pub totals: DonationTotals,
    pub window: CalendarWindow,
    pub selected_entry: Option<CalendarEntry>,
    /// Zero when nothing is selected or nothing was donated
    pub selected_total: Decimal,
    pub chart: Vec<EntryBucket>,
}

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn load(&self, auth: &AuthContext, today: NaiveDate) -> ServiceResult<DashboardSummary>;

    /// Total for another Ekadashi picked from the window
    async fn total_for_entry(&self, auth: &AuthContext, entry_id: Option<Uuid>) -> ServiceResult<Decimal>;
}

pub struct DashboardServiceImpl {
    calendar: Arc<dyn CalendarService>,
    donations: Arc<dyn DonationService>,
}

impl DashboardServiceImpl {
    pub fn new(calendar: Arc<dyn CalendarService>, donations: Arc<dyn DonationService>) -> Self {
        Self { calendar, donations }
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn load(&self, auth: &AuthContext, today: NaiveDate) -> ServiceResult<DashboardSummary> {
        let window = self.calendar.window(auth, today, SelectionMode::Dashboard).await?;
        let visible = self.donations.list_visible_donations(auth).await?;

        let selected_entry = window.selected_entry().cloned();
        let selected_total = entry_total(&visible, window.selected);

        Ok(DashboardSummary {
            greeting: auth.greeting(),
            role_badge: auth.role_badge(),
            totals: totals(&visible),
            chart: bucket_by_calendar_entry(&visible),
            window,
            selected_entry,
            selected_total,
        })
    }

    async fn total_for_entry(&self, auth: &AuthContext, entry_id: Option<Uuid>) -> ServiceResult<Decimal> {
        let visible = self.donations.list_visible_donations(auth).await?;
        Ok(entry_total(&visible, entry_id))
    }
}
