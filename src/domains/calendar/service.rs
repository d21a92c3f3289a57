use crate::auth::AuthContext;
use crate::domains::calendar::repository::CalendarRepository;
use crate::domains::calendar::types::{CalendarEntry, CalendarWindow, SelectionMode};
use crate::domains::calendar::window::{select_window, PAST_ENTRIES_VISIBLE, UPCOMING_ENTRIES_VISIBLE};
use crate::errors::{DomainResult, ServiceError, ServiceResult};
use crate::types::Permission;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// The local calendar date, computed once per page load
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Selectable Ekadashis for the caller plus the default selection for `mode`
    async fn window(&self, auth: &AuthContext, today: NaiveDate, mode: SelectionMode) -> ServiceResult<CalendarWindow>;

    /// An entry the caller may pick for a new donation
    async fn selectable_entry(&self, auth: &AuthContext, today: NaiveDate, id: uuid::Uuid) -> ServiceResult<CalendarEntry>;
}

pub struct CalendarServiceImpl {
    repo: Arc<dyn CalendarRepository>,
}

impl CalendarServiceImpl {
    pub fn new(repo: Arc<dyn CalendarRepository>) -> Self {
        Self { repo }
    }

    /// Devotees only ever need the entries nearest to today
    async fn entries_around(&self, today: NaiveDate) -> DomainResult<Vec<CalendarEntry>> {
        let mut entries = self.repo.find_before(today, PAST_ENTRIES_VISIBLE as u32).await?;
        entries.extend(self.repo.find_on_or_after(today, UPCOMING_ENTRIES_VISIBLE as u32).await?);
        Ok(entries)
    }
}

#[async_trait]
impl CalendarService for CalendarServiceImpl {
    async fn window(&self, auth: &AuthContext, today: NaiveDate, mode: SelectionMode) -> ServiceResult<CalendarWindow> {
        auth.authorize(Permission::ViewCalendar)?;

        let candidates = if auth.has_permission(Permission::ViewFullCalendar) {
            self.repo.find_all().await
        } else {
            self.entries_around(today).await
        }
        .map_err(|e| {
            log::error!("Failed to load Ekadashi calendar: {}", e);
            ServiceError::Domain(e)
        })?;

        Ok(select_window(auth.role, &candidates, today, mode))
    }

    async fn selectable_entry(&self, auth: &AuthContext, today: NaiveDate, id: uuid::Uuid) -> ServiceResult<CalendarEntry> {
        let window = self.window(auth, today, SelectionMode::Form).await?;
        window
            .entries
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| {
                log::warn!("User {} picked Ekadashi {} outside their window", auth.user_id, id);
                ServiceError::PermissionDenied("Ekadashi is not available for selection".to_string())
            })
    }
}
