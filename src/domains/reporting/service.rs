use crate::auth::AuthContext;
use crate::domains::contact::{ContactFilter, ContactService};
use crate::domains::donation::{DonationFilter, DonationRecord, DonationService};
use crate::domains::reporting::aggregation::{bucket_by_calendar_entry, totals, DonationTotals, EntryBucket};
use crate::domains::reporting::export::{project_contacts, project_donations, ExportTable};
use crate::errors::ServiceResult;
use crate::types::{PaginatedResult, PaginationParams, Permission};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// One page of donation history plus totals and chart over the whole filtered set
#[derive(Debug, Clone, Serialize)]
pub struct DonationHistory {
    pub page: PaginatedResult<DonationRecord>,
    pub totals: DonationTotals,
    pub chart: Vec<EntryBucket>,
}

#[async_trait]
pub trait ReportingService: Send + Sync {
    async fn donation_history(
        &self,
        auth: &AuthContext,
        filter: &DonationFilter,
        params: PaginationParams,
    ) -> ServiceResult<DonationHistory>;

    /// Every filtered row, independent of the page being viewed
    async fn export_donations(&self, auth: &AuthContext, filter: &DonationFilter, today: NaiveDate) -> ServiceResult<ExportTable>;

    async fn export_contacts(&self, auth: &AuthContext, filter: &ContactFilter, today: NaiveDate) -> ServiceResult<ExportTable>;
}

pub struct ReportingServiceImpl {
    donations: Arc<dyn DonationService>,
    contacts: Arc<dyn ContactService>,
}

impl ReportingServiceImpl {
    pub fn new(donations: Arc<dyn DonationService>, contacts: Arc<dyn ContactService>) -> Self {
        Self { donations, contacts }
    }
}

#[async_trait]
impl ReportingService for ReportingServiceImpl {
    async fn donation_history(
        &self,
        auth: &AuthContext,
        filter: &DonationFilter,
        params: PaginationParams,
    ) -> ServiceResult<DonationHistory> {
        let rows = self.donations.list_donations(auth, filter).await?;
        Ok(DonationHistory {
            totals: totals(&rows),
            chart: bucket_by_calendar_entry(&rows),
            page: PaginatedResult::from_slice(&rows, params),
        })
    }

    async fn export_donations(&self, auth: &AuthContext, filter: &DonationFilter, today: NaiveDate) -> ServiceResult<ExportTable> {
        auth.authorize(Permission::ExportData)?;
        let rows = self.donations.list_donations(auth, filter).await?;
        Ok(project_donations(auth, &rows, today)?)
    }

    async fn export_contacts(&self, auth: &AuthContext, filter: &ContactFilter, today: NaiveDate) -> ServiceResult<ExportTable> {
        auth.authorize(Permission::ExportData)?;
        let contacts = self.contacts.list_contacts(auth, filter).await?;
        Ok(project_contacts(auth, &contacts, today)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::contact::{ContactServiceImpl, SqliteContactRepository};
    use crate::domains::donation::service::tests::{d, donation, fixture};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_history_totals_cover_all_pages_and_export_ignores_paging() {
        let f = fixture().await;
        let today = d("2024-03-10");
        for i in 0..12 {
            let date = format!("2024-03-{:02}", i + 1);
            f.service
                .save_donation(&f.radha, donation(f.radha_contact, f.papamochani, "10", &date), today)
                .await
                .unwrap();
        }

        let contacts = Arc::new(ContactServiceImpl::new(Arc::new(SqliteContactRepository::new(f.pool.clone()))));
        let radha = f.radha.clone();
        let reporting = ReportingServiceImpl::new(Arc::new(f.service), contacts);

        let history = reporting
            .donation_history(&radha, &DonationFilter::default(), PaginationParams::new(2, 10))
            .await
            .unwrap();
        assert_eq!(history.page.items.len(), 2);
        assert_eq!(history.page.total_pages, 2);
        assert_eq!(history.totals, DonationTotals { total: dec!(120), count: 12 });

        let table = reporting.export_donations(&radha, &DonationFilter::default(), today).await.unwrap();
        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.rows[0][0], "1");
        assert_eq!(table.rows[11][0], "12");
    }

    #[tokio::test]
    async fn test_history_chart_spans_pages_in_first_seen_order() {
        let f = fixture().await;
        let today = d("2024-03-10");
        for i in 0..11 {
            let date = format!("2024-03-{:02}", i + 1);
            f.service
                .save_donation(&f.radha, donation(f.radha_contact, f.papamochani, "10", &date), today)
                .await
                .unwrap();
        }
        f.service.save_donation(&f.radha, donation(f.radha_contact, f.kamada, "40", "2024-03-21"), today).await.unwrap();
        f.service.save_donation(&f.gopal, donation(f.gopal_contact, f.kamada, "500", "2024-03-22"), today).await.unwrap();

        let contacts = Arc::new(ContactServiceImpl::new(Arc::new(SqliteContactRepository::new(f.pool.clone()))));
        let (radha, admin, pune) = (f.radha.clone(), f.admin.clone(), f.pune);
        let reporting = ReportingServiceImpl::new(Arc::new(f.service), contacts);

        // Newest first, so Kamada is seen before Papamochani
        let history = reporting
            .donation_history(&radha, &DonationFilter::default(), PaginationParams::new(1, 10))
            .await
            .unwrap();
        assert_eq!(history.page.items.len(), 10);
        assert_eq!(
            history.chart,
            vec![
                EntryBucket { label: "Kamada (2024-03-20)".into(), total: dec!(40) },
                EntryBucket { label: "Papamochani (2024-03-05)".into(), total: dec!(110) },
            ]
        );

        // Admin view filtered to Pune leaves out Gopal's Kamada donation
        let pune_only = DonationFilter { centre_id: Some(pune), ..Default::default() };
        let filtered = reporting.donation_history(&admin, &pune_only, PaginationParams::new(2, 10)).await.unwrap();
        assert_eq!(filtered.chart, history.chart);

        let empty = reporting
            .donation_history(&radha, &DonationFilter { from: Some(d("2024-04-01")), ..Default::default() }, PaginationParams::default())
            .await
            .unwrap();
        assert!(empty.chart.is_empty());
        assert_eq!(empty.totals, DonationTotals::default());
    }

    #[tokio::test]
    async fn test_empty_exports_report_no_data() {
        let f = fixture().await;
        let contacts = Arc::new(ContactServiceImpl::new(Arc::new(SqliteContactRepository::new(f.pool.clone()))));
        let gopal = f.gopal.clone();
        let reporting = ReportingServiceImpl::new(Arc::new(f.service), contacts);

        let err = reporting.export_donations(&gopal, &DonationFilter::default(), d("2024-03-10")).await.unwrap_err();
        assert_eq!(err.as_validation().map(|v| v.to_string()).as_deref(), Some("No data to export"));

        // Gopal has one contact in the fixture
        let table = reporting.export_contacts(&gopal, &ContactFilter::default(), d("2024-03-10")).await.unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.columns.len(), 5);
    }
}
