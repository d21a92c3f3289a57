use crate::auth::AuthContext;
use crate::domains::calendar::CalendarService;
use crate::domains::contact::ContactRepository;
use crate::domains::donation::query::build_donation_query;
use crate::domains::donation::repository::DonationRepository;
use crate::domains::donation::types::{Donation, DonationFilter, DonationRecord, NewDonation};
use crate::errors::{ServiceError, ServiceResult};
use crate::types::Permission;
use crate::validation::Validate;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

#[async_trait]
pub trait DonationService: Send + Sync {
    /// Validate and insert a donation.
    ///
    /// Nothing is written unless every field is valid, the transfer is
    /// confirmed, the contact is the caller's (admins excepted) and the
    /// Ekadashi is inside the caller's window for `today`.
    async fn save_donation(&self, auth: &AuthContext, input: NewDonation, today: NaiveDate) -> ServiceResult<Donation>;

    /// Donations visible to the caller that match `filter`, newest first
    async fn list_donations(&self, auth: &AuthContext, filter: &DonationFilter) -> ServiceResult<Vec<DonationRecord>>;

    /// Every donation visible to the caller
    async fn list_visible_donations(&self, auth: &AuthContext) -> ServiceResult<Vec<DonationRecord>>;
}

pub struct DonationServiceImpl {
    repo: Arc<dyn DonationRepository>,
    contact_repo: Arc<dyn ContactRepository>,
    calendar: Arc<dyn CalendarService>,
}

impl DonationServiceImpl {
    pub fn new(
        repo: Arc<dyn DonationRepository>,
        contact_repo: Arc<dyn ContactRepository>,
        calendar: Arc<dyn CalendarService>,
    ) -> Self {
        Self { repo, contact_repo, calendar }
    }
}

#[async_trait]
impl DonationService for DonationServiceImpl {
    async fn save_donation(&self, auth: &AuthContext, input: NewDonation, today: NaiveDate) -> ServiceResult<Donation> {
        auth.authorize(Permission::CreateDonations)?;

        let draft = input.to_draft().map_err(|e| {
            log::warn!("Rejected donation from {}: {}", auth.user_id, e);
            ServiceError::Domain(e)
        })?;

        let contact = self.contact_repo.find_by_id(draft.contact_id).await?;
        auth.authorize_self_or_admin(&contact.owner_devotee_id).map_err(|e| {
            log::warn!("User {} tried to record a donation for contact {}", auth.user_id, contact.id);
            e
        })?;

        self.calendar.selectable_entry(auth, today, draft.calendar_entry_id).await?;

        let donation = self.repo.create(&draft, auth.user_id).await.map_err(|e| {
            log::error!("Failed to save donation: {}", e);
            ServiceError::Domain(e)
        })?;

        log::info!("Donation {} of {} recorded by {}", donation.id, donation.amount, auth.user_id);
        Ok(donation)
    }

    async fn list_donations(&self, auth: &AuthContext, filter: &DonationFilter) -> ServiceResult<Vec<DonationRecord>> {
        auth.authorize(Permission::ViewDonations)?;
        filter.validate()?;

        let query = build_donation_query(auth, filter);
        self.repo.find(&query).await.map_err(|e| {
            log::error!("Failed to load donations: {}", e);
            ServiceError::Domain(e)
        })
    }

    async fn list_visible_donations(&self, auth: &AuthContext) -> ServiceResult<Vec<DonationRecord>> {
        self.list_donations(auth, &DonationFilter::default()).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::domains::calendar::{CalendarRepository, CalendarServiceImpl, NewCalendarEntry, SqliteCalendarRepository};
    use crate::domains::contact::{NewContact, SqliteContactRepository};
    use crate::domains::devotee::{DevoteeRepository, NewDevoteeProfile, SqliteDevoteeRepository};
    use crate::domains::donation::repository::SqliteDonationRepository;
    use crate::domains::donation::types::{DONATION_REQUIRED_MESSAGE, TRANSFER_CONFIRMATION_MESSAGE};
    use crate::types::UserRole;
    use rust_decimal_macros::dec;
    use sqlx::SqlitePool;
    use uuid::Uuid;

    pub(crate) fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Store with two devotees (one per centre), one contact each and the
    /// calendar around 2024-03-10
    pub(crate) struct Fixture {
        pub pool: SqlitePool,
        pub service: DonationServiceImpl,
        pub radha: AuthContext,
        pub gopal: AuthContext,
        pub admin: AuthContext,
        pub radha_contact: Uuid,
        pub gopal_contact: Uuid,
        pub papamochani: Uuid,
        pub kamada: Uuid,
        pub jaya: Uuid,
        pub pune: Uuid,
    }

    async fn profile(pool: &SqlitePool, name: &str, role: UserRole, centre: Option<Uuid>) -> AuthContext {
        let user_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, password_hash, active, created_at) VALUES (?, ?, 'x', 1, '2024-01-01T00:00:00Z')")
            .bind(user_id.to_string())
            .bind(format!("{}@example.org", name.to_lowercase()))
            .execute(pool)
            .await
            .unwrap();
        let profile = SqliteDevoteeRepository::new(pool.clone())
            .create(&NewDevoteeProfile { user_id, name: name.into(), role, centre_id: centre })
            .await
            .unwrap();
        AuthContext::from_profile(user_id, Some(profile))
    }

    pub(crate) async fn fixture() -> Fixture {
        let pool = test_pool().await;

        let pune = Uuid::new_v4();
        let mumbai = Uuid::new_v4();
        for (id, name) in [(pune, "Pune"), (mumbai, "Mumbai")] {
            sqlx::query("INSERT INTO centres (id, centre_name) VALUES (?, ?)")
                .bind(id.to_string())
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }

        let radha = profile(&pool, "Radha", UserRole::CoreDevotee, Some(pune)).await;
        let gopal = profile(&pool, "Gopal", UserRole::CoreDevotee, Some(mumbai)).await;
        let admin = profile(&pool, "Admin", UserRole::Admin, None).await;

        let contacts = SqliteContactRepository::new(pool.clone());
        let contact = |name: &str| NewContact { name: name.into(), phone: "9876543210".into(), ..Default::default() };
        let radha_contact = contacts.create(&contact("Madhavi"), radha.user_id, d("2024-01-01")).await.unwrap().id;
        let gopal_contact = contacts.create(&contact("Ananta"), gopal.user_id, d("2024-01-01")).await.unwrap().id;

        let calendar_repo = Arc::new(SqliteCalendarRepository::new(pool.clone()));
        let mut ids = Vec::new();
        for (name, date) in [
            ("Jaya", "2024-01-05"),
            ("Vijaya", "2024-02-04"),
            ("Amalaki", "2024-02-20"),
            ("Papamochani", "2024-03-05"),
            ("Kamada", "2024-03-20"),
        ] {
            ids.push(calendar_repo.create(&NewCalendarEntry { name: name.into(), date: d(date) }).await.unwrap().id);
        }

        let service = DonationServiceImpl::new(
            Arc::new(SqliteDonationRepository::new(pool.clone())),
            Arc::new(contacts),
            Arc::new(CalendarServiceImpl::new(calendar_repo)),
        );

        Fixture {
            pool,
            service,
            radha,
            gopal,
            admin,
            radha_contact,
            gopal_contact,
            jaya: ids[0],
            papamochani: ids[3],
            kamada: ids[4],
            pune,
        }
    }

    pub(crate) fn donation(contact: Uuid, entry: Uuid, amount: &str, date: &str) -> NewDonation {
        NewDonation {
            contact_id: Some(contact),
            calendar_entry_id: Some(entry),
            amount: amount.into(),
            transaction_date: Some(d(date)),
            transferred: true,
            ..Default::default()
        }
    }

    async fn donation_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM donations").fetch_one(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_and_list_own_donations() {
        let f = fixture().await;
        let today = d("2024-03-10");

        let saved = f.service
            .save_donation(&f.radha, donation(f.radha_contact, f.papamochani, "1,250.50", "2024-03-06"), today)
            .await
            .unwrap();
        assert_eq!(saved.amount, dec!(1250.50));
        assert!(saved.transferred);

        let rows = f.service.list_visible_donations(&f.radha).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contact_name, "Madhavi");
        assert_eq!(rows[0].devotee_name, "Radha");
        assert_eq!(rows[0].centre_name.as_deref(), Some("Pune"));
        assert_eq!(rows[0].calendar_label().as_deref(), Some("Papamochani (2024-03-05)"));

        assert!(f.service.list_visible_donations(&f.gopal).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfirmed_transfer_writes_nothing() {
        let f = fixture().await;
        let input = NewDonation { transferred: false, ..donation(f.radha_contact, f.papamochani, "100", "2024-03-06") };

        let err = f.service.save_donation(&f.radha, input, d("2024-03-10")).await.unwrap_err();
        assert_eq!(err.as_validation().map(|v| v.to_string()).as_deref(), Some(TRANSFER_CONFIRMATION_MESSAGE));
        assert_eq!(donation_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn test_missing_fields_write_nothing() {
        let f = fixture().await;
        let input = NewDonation { calendar_entry_id: None, ..donation(f.radha_contact, f.papamochani, "100", "2024-03-06") };

        let err = f.service.save_donation(&f.radha, input, d("2024-03-10")).await.unwrap_err();
        assert_eq!(err.as_validation().map(|v| v.to_string()).as_deref(), Some(DONATION_REQUIRED_MESSAGE));
        assert_eq!(donation_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn test_foreign_contact_and_stale_ekadashi_rejected() {
        let f = fixture().await;
        let today = d("2024-03-10");

        let foreign = f.service
            .save_donation(&f.radha, donation(f.gopal_contact, f.papamochani, "100", "2024-03-06"), today)
            .await;
        assert!(matches!(foreign, Err(ServiceError::PermissionDenied(_))));

        // Jaya is older than the three most recent past Ekadashis
        let stale = f.service
            .save_donation(&f.radha, donation(f.radha_contact, f.jaya, "100", "2024-01-06"), today)
            .await;
        assert!(matches!(stale, Err(ServiceError::PermissionDenied(_))));
        assert_eq!(donation_count(&f.pool).await, 0);

        // Admins may record against any contact and any Ekadashi
        f.service
            .save_donation(&f.admin, donation(f.gopal_contact, f.jaya, "100", "2024-01-06"), today)
            .await
            .unwrap();
        assert_eq!(donation_count(&f.pool).await, 1);
    }

    #[tokio::test]
    async fn test_history_filters_and_ordering() {
        let f = fixture().await;
        let today = d("2024-03-10");
        f.service.save_donation(&f.radha, donation(f.radha_contact, f.papamochani, "100", "2024-03-06"), today).await.unwrap();
        f.service.save_donation(&f.radha, donation(f.radha_contact, f.kamada, "250", "2024-03-21"), today).await.unwrap();
        f.service.save_donation(&f.gopal, donation(f.gopal_contact, f.papamochani, "50", "2024-03-07"), today).await.unwrap();

        let all = f.service.list_visible_donations(&f.admin).await.unwrap();
        let dates: Vec<_> = all.iter().map(|r| r.donation.transaction_date.unwrap()).collect();
        assert_eq!(dates, vec![d("2024-03-21"), d("2024-03-07"), d("2024-03-06")]);

        let by_centre = DonationFilter { centre_id: Some(f.pune), ..Default::default() };
        assert_eq!(f.service.list_donations(&f.admin, &by_centre).await.unwrap().len(), 2);

        let narrowed = DonationFilter { to: Some(d("2024-03-10")), ..by_centre.clone() };
        assert_eq!(f.service.list_donations(&f.admin, &narrowed).await.unwrap().len(), 1);

        // Centre filter from a devotee is ignored, owner scope is not
        assert_eq!(f.service.list_donations(&f.gopal, &by_centre).await.unwrap().len(), 1);

        let inverted = DonationFilter { from: Some(d("2024-03-10")), to: Some(d("2024-03-01")), ..Default::default() };
        assert!(f.service.list_donations(&f.admin, &inverted).await.is_err());
    }

    #[tokio::test]
    async fn test_profileless_session_cannot_save() {
        let f = fixture().await;
        // Radha's session, but her profile row failed to load
        let degraded = AuthContext::from_profile(f.radha.user_id, None);

        let result = f.service
            .save_donation(&degraded, donation(f.radha_contact, f.papamochani, "500", "2024-03-06"), d("2024-03-10"))
            .await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));
        assert_eq!(donation_count(&f.pool).await, 0);

        assert!(f.service.list_visible_donations(&degraded).await.unwrap().is_empty());
    }
}
