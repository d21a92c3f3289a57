use crate::domains::donation::query::DonationQuery;
use crate::domains::donation::types::{Donation, DonationDraft, DonationRecord, DonationRow};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::validation::ISO_DATE_FORMAT;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

// Contacts and profiles are inner joins: donations whose contact or owning
// profile is missing are never listed.
const DONATION_SELECT: &str = "SELECT d.id, d.contact_id, d.ekadashi_id, d.amount, d.transaction_id,
            d.transaction_date, d.receipt_number, d.transferred,
            c.contact_name, c.core_devotee_id,
            p.name AS devotee_name, p.centre_id, ce.centre_name,
            e.ekadashi_name, e.ekadashi_date
     FROM donations d
     INNER JOIN contacts c ON c.id = d.contact_id
     INNER JOIN core_devotee_profiles p ON p.user_id = c.core_devotee_id
     LEFT JOIN centres ce ON ce.id = p.centre_id
     LEFT JOIN ekadashi_calendar e ON e.id = d.ekadashi_id";

/// Trait defining donation repository operations
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Insert a confirmed, validated donation
    async fn create(&self, draft: &DonationDraft, created_by: Uuid) -> DomainResult<Donation>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<DonationRecord>;

    /// Donations matching every constraint, newest transaction first
    async fn find(&self, query: &DonationQuery) -> DomainResult<Vec<DonationRecord>>;
}

/// SQLite implementation for DonationRepository
#[derive(Debug, Clone)]
pub struct SqliteDonationRepository {
    pool: Pool<Sqlite>,
}

impl SqliteDonationRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationRepository for SqliteDonationRepository {
    async fn create(&self, draft: &DonationDraft, created_by: Uuid) -> DomainResult<Donation> {
        let id = Uuid::new_v4();

        query(
            "INSERT INTO donations (
                id, contact_id, ekadashi_id, amount, transaction_id, transaction_date,
                receipt_number, transferred, created_by_user_id, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(id.to_string())
        .bind(draft.contact_id.to_string())
        .bind(draft.calendar_entry_id.to_string())
        .bind(draft.amount.to_string())
        .bind(draft.transaction_id.as_deref())
        .bind(draft.transaction_date.map(|d| d.format(ISO_DATE_FORMAT).to_string()))
        .bind(draft.receipt_number.as_deref())
        .bind(created_by.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Donation {
            id,
            contact_id: draft.contact_id,
            calendar_entry_id: draft.calendar_entry_id,
            amount: draft.amount,
            transaction_id: draft.transaction_id.clone(),
            transaction_date: draft.transaction_date,
            receipt_number: draft.receipt_number.clone(),
            transferred: true,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<DonationRecord> {
        let mut builder = QueryBuilder::<Sqlite>::new(DONATION_SELECT);
        builder.push(" WHERE d.id = ");
        builder.push_bind(id.to_string());

        let row = builder
            .build_query_as::<DonationRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Donation".to_string(), id))?;

        row.into_entity()
    }

    async fn find(&self, donation_query: &DonationQuery) -> DomainResult<Vec<DonationRecord>> {
        let mut builder = QueryBuilder::<Sqlite>::new(DONATION_SELECT);
        builder.push(" WHERE 1=1");
        donation_query.push_conditions(&mut builder);
        builder.push(" ORDER BY d.transaction_date DESC, d.created_at DESC");

        let rows = builder
            .build_query_as::<DonationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(DonationRow::into_entity).collect()
    }
}
