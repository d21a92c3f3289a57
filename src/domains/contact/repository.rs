use crate::domains::contact::query::ContactQuery;
use crate::domains::contact::types::{Contact, ContactRow, NewContact};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::validation::ISO_DATE_FORMAT;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{query, query_as, Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

const CONTACT_SELECT: &str = "SELECT c.id, c.core_devotee_id, c.contact_name, c.contact_number, c.address,
            c.enrolment_date, p.name AS devotee_name
     FROM contacts c
     LEFT JOIN core_devotee_profiles p ON p.user_id = c.core_devotee_id";

/// Trait defining contact repository operations
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, new_contact: &NewContact, owner: Uuid, enrolment_date: NaiveDate) -> DomainResult<Contact>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Contact>;

    /// Contacts matching every constraint, ordered by name
    async fn find(&self, query: &ContactQuery) -> DomainResult<Vec<Contact>>;
}

/// SQLite implementation for ContactRepository
#[derive(Debug, Clone)]
pub struct SqliteContactRepository {
    pool: Pool<Sqlite>,
}

impl SqliteContactRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn create(&self, new_contact: &NewContact, owner: Uuid, enrolment_date: NaiveDate) -> DomainResult<Contact> {
        let id = Uuid::new_v4();

        query(
            "INSERT INTO contacts (id, core_devotee_id, contact_name, contact_number, address, enrolment_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .bind(new_contact.name.trim())
        .bind(new_contact.phone.trim())
        .bind(new_contact.address())
        .bind(enrolment_date.format(ISO_DATE_FORMAT).to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Contact> {
        let row = query_as::<_, ContactRow>(&format!("{} WHERE c.id = ?", CONTACT_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Contact".to_string(), id))?;

        row.into_entity()
    }

    async fn find(&self, contact_query: &ContactQuery) -> DomainResult<Vec<Contact>> {
        let mut builder = QueryBuilder::<Sqlite>::new(CONTACT_SELECT);
        builder.push(" WHERE 1=1");
        contact_query.push_conditions(&mut builder);
        builder.push(" ORDER BY c.contact_name ASC");

        let rows = builder
            .build_query_as::<ContactRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(ContactRow::into_entity).collect()
    }
}
