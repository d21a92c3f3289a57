use crate::auth::AuthContext;
use crate::domains::contact::query::build_contact_query;
use crate::domains::contact::repository::ContactRepository;
use crate::domains::contact::types::{Contact, ContactFilter, NewContact};
use crate::errors::{DomainError, ServiceError, ServiceResult};
use crate::types::{PaginatedResult, PaginationParams, Permission};
use crate::validation::Validate;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

#[async_trait]
pub trait ContactService: Send + Sync {
    /// Add a contact owned by the caller. Admins cannot add contacts.
    async fn create_contact(&self, auth: &AuthContext, new_contact: NewContact, today: NaiveDate) -> ServiceResult<Contact>;

    /// Every contact the caller may see, ordered by name
    async fn list_contacts(&self, auth: &AuthContext, filter: &ContactFilter) -> ServiceResult<Vec<Contact>>;

    async fn list_contacts_page(
        &self,
        auth: &AuthContext,
        filter: &ContactFilter,
        params: PaginationParams,
    ) -> ServiceResult<PaginatedResult<Contact>>;

    /// A single contact the caller may see
    async fn get_contact(&self, auth: &AuthContext, id: uuid::Uuid) -> ServiceResult<Contact>;
}

pub struct ContactServiceImpl {
    repo: Arc<dyn ContactRepository>,
}

impl ContactServiceImpl {
    pub fn new(repo: Arc<dyn ContactRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    async fn create_contact(&self, auth: &AuthContext, new_contact: NewContact, today: NaiveDate) -> ServiceResult<Contact> {
        auth.authorize(Permission::CreateContacts)?;
        new_contact.validate()?;

        let enrolment_date = new_contact.enrolment_date.unwrap_or(today);
        let contact = self.repo.create(&new_contact, auth.user_id, enrolment_date).await.map_err(|e| {
            log::error!("Failed to save contact for {}: {}", auth.user_id, e);
            ServiceError::Domain(e)
        })?;

        log::info!("Contact {} added by {}", contact.id, auth.user_id);
        Ok(contact)
    }

    async fn list_contacts(&self, auth: &AuthContext, filter: &ContactFilter) -> ServiceResult<Vec<Contact>> {
        auth.authorize(Permission::ViewContacts)?;

        let query = build_contact_query(auth, filter);
        self.repo.find(&query).await.map_err(|e| {
            log::error!("Failed to load contacts: {}", e);
            ServiceError::Domain(e)
        })
    }

    async fn list_contacts_page(
        &self,
        auth: &AuthContext,
        filter: &ContactFilter,
        params: PaginationParams,
    ) -> ServiceResult<PaginatedResult<Contact>> {
        let contacts = self.list_contacts(auth, filter).await?;
        Ok(PaginatedResult::from_slice(&contacts, params))
    }

    async fn get_contact(&self, auth: &AuthContext, id: uuid::Uuid) -> ServiceResult<Contact> {
        auth.authorize(Permission::ViewContacts)?;

        let contact = self.repo.find_by_id(id).await?;
        if !auth.has_permission(Permission::ViewAllContacts) && contact.owner_devotee_id != auth.user_id {
            // Report foreign contacts as missing
            return Err(ServiceError::Domain(DomainError::EntityNotFound("Contact".to_string(), id)));
        }
        Ok(contact)
    }
}
