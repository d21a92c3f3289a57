use crate::auth::AuthContext;
use crate::domains::centre::{Centre, CentreRepository};
use crate::domains::devotee::repository::DevoteeRepository;
use crate::domains::devotee::types::DevoteeSummary;
use crate::errors::{ServiceError, ServiceResult};
use crate::types::Permission;
use async_trait::async_trait;
use std::sync::Arc;

/// Option lists for the admin-only devotee and centre filters
#[async_trait]
pub trait DevoteeService: Send + Sync {
    async fn list_devotees(&self, auth: &AuthContext) -> ServiceResult<Vec<DevoteeSummary>>;

    async fn list_centres(&self, auth: &AuthContext) -> ServiceResult<Vec<Centre>>;
}

pub struct DevoteeServiceImpl {
    repo: Arc<dyn DevoteeRepository>,
    centre_repo: Arc<dyn CentreRepository>,
}

impl DevoteeServiceImpl {
    pub fn new(repo: Arc<dyn DevoteeRepository>, centre_repo: Arc<dyn CentreRepository>) -> Self {
        Self { repo, centre_repo }
    }
}

#[async_trait]
impl DevoteeService for DevoteeServiceImpl {
    async fn list_devotees(&self, auth: &AuthContext) -> ServiceResult<Vec<DevoteeSummary>> {
        auth.authorize(Permission::ViewDevotees)?;

        let profiles = self.repo.find_all().await.map_err(|e| {
            log::error!("Failed to load core devotee profiles: {}", e);
            ServiceError::Domain(e)
        })?;

        Ok(profiles.iter().map(DevoteeSummary::from).collect())
    }

    async fn list_centres(&self, auth: &AuthContext) -> ServiceResult<Vec<Centre>> {
        auth.authorize(Permission::ViewCentres)?;

        self.centre_repo.find_all().await.map_err(|e| {
            log::error!("Failed to load centres: {}", e);
            ServiceError::Domain(e)
        })
    }
}
