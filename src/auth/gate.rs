//! Page gating: every page except `/login` needs a resolved identity.

use crate::auth::service::{Session, SessionStore};
use crate::auth::AuthContext;
use crate::domains::devotee::DevoteeRepository;
use crate::errors::ServiceResult;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Pages of the dashboard application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Dashboard,
    Login,
    Contacts,
    AddDonation,
    Donations,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Login => "/login",
            Page::Contacts => "/contacts",
            Page::AddDonation => "/add-donation",
            Page::Donations => "/donations",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Page::Dashboard),
            "/login" => Some(Page::Login),
            "/contacts" => Some(Page::Contacts),
            "/add-donation" => Some(Page::AddDonation),
            "/donations" => Some(Page::Donations),
            _ => None,
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Page::Login)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Allow(AuthContext),
    /// Public page with no session
    AllowAnonymous,
    RedirectToLogin,
}

impl GateDecision {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GateDecision::RedirectToLogin => Some(Page::Login.path()),
            _ => None,
        }
    }
}

/// Resolves sessions into identities and decides page access.
///
/// One gate is shared by the whole process. It holds the identity
/// established at login until logout.
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    profiles: Arc<dyn DevoteeRepository>,
    current: Mutex<Option<AuthContext>>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn SessionStore>, profiles: Arc<dyn DevoteeRepository>) -> Self {
        Self { store, profiles, current: Mutex::new(None) }
    }

    /// The identity established by the last login, until logout
    pub fn current_identity(&self) -> Option<AuthContext> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    fn set_current(&self, identity: Option<AuthContext>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = identity;
        }
    }

    /// Identity for an access token, `None` without an active session.
    ///
    /// A failed profile lookup is logged and yields an identity with no
    /// profile, which carries core devotee privileges.
    pub async fn resolve_identity(&self, access_token: &str) -> ServiceResult<Option<AuthContext>> {
        let session = match self.store.get_session(access_token).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        Ok(Some(self.identity_for(&session).await))
    }

    pub async fn guard(&self, page: Page, access_token: Option<&str>) -> GateDecision {
        let identity = match access_token {
            Some(token) => match self.resolve_identity(token).await {
                Ok(identity) => identity,
                Err(e) => {
                    log::error!("Session lookup failed: {}", e);
                    None
                }
            },
            None => None,
        };

        match (identity, page.requires_session()) {
            (Some(identity), _) => GateDecision::Allow(identity),
            (None, false) => GateDecision::AllowAnonymous,
            (None, true) => GateDecision::RedirectToLogin,
        }
    }

    /// Sign in and establish the current identity
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<(Session, AuthContext)> {
        let session = self.store.sign_in_with_password(email, password).await?;
        let identity = self.load_identity(&session).await;
        self.set_current(Some(identity.clone()));
        Ok((session, identity))
    }

    pub async fn logout(&self, session: &Session) -> ServiceResult<()> {
        self.set_current(None);
        self.store.sign_out(session).await
    }

    /// Reuses the current identity for its own sessions. A profile that
    /// failed to load is retried on every resolve.
    async fn identity_for(&self, session: &Session) -> AuthContext {
        match self.current_identity() {
            Some(current) if current.user_id == session.user_id && current.profile_loaded => current,
            _ => self.load_identity(session).await,
        }
    }

    async fn load_identity(&self, session: &Session) -> AuthContext {
        let profile = match self.profiles.find_by_user_id(session.user_id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::error!("Failed to load profile for user {}: {}", session.user_id, e);
                None
            }
        };
        AuthContext::from_profile(session.user_id, profile)
    }
}
