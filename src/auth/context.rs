use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::domains::devotee::DevoteeProfile;
use crate::types::{UserRole, Permission};
use crate::errors::ServiceError;

/// The authenticated identity for the current session.
///
/// Built once after login and handed to every service call. A session whose
/// profile row could not be loaded still yields a context, with
/// `profile_loaded == false` and the lowest-privilege role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    /// The ID of the authenticated user
    pub user_id: Uuid,

    /// The role of the authenticated user
    pub role: UserRole,

    pub display_name: Option<String>,

    pub centre_name: Option<String>,

    /// False when the session exists but its profile could not be read
    pub profile_loaded: bool,
}

impl AuthContext {
    /// Create a new authentication context
    pub fn new(user_id: Uuid, role: UserRole, display_name: Option<String>, centre_name: Option<String>) -> Self {
        Self {
            user_id,
            role,
            display_name,
            centre_name,
            profile_loaded: true,
        }
    }

    pub fn from_profile(user_id: Uuid, profile: Option<DevoteeProfile>) -> Self {
        match profile {
            Some(p) => Self::new(user_id, p.role, Some(p.name), p.centre_name),
            None => Self {
                user_id,
                role: UserRole::CoreDevotee,
                display_name: None,
                centre_name: None,
                profile_loaded: false,
            },
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if user has a specific permission. Without a loaded profile
    /// the context is read-only.
    pub fn has_permission(&self, permission: Permission) -> bool {
        if !self.profile_loaded && permission.is_write() {
            return false;
        }
        self.role.has_permission(permission)
    }

    /// Authorize a specific permission, returning an error if not allowed
    pub fn authorize(&self, permission: Permission) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else if !self.profile_loaded && permission.is_write() {
            Err(ServiceError::PermissionDenied(
                "Your devotee profile could not be loaded; records cannot be saved".to_string()
            ))
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "User does not have permission: {:?}",
                permission
            )))
        }
    }

    /// For operations restricted to the user's own records
    pub fn authorize_self_or_admin(&self, resource_owner_id: &Uuid) -> Result<(), ServiceError> {
        if &self.user_id == resource_owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "You can only work with your own contacts".to_string()
            ))
        }
    }

    /// Header greeting, e.g. `Welcome, Radha (Pune)`. None without a profile.
    pub fn greeting(&self) -> Option<String> {
        let name = self.display_name.as_ref()?;
        Some(match &self.centre_name {
            Some(centre) => format!("Welcome, {} ({})", name, centre),
            None => format!("Welcome, {}", name),
        })
    }

    pub fn role_badge(&self) -> Option<&'static str> {
        self.is_admin().then_some("Administrator View")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile_degrades_to_core_devotee() {
        let ctx = AuthContext::from_profile(Uuid::new_v4(), None);
        assert_eq!(ctx.role, UserRole::CoreDevotee);
        assert!(!ctx.profile_loaded);
        assert!(ctx.greeting().is_none());
        assert!(ctx.authorize(Permission::ViewAllDonations).is_err());
    }

    #[test]
    fn test_missing_profile_is_read_only() {
        let ctx = AuthContext::from_profile(Uuid::new_v4(), None);
        assert!(ctx.authorize(Permission::ViewDonations).is_ok());
        assert!(ctx.authorize(Permission::ExportData).is_ok());
        assert!(matches!(ctx.authorize(Permission::CreateContacts), Err(ServiceError::PermissionDenied(_))));
        assert!(matches!(ctx.authorize(Permission::CreateDonations), Err(ServiceError::PermissionDenied(_))));
    }

    #[test]
    fn test_greeting_and_badge() {
        let admin = AuthContext::new(Uuid::new_v4(), UserRole::Admin, Some("Gopal".into()), Some("Pune".into()));
        assert_eq!(admin.greeting().as_deref(), Some("Welcome, Gopal (Pune)"));
        assert_eq!(admin.role_badge(), Some("Administrator View"));

        let devotee = AuthContext::new(Uuid::new_v4(), UserRole::CoreDevotee, Some("Radha".into()), None);
        assert_eq!(devotee.greeting().as_deref(), Some("Welcome, Radha"));
        assert_eq!(devotee.role_badge(), None);
    }

    #[test]
    fn test_self_or_admin() {
        let owner = Uuid::new_v4();
        let devotee = AuthContext::new(owner, UserRole::CoreDevotee, None, None);
        assert!(devotee.authorize_self_or_admin(&owner).is_ok());
        assert!(devotee.authorize_self_or_admin(&Uuid::new_v4()).is_err());

        let admin = AuthContext::new(Uuid::new_v4(), UserRole::Admin, None, None);
        assert!(admin.authorize_self_or_admin(&owner).is_ok());
    }
}
