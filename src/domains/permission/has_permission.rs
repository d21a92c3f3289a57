use serde::{Deserialize, Serialize};

// --- User Role Definition ---

/// UserRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    CoreDevotee,
}

// --- Permission Enum Definition ---

/// Permission enum representing individual permissions in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // Contact permissions
    ViewContacts,
    CreateContacts,
    ViewAllContacts,

    // Donation permissions
    ViewDonations,
    CreateDonations,
    ViewAllDonations,

    // Reference data
    ViewCalendar,
    ViewFullCalendar,
    ViewDevotees,
    ViewCentres,

    // Filtering across devotees / centres
    FilterByDevotee,
    FilterByCentre,

    // Reporting
    ExportData,
}

impl Permission {
    /// Permissions that insert records
    pub fn is_write(&self) -> bool {
        matches!(self, Permission::CreateContacts | Permission::CreateDonations)
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::CoreDevotee => "core_devotee",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "core_devotee" => Some(UserRole::CoreDevotee),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Check if the role grants a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin => match permission {
                // Contacts are created by core devotees for themselves only
                Permission::CreateContacts => false,
                _ => true,
            },
            UserRole::CoreDevotee => match permission {
                Permission::ViewContacts
                | Permission::CreateContacts
                | Permission::ViewDonations
                | Permission::CreateDonations
                | Permission::ViewCalendar
                | Permission::ExportData => true,

                Permission::ViewAllContacts
                | Permission::ViewAllDonations
                | Permission::ViewFullCalendar
                | Permission::ViewDevotees
                | Permission::ViewCentres
                | Permission::FilterByDevotee
                | Permission::FilterByCentre => false,
            },
        }
    }

}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
