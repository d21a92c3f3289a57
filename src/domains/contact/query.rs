use crate::auth::AuthContext;
use crate::domains::contact::types::{Contact, ContactFilter};
use crate::types::Permission;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

/// One predicate on the contacts table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactConstraint {
    /// `contacts.core_devotee_id = ?`
    OwnedBy(Uuid),
}

impl ContactConstraint {
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            ContactConstraint::OwnedBy(owner) => contact.owner_devotee_id == *owner,
        }
    }
}

/// Conjunction of constraints for a contact read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
    pub constraints: Vec<ContactConstraint>,
}

impl ContactQuery {
    /// Append `AND ...` clauses; the builder must already end in a WHERE clause
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for constraint in &self.constraints {
            match constraint {
                ContactConstraint::OwnedBy(owner) => {
                    builder.push(" AND c.core_devotee_id = ");
                    builder.push_bind(owner.to_string());
                }
            }
        }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        self.constraints.iter().all(|c| c.matches(contact))
    }
}

/// Constraints for listing contacts as `auth`.
///
/// Non-admins are always scoped to their own contacts and the devotee
/// filter is dropped. Admins get the devotee filter when set.
pub fn build_contact_query(auth: &AuthContext, filter: &ContactFilter) -> ContactQuery {
    let mut constraints = Vec::new();

    if auth.has_permission(Permission::ViewAllContacts) {
        if let Some(devotee_id) = filter.devotee_id {
            constraints.push(ContactConstraint::OwnedBy(devotee_id));
        }
    } else {
        constraints.push(ContactConstraint::OwnedBy(auth.user_id));
    }

    ContactQuery { constraints }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;

    #[test]
    fn test_devotee_always_scoped_to_self() {
        let me = Uuid::new_v4();
        let devotee = AuthContext::new(me, UserRole::CoreDevotee, None, None);

        let unfiltered = build_contact_query(&devotee, &ContactFilter::default());
        assert_eq!(unfiltered.constraints, vec![ContactConstraint::OwnedBy(me)]);

        let other = ContactFilter { devotee_id: Some(Uuid::new_v4()) };
        assert_eq!(build_contact_query(&devotee, &other), unfiltered);
    }

    #[test]
    fn test_admin_filter_optional() {
        let admin = AuthContext::new(Uuid::new_v4(), UserRole::Admin, None, None);
        assert!(build_contact_query(&admin, &ContactFilter::default()).constraints.is_empty());

        let devotee_id = Uuid::new_v4();
        let query = build_contact_query(&admin, &ContactFilter { devotee_id: Some(devotee_id) });
        assert_eq!(query.constraints, vec![ContactConstraint::OwnedBy(devotee_id)]);
    }

    #[test]
    fn test_query_renders_bound_predicate() {
        let query = ContactQuery { constraints: vec![ContactConstraint::OwnedBy(Uuid::nil())] };
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT c.id FROM contacts c WHERE 1=1");
        query.push_conditions(&mut builder);
        assert_eq!(builder.sql(), "SELECT c.id FROM contacts c WHERE 1=1 AND c.core_devotee_id = ?");
    }
}
