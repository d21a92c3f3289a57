//! Role-scoped constraint sets for donation reads.
//!
//! A `DonationQuery` is built once from the caller and the filters, then
//! rendered into SQL by the repository. `matches` evaluates the same
//! predicates in memory.

use crate::auth::AuthContext;
use crate::domains::donation::types::{DonationFilter, DonationRecord};
use crate::types::Permission;
use crate::validation::ISO_DATE_FORMAT;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

/// One predicate over the donation listing join
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationConstraint {
    /// Contact belongs to this devotee (`contacts.core_devotee_id`)
    OwnedBy(Uuid),
    Contact(Uuid),
    CalendarEntry(Uuid),
    /// `transaction_date >= from`
    TransactionFrom(NaiveDate),
    /// `transaction_date <= to`
    TransactionTo(NaiveDate),
    /// Owning devotee's centre
    Centre(Uuid),
}

impl DonationConstraint {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            DonationConstraint::OwnedBy(id) => {
                builder.push(" AND c.core_devotee_id = ");
                builder.push_bind(id.to_string());
            }
            DonationConstraint::Contact(id) => {
                builder.push(" AND d.contact_id = ");
                builder.push_bind(id.to_string());
            }
            DonationConstraint::CalendarEntry(id) => {
                builder.push(" AND d.ekadashi_id = ");
                builder.push_bind(id.to_string());
            }
            DonationConstraint::TransactionFrom(date) => {
                builder.push(" AND d.transaction_date >= ");
                builder.push_bind(date.format(ISO_DATE_FORMAT).to_string());
            }
            DonationConstraint::TransactionTo(date) => {
                builder.push(" AND d.transaction_date <= ");
                builder.push_bind(date.format(ISO_DATE_FORMAT).to_string());
            }
            DonationConstraint::Centre(id) => {
                builder.push(" AND p.centre_id = ");
                builder.push_bind(id.to_string());
            }
        }
    }

    /// Missing dates or centres never match, as with SQL NULLs
    pub fn matches(&self, record: &DonationRecord) -> bool {
        match self {
            DonationConstraint::OwnedBy(id) => record.devotee_id == *id,
            DonationConstraint::Contact(id) => record.donation.contact_id == *id,
            DonationConstraint::CalendarEntry(id) => record.donation.calendar_entry_id == *id,
            DonationConstraint::TransactionFrom(from) => {
                record.donation.transaction_date.map_or(false, |d| d >= *from)
            }
            DonationConstraint::TransactionTo(to) => {
                record.donation.transaction_date.map_or(false, |d| d <= *to)
            }
            DonationConstraint::Centre(id) => record.centre_id == Some(*id),
        }
    }
}

/// Conjunction of donation constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationQuery {
    pub constraints: Vec<DonationConstraint>,
}

impl DonationQuery {
    /// Append `AND ...` clauses; the builder must already end in a WHERE clause
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for constraint in &self.constraints {
            constraint.push_sql(builder);
        }
    }

    pub fn matches(&self, record: &DonationRecord) -> bool {
        self.constraints.iter().all(|c| c.matches(record))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Constraints for reading donations as `auth` with `filter`.
///
/// Unset filters add nothing. Non-admins always get an owner constraint,
/// and their devotee and centre filters are ignored.
pub fn build_donation_query(auth: &AuthContext, filter: &DonationFilter) -> DonationQuery {
    let mut constraints = Vec::new();

    if auth.has_permission(Permission::ViewAllDonations) {
        if let Some(devotee_id) = filter.devotee_id.filter(|_| auth.has_permission(Permission::FilterByDevotee)) {
            constraints.push(DonationConstraint::OwnedBy(devotee_id));
        }
    } else {
        constraints.push(DonationConstraint::OwnedBy(auth.user_id));
    }

    if let Some(contact_id) = filter.contact_id {
        constraints.push(DonationConstraint::Contact(contact_id));
    }
    if let Some(entry_id) = filter.calendar_entry_id {
        constraints.push(DonationConstraint::CalendarEntry(entry_id));
    }
    if let Some(from) = filter.from {
        constraints.push(DonationConstraint::TransactionFrom(from));
    }
    if let Some(to) = filter.to {
        constraints.push(DonationConstraint::TransactionTo(to));
    }
    if let Some(centre_id) = filter.centre_id.filter(|_| auth.has_permission(Permission::FilterByCentre)) {
        constraints.push(DonationConstraint::Centre(centre_id));
    }

    DonationQuery { constraints }
}
