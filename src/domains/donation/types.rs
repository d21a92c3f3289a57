use crate::domains::calendar::entry_label;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{parse_amount, parse_iso_date, Validate, ValidationBuilder};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DONATION_REQUIRED_MESSAGE: &str = "Contact, Ekadashi, and Amount are required";
pub const TRANSFER_CONFIRMATION_MESSAGE: &str = "Please confirm that the donation has been transferred before saving.";

/// A donation recorded against a contact and an Ekadashi
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub calendar_entry_id: Uuid,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub receipt_number: Option<String>,
    pub transferred: bool,
}

/// A donation joined with its contact, devotee, centre and Ekadashi
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub donation: Donation,
    pub contact_name: String,
    pub devotee_id: Uuid,
    pub devotee_name: String,
    pub centre_id: Option<Uuid>,
    pub centre_name: Option<String>,
    pub calendar_entry_name: Option<String>,
    pub calendar_entry_date: Option<NaiveDate>,
}

impl DonationRecord {
    /// Chart bucket label, `"<name> (<date>)"`. None when the Ekadashi row is missing.
    pub fn calendar_label(&self) -> Option<String> {
        match (&self.calendar_entry_name, &self.calendar_entry_date) {
            (Some(name), Some(date)) => Some(entry_label(name, date)),
            _ => None,
        }
    }
}

/// Raw input from the add-donation form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDonation {
    pub contact_id: Option<Uuid>,
    pub calendar_entry_id: Option<Uuid>,
    /// As typed, e.g. `"1,250.50"`
    pub amount: String,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub receipt_number: Option<String>,
    pub transferred: bool,
}

/// A donation that passed validation and is ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationDraft {
    pub contact_id: Uuid,
    pub calendar_entry_id: Uuid,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub receipt_number: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl NewDonation {
    /// Validate in form order: required fields, amount, then transfer confirmation.
    pub fn to_draft(&self) -> DomainResult<DonationDraft> {
        let (contact_id, calendar_entry_id) = match (self.contact_id, self.calendar_entry_id) {
            (Some(c), Some(e)) if !self.amount.trim().is_empty() => (c, e),
            _ => return Err(DomainError::Validation(ValidationError::custom(DONATION_REQUIRED_MESSAGE))),
        };

        let amount = parse_amount(&self.amount, "amount")?;
        ValidationBuilder::new("amount", Some(amount)).positive().validate()?;

        let transaction_id = non_empty(&self.transaction_id);
        let receipt_number = non_empty(&self.receipt_number);
        ValidationBuilder::new("transaction_id", transaction_id.clone()).max_length(100).validate()?;
        ValidationBuilder::new("receipt_number", receipt_number.clone()).max_length(100).validate()?;

        if !self.transferred {
            return Err(DomainError::Validation(ValidationError::custom(TRANSFER_CONFIRMATION_MESSAGE)));
        }

        Ok(DonationDraft {
            contact_id,
            calendar_entry_id,
            amount,
            transaction_id,
            transaction_date: self.transaction_date,
            receipt_number,
        })
    }
}

impl Validate for NewDonation {
    fn validate(&self) -> DomainResult<()> {
        self.to_draft().map(|_| ())
    }
}

/// Donation history filters; all optional and conjunctive.
///
/// `devotee_id` and `centre_id` are honoured for admins only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationFilter {
    pub contact_id: Option<Uuid>,
    pub calendar_entry_id: Option<Uuid>,
    /// Inclusive lower bound on the transaction date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date
    pub to: Option<NaiveDate>,
    pub devotee_id: Option<Uuid>,
    pub centre_id: Option<Uuid>,
}

impl DonationFilter {
    pub fn is_empty(&self) -> bool {
        self == &DonationFilter::default()
    }
}

impl Validate for DonationFilter {
    fn validate(&self) -> DomainResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    "to",
                    "must be on or after the start date",
                )));
            }
        }
        Ok(())
    }
}

/// DonationRow - SQLite row of the donation listing join
#[derive(Debug, Clone, FromRow)]
pub struct DonationRow {
    pub id: String,
    pub contact_id: String,
    pub ekadashi_id: String,
    pub amount: String,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<String>,
    pub receipt_number: Option<String>,
    pub transferred: i64,
    pub contact_name: String,
    pub core_devotee_id: String,
    pub devotee_name: String,
    pub centre_id: Option<String>,
    pub centre_name: Option<String>,
    pub ekadashi_name: Option<String>,
    pub ekadashi_date: Option<String>,
}

impl DonationRow {
    pub fn into_entity(self) -> DomainResult<DonationRecord> {
        let parse_uuid = |s: &str| Uuid::parse_str(s).map_err(|_| DomainError::InvalidUuid(s.to_string()));
        let parse_date = |s: &Option<String>, field: &str| -> DomainResult<Option<NaiveDate>> {
            Ok(s.as_deref().map(|v| parse_iso_date(v, field)).transpose()?)
        };

        let donation = Donation {
            id: parse_uuid(&self.id)?,
            contact_id: parse_uuid(&self.contact_id)?,
            calendar_entry_id: parse_uuid(&self.ekadashi_id)?,
            amount: parse_amount(&self.amount, "amount")?,
            transaction_id: self.transaction_id,
            transaction_date: parse_date(&self.transaction_date, "transaction_date")?,
            receipt_number: self.receipt_number,
            transferred: self.transferred != 0,
        };

        Ok(DonationRecord {
            donation,
            contact_name: self.contact_name,
            devotee_id: parse_uuid(&self.core_devotee_id)?,
            devotee_name: self.devotee_name,
            centre_id: self.centre_id.as_deref().map(parse_uuid).transpose()?,
            centre_name: self.centre_name,
            calendar_entry_name: self.ekadashi_name,
            calendar_entry_date: parse_date(&self.ekadashi_date, "ekadashi_date")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn complete() -> NewDonation {
        NewDonation {
            contact_id: Some(Uuid::new_v4()),
            calendar_entry_id: Some(Uuid::new_v4()),
            amount: "1,250.50".into(),
            transaction_id: Some("  ".into()),
            transferred: true,
            ..Default::default()
        }
    }

    fn message(result: DomainResult<DonationDraft>) -> String {
        match result {
            Err(DomainError::Validation(v)) => v.to_string(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_input_becomes_draft() {
        let draft = complete().to_draft().unwrap();
        assert_eq!(draft.amount, dec!(1250.50));
        assert_eq!(draft.transaction_id, None);
    }

    #[test]
    fn test_required_fields_checked_first() {
        let missing_contact = NewDonation { contact_id: None, transferred: false, ..complete() };
        assert_eq!(message(missing_contact.to_draft()), DONATION_REQUIRED_MESSAGE);

        let blank_amount = NewDonation { amount: " ".into(), ..complete() };
        assert_eq!(message(blank_amount.to_draft()), DONATION_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_transfer_must_be_confirmed() {
        let unconfirmed = NewDonation { transferred: false, ..complete() };
        assert_eq!(message(unconfirmed.to_draft()), TRANSFER_CONFIRMATION_MESSAGE);
    }

    #[test]
    fn test_amount_must_be_positive_decimal() {
        for bad in ["0", "-5", "abc"] {
            let input = NewDonation { amount: bad.into(), ..complete() };
            assert!(input.validate().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_filter_range_order() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let inverted = DonationFilter { from: Some(d("2024-03-10")), to: Some(d("2024-03-01")), ..Default::default() };
        assert!(inverted.validate().is_err());

        let single_day = DonationFilter { from: Some(d("2024-03-10")), to: Some(d("2024-03-10")), ..Default::default() };
        assert!(single_day.validate().is_ok());
        assert!(DonationFilter::default().is_empty());
    }
}
