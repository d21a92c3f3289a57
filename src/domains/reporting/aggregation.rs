//! Totals and chart buckets over donation rows. Amounts stay `Decimal`
//! end to end; only `format_amount` produces text.

use crate::domains::donation::DonationRecord;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DonationTotals {
    pub total: Decimal,
    pub count: usize,
}

/// Summed amount for one Ekadashi label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBucket {
    pub label: String,
    pub total: Decimal,
}

pub fn totals(records: &[DonationRecord]) -> DonationTotals {
    DonationTotals {
        total: records.iter().map(|r| r.donation.amount).sum(),
        count: records.len(),
    }
}

/// Sum per `"<name> (<date>)"` label, in the order labels are first seen.
/// Rows whose Ekadashi did not resolve are left out of the chart.
pub fn bucket_by_calendar_entry(records: &[DonationRecord]) -> Vec<EntryBucket> {
    let mut buckets: Vec<EntryBucket> = Vec::new();
    for record in records {
        let Some(label) = record.calendar_label() else {
            continue;
        };
        match buckets.iter_mut().find(|b| b.label == label) {
            Some(bucket) => bucket.total += record.donation.amount,
            None => buckets.push(EntryBucket { label, total: record.donation.amount }),
        }
    }
    buckets
}

/// Total for one Ekadashi; zero when nothing is selected or nothing matches
pub fn entry_total(records: &[DonationRecord], entry_id: Option<Uuid>) -> Decimal {
    match entry_id {
        Some(id) => records
            .iter()
            .filter(|r| r.donation.calendar_entry_id == id)
            .map(|r| r.donation.amount)
            .sum(),
        None => Decimal::ZERO,
    }
}

/// Display form, e.g. `Rs. 1,250.50`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("Rs. {}{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}
