use crate::auth::AuthContext;
use crate::domains::contact::Contact;
use crate::domains::donation::DonationRecord;
use crate::domains::reporting::aggregation::{bucket_by_calendar_entry, format_amount, totals, EntryBucket};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::ISO_DATE_FORMAT;
use chrono::NaiveDate;
use serde::Serialize;

pub const EMPTY_EXPORT_MESSAGE: &str = "No data to export";

/// Strip characters spreadsheet apps mangle
pub fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\u{2028}' | '\u{2029}' => None,
            '\u{00A0}' => Some(' '),
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn optional_cell(value: &Option<String>) -> String {
    value.as_deref().map(sanitize_cell).unwrap_or_default()
}

fn date_cell(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format(ISO_DATE_FORMAT).to_string()).unwrap_or_default()
}

/// Rows that can be exported; admins get the extra ownership columns
pub trait ExportRecord {
    fn headers(admin: bool) -> Vec<&'static str>;

    fn to_row(&self, admin: bool) -> Vec<String>;
}

impl ExportRecord for DonationRecord {
    fn headers(admin: bool) -> Vec<&'static str> {
        let mut headers = vec!["Contact Name"];
        if admin {
            headers.extend(["Core Devotee", "Centre"]);
        }
        headers.extend([
            "Ekadashi",
            "Ekadashi Date",
            "Transaction Date",
            "Amount",
            "Transaction ID",
            "Receipt Number",
            "Transferred",
        ]);
        headers
    }

    fn to_row(&self, admin: bool) -> Vec<String> {
        let mut row = vec![sanitize_cell(&self.contact_name)];
        if admin {
            row.push(sanitize_cell(&self.devotee_name));
            row.push(optional_cell(&self.centre_name));
        }
        row.extend([
            optional_cell(&self.calendar_entry_name),
            date_cell(self.calendar_entry_date),
            date_cell(self.donation.transaction_date),
            self.donation.amount.to_string(),
            optional_cell(&self.donation.transaction_id),
            optional_cell(&self.donation.receipt_number),
            if self.donation.transferred { "Yes" } else { "No" }.to_string(),
        ]);
        row
    }
}

impl ExportRecord for Contact {
    fn headers(admin: bool) -> Vec<&'static str> {
        let mut headers = vec!["Name", "Phone", "Address", "Enrolment Date"];
        if admin {
            headers.push("Core Devotee");
        }
        headers
    }

    fn to_row(&self, admin: bool) -> Vec<String> {
        let mut row = vec![
            sanitize_cell(&self.name),
            sanitize_cell(&self.phone),
            optional_cell(&self.address),
            date_cell(Some(self.enrolment_date)),
        ];
        if admin {
            row.push(optional_cell(&self.owner_name));
        }
        row
    }
}

/// A titled, numbered table ready for an export sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub title: String,
    /// `(label, value)` lines printed above the table
    pub header_lines: Vec<(String, String)>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// `(label, value)` lines printed below the table
    pub summary: Vec<(String, String)>,
    /// Per-Ekadashi totals for report documents
    pub chart: Vec<EntryBucket>,
}

impl ExportTable {
    /// Number `records` from 1 in the given order under a `#` column.
    ///
    /// An empty set is an error: there is nothing to export.
    pub fn from_records<T: ExportRecord>(title: &str, records: &[T], admin: bool) -> DomainResult<Self> {
        if records.is_empty() {
            return Err(DomainError::Validation(ValidationError::custom(EMPTY_EXPORT_MESSAGE)));
        }

        let columns = std::iter::once("#")
            .chain(T::headers(admin))
            .map(str::to_string)
            .collect();

        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut row = vec![(i + 1).to_string()];
                row.extend(record.to_row(admin));
                row
            })
            .collect();

        Ok(Self {
            title: title.to_string(),
            header_lines: Vec::new(),
            columns,
            rows,
            summary: Vec::new(),
            chart: Vec::new(),
        })
    }

    pub fn with_header_line(mut self, label: &str, value: &str) -> Self {
        self.header_lines.push((label.to_string(), value.to_string()));
        self
    }

    pub fn with_summary_line(mut self, label: &str, value: &str) -> Self {
        self.summary.push((label.to_string(), value.to_string()));
        self
    }
}

fn exporter_lines(table: ExportTable, auth: &AuthContext, label: &str, export_date: NaiveDate) -> ExportTable {
    let mut table = table;
    if let Some(name) = &auth.display_name {
        table = table.with_header_line(label, name);
    }
    if let Some(centre) = &auth.centre_name {
        table = table.with_header_line("Centre", centre);
    }
    table.with_header_line("Export Date", &export_date.format(ISO_DATE_FORMAT).to_string())
}

/// Donation history report: the visible rows in display order, with totals
/// and per-Ekadashi chart buckets
pub fn project_donations(auth: &AuthContext, records: &[DonationRecord], export_date: NaiveDate) -> DomainResult<ExportTable> {
    let table = ExportTable::from_records("Donation History Report", records, auth.is_admin())?;
    let summary = totals(records);

    let mut table = exporter_lines(table, auth, "Core Devotee", export_date)
        .with_summary_line("Total Donations", &format_amount(summary.total))
        .with_summary_line("Total Entries", &summary.count.to_string());
    table.chart = bucket_by_calendar_entry(records);
    Ok(table)
}

pub fn project_contacts(auth: &AuthContext, contacts: &[Contact], export_date: NaiveDate) -> DomainResult<ExportTable> {
    let table = ExportTable::from_records("Contacts Report", contacts, auth.is_admin())?;
    Ok(exporter_lines(table, auth, "Exported By", export_date)
        .with_summary_line("Total Contacts", &contacts.len().to_string()))
}
