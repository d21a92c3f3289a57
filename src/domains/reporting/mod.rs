pub mod aggregation;
pub mod export;
pub mod sink;
pub mod service;

pub use aggregation::{bucket_by_calendar_entry, entry_total, format_amount, totals, DonationTotals, EntryBucket};
pub use export::{project_contacts, project_donations, ExportRecord, ExportTable, EMPTY_EXPORT_MESSAGE};
pub use sink::{export_to_file, CsvSpreadsheetSink, ExportSink, ExportStats, JsonReportSink};
pub use service::{DonationHistory, ReportingService, ReportingServiceImpl};
