use crate::domains::reporting::export::ExportTable;
use crate::errors::{DomainError, DomainResult};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Bytes and rows produced by one export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExportStats {
    pub rows_written: usize,
    pub bytes_written: usize,
}

/// Destination format for an `ExportTable`
#[async_trait]
pub trait ExportSink: Send + Sync {
    fn file_extension(&self) -> &'static str;

    async fn write_table(
        &self,
        table: &ExportTable,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> DomainResult<ExportStats>;
}

fn io_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::Export(e.to_string())
}

/// One-sheet spreadsheet as CSV, prefixed with a UTF-8 BOM so Excel reads
/// non-ASCII names correctly
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSpreadsheetSink;

impl CsvSpreadsheetSink {
    fn render(table: &ExportTable) -> DomainResult<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"\xEF\xBB\xBF");
        {
            let mut wtr = csv::WriterBuilder::new()
                .flexible(false)
                .from_writer(&mut buffer);

            wtr.write_record(&table.columns).map_err(io_error)?;
            for row in &table.rows {
                wtr.write_record(row).map_err(io_error)?;
            }
            wtr.flush().map_err(io_error)?;
        }
        Ok(buffer)
    }
}

#[async_trait]
impl ExportSink for CsvSpreadsheetSink {
    fn file_extension(&self) -> &'static str {
        "csv"
    }

    async fn write_table(
        &self,
        table: &ExportTable,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> DomainResult<ExportStats> {
        let buffer = Self::render(table)?;
        out.write_all(&buffer).await.map_err(io_error)?;
        out.flush().await.map_err(io_error)?;

        Ok(ExportStats {
            rows_written: table.rows.len(),
            bytes_written: buffer.len(),
        })
    }
}

/// Report document: title, header lines, table, summary and chart buckets
/// as pretty-printed JSON for a document renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportSink {
    pub include_chart: bool,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    title: &'a str,
    header_lines: Vec<ReportLine<'a>>,
    columns: &'a [String],
    rows: &'a [Vec<String>],
    summary: Vec<ReportLine<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<&'a [crate::domains::reporting::aggregation::EntryBucket]>,
}

#[derive(Serialize)]
struct ReportLine<'a> {
    label: &'a str,
    value: &'a str,
}

fn lines(pairs: &[(String, String)]) -> Vec<ReportLine<'_>> {
    pairs
        .iter()
        .map(|(label, value)| ReportLine { label, value })
        .collect()
}

#[async_trait]
impl ExportSink for JsonReportSink {
    fn file_extension(&self) -> &'static str {
        "json"
    }

    async fn write_table(
        &self,
        table: &ExportTable,
        out: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> DomainResult<ExportStats> {
        let document = ReportDocument {
            title: &table.title,
            header_lines: lines(&table.header_lines),
            columns: &table.columns,
            rows: &table.rows,
            summary: lines(&table.summary),
            chart: (self.include_chart && !table.chart.is_empty()).then_some(table.chart.as_slice()),
        };

        let buffer = serde_json::to_vec_pretty(&document).map_err(io_error)?;
        out.write_all(&buffer).await.map_err(io_error)?;
        out.flush().await.map_err(io_error)?;

        Ok(ExportStats {
            rows_written: table.rows.len(),
            bytes_written: buffer.len(),
        })
    }
}

/// Write `table` to `path` through `sink`, creating or truncating the file
pub async fn export_to_file(sink: &dyn ExportSink, table: &ExportTable, path: &Path) -> DomainResult<ExportStats> {
    let mut file = tokio::fs::File::create(path).await.map_err(io_error)?;
    let stats = sink.write_table(table, &mut file).await?;
    log::info!(
        "Exported {} rows ({} bytes) of '{}' to {}",
        stats.rows_written,
        stats.bytes_written,
        table.title,
        path.display()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::reporting::aggregation::EntryBucket;
    use rust_decimal_macros::dec;

    fn table() -> ExportTable {
        ExportTable {
            title: "Contacts Report".into(),
            header_lines: vec![("Exported By".into(), "Rādhā".into())],
            columns: vec!["#".into(), "Name".into(), "Address".into()],
            rows: vec![
                vec!["1".into(), "Madhavi".into(), "12, MG Road".into()],
                vec!["2".into(), "Keshav".into(), "".into()],
            ],
            summary: vec![("Total Contacts".into(), "2".into())],
            chart: vec![EntryBucket { label: "Kamada (2024-03-20)".into(), total: dec!(50) }],
        }
    }

    #[tokio::test]
    async fn test_csv_has_bom_and_quotes_commas() {
        let mut out: Vec<u8> = Vec::new();
        let stats = CsvSpreadsheetSink.write_table(&table(), &mut out).await.unwrap();

        assert!(out.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(out[3..].to_vec()).unwrap();
        assert_eq!(text, "#,Name,Address\n1,Madhavi,\"12, MG Road\"\n2,Keshav,\n");
        assert_eq!(stats.rows_written, 2);
        assert_eq!(stats.bytes_written, out.len());
    }

    #[tokio::test]
    async fn test_json_report_document() {
        let mut out: Vec<u8> = Vec::new();
        JsonReportSink { include_chart: true }.write_table(&table(), &mut out).await.unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["title"], "Contacts Report");
        assert_eq!(doc["header_lines"][0]["value"], "Rādhā");
        assert_eq!(doc["rows"][1][1], "Keshav");
        assert_eq!(doc["summary"][0]["label"], "Total Contacts");
        assert_eq!(doc["chart"][0]["label"], "Kamada (2024-03-20)");

        let mut plain: Vec<u8> = Vec::new();
        JsonReportSink::default().write_table(&table(), &mut plain).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&plain).unwrap();
        assert!(doc.get("chart").is_none());
    }

    #[tokio::test]
    async fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("contacts.{}", CsvSpreadsheetSink.file_extension()));

        let stats = export_to_file(&CsvSpreadsheetSink, &table(), &path).await.unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), stats.bytes_written);
        assert!(written.starts_with(b"\xEF\xBB\xBF"));
    }
}
