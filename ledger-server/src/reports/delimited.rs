//! CSV sink

use super::{ReportError, ReportSink, ReportTable};

/// Comma-separated values, header row first, no footer
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl ReportSink for CsvSink {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| ReportError::Render(e.to_string()))
    }
}
