//! Report generation
//!
//! Report data is flattened into a [`ReportTable`] and handed to a
//! [`ReportSink`] that renders it as XLSX, CSV or plain text. The
//! [`analysis`] module holds the JSON analytics over the whole ledger.

pub mod analysis;
pub mod delimited;
pub mod row;
pub mod sink;
pub mod text;
pub mod xlsx;

use serde::Deserialize;
use shared::error::AppError;
use std::str::FromStr;
use thiserror::Error;

pub use sink::{Cell, ReportSink, ReportTable};

/// Report rendering errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Render(err.to_string())
    }
}

impl From<::csv::Error> for ReportError {
    fn from(err: ::csv::Error) -> Self {
        ReportError::Render(err.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::render(format!("Failed to render report: {err}"))
    }
}

/// Output format of a tabular report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
    Txt,
}

impl ReportFormat {
    pub fn sink(self) -> Box<dyn ReportSink> {
        match self {
            Self::Xlsx => Box::new(xlsx::XlsxSink),
            Self::Csv => Box::new(delimited::CsvSink),
            Self::Txt => Box::new(text::TextSink),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(format!("unsupported report format: {other}")),
        }
    }
}

/// Rendered report ready to be sent as a download
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Render `table` in `format`; `basename` gets the sink's extension
pub fn render(
    table: &ReportTable,
    format: ReportFormat,
    basename: &str,
) -> Result<RenderedReport, ReportError> {
    let sink = format.sink();
    let bytes = sink.render(table)?;
    tracing::info!(
        report = %table.title,
        rows = table.rows.len(),
        format = sink.extension(),
        bytes = bytes.len(),
        "Report rendered"
    );
    Ok(RenderedReport {
        bytes,
        content_type: sink.content_type(),
        filename: format!("{basename}.{}", sink.extension()),
    })
}
