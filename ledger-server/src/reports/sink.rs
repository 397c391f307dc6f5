//! Tabular report model and the sink interface

use std::fmt;
use std::path::Path;

use super::ReportError;

/// One cell of a report row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    /// Monetary or other decimal value, printed with 2 decimals
    Number(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{n}"),
            Cell::Number(n) => write!(f, "{n:.2}"),
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Integer(n)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Flat report: header row, data rows, trailing summary lines
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub footer: Vec<String>,
}

/// Renders a [`ReportTable`] into bytes
///
/// Failures surface as [`ReportError`]; sinks never drop rows silently.
pub trait ReportSink: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError>;

    /// Render straight to a file
    fn write_to(&self, table: &ReportTable, path: &Path) -> Result<(), ReportError> {
        let bytes = self.render(table)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::text::TextSink;

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::from("Activo").to_string(), "Activo");
        assert_eq!(Cell::from(3_i64).to_string(), "3");
        assert_eq!(Cell::from(6_000_000.0).to_string(), "6000000.00");
    }

    #[test]
    fn test_write_to_file_and_missing_dir() {
        let table = ReportTable {
            title: "Prueba".into(),
            headers: vec!["A".into()],
            rows: vec![vec![Cell::from("x")]],
            footer: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prueba.txt");
        TextSink.write_to(&table, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("A: x"));

        let bad = dir.path().join("missing").join("prueba.txt");
        let err = TextSink.write_to(&table, &bad).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
