//! Plain-text sink
//!
//! Title banner, one `Header: value` block per row, footer lines last.

use std::fmt::Write;

use super::{ReportError, ReportSink, ReportTable};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSink;

impl ReportSink for TextSink {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError> {
        let mut out = String::new();
        let rule = "=".repeat(table.title.chars().count().max(40));
        let render_err = |e: std::fmt::Error| ReportError::Render(e.to_string());

        writeln!(out, "{rule}").map_err(render_err)?;
        writeln!(out, "{}", table.title.to_uppercase()).map_err(render_err)?;
        writeln!(out, "{rule}").map_err(render_err)?;

        for (i, row) in table.rows.iter().enumerate() {
            writeln!(out).map_err(render_err)?;
            writeln!(out, "[{}]", i + 1).map_err(render_err)?;
            for (header, cell) in table.headers.iter().zip(row) {
                writeln!(out, "  {header}: {cell}").map_err(render_err)?;
            }
        }

        if !table.footer.is_empty() {
            writeln!(out).map_err(render_err)?;
            writeln!(out, "{}", "-".repeat(rule.len())).map_err(render_err)?;
            for line in &table.footer {
                writeln!(out, "{line}").map_err(render_err)?;
            }
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Cell;

    #[test]
    fn test_blocks_and_footer() {
        let table = ReportTable {
            title: "Reporte Fidelización".into(),
            headers: vec!["ID Cliente".into(), "Estado Cliente".into()],
            rows: vec![
                vec![Cell::from(7_i64), Cell::from("Activo")],
                vec![Cell::from(9_i64), Cell::from("Inactivo")],
            ],
            footer: vec!["Total candidatos: 2".into()],
        };
        let out = String::from_utf8(TextSink.render(&table).unwrap()).unwrap();
        assert!(out.contains("REPORTE FIDELIZACIÓN"));
        assert!(out.contains("[1]\n  ID Cliente: 7\n  Estado Cliente: Activo\n"));
        assert!(out.contains("[2]\n  ID Cliente: 9\n  Estado Cliente: Inactivo\n"));
        assert!(out.trim_end().ends_with("Total candidatos: 2"));
    }
}
