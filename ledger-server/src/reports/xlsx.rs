//! XLSX sink (rust_xlsxwriter)
//!
//! Bold white-on-blue header row, 20-character columns, footer lines one
//! blank row below the data in column A.

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use super::{Cell, ReportError, ReportSink, ReportTable};

const COLUMN_WIDTH: f64 = 20.0;
const HEADER_FILL: u32 = 0x366092;
/// Excel sheet names are capped at 31 characters
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSink;

/// Strip characters Excel rejects in sheet names
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Reporte".to_string()
    } else {
        cleaned
    }
}

impl ReportSink for XlsxSink {
    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&table.title))?;

        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        for (col, header) in table.headers.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, header, &header_format)?;
            worksheet.set_column_width(col, COLUMN_WIDTH)?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let row_idx = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(s) => worksheet.write_string(row_idx, col, s)?,
                    Cell::Integer(n) => worksheet.write_number(row_idx, col, *n as f64)?,
                    Cell::Number(n) => worksheet.write_number(row_idx, col, *n)?,
                };
            }
        }

        let footer_start = table.rows.len() as u32 + 2;
        for (i, line) in table.footer.iter().enumerate() {
            worksheet.write_string(footer_start + i as u32, 0, line)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_sanitized() {
        assert_eq!(sheet_name("Reporte Fidelización"), "Reporte Fidelización");
        assert_eq!(sheet_name("Ventas 2024/03"), "Ventas 202403");
        assert_eq!(sheet_name("???"), "Reporte");
        assert_eq!(sheet_name(&"x".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn test_renders_workbook_bytes() {
        let table = ReportTable {
            title: "Reporte Fidelización".into(),
            headers: vec!["ID Cliente".into(), "Total Último Mes (COP)".into()],
            rows: vec![vec![Cell::Integer(1), Cell::Number(6_000_000.0)]],
            footer: vec!["Total candidatos: 1".into()],
        };
        let bytes = XlsxSink.render(&table).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }
}
