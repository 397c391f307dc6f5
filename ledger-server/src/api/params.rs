//! Query parameter parsing shared by the report endpoints

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};

use crate::ledger::money;
use crate::reports::ReportFormat;

/// Loyalty threshold from a raw `min_amount` parameter
///
/// Absent, unparsable or negative values fall back to `default`.
pub fn min_amount(raw: Option<&str>, default: Decimal) -> Decimal {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match money::parse_amount(raw) {
        Some(amount) if !amount.is_sign_negative() => amount,
        _ => {
            tracing::warn!(min_amount = %raw, default = %default, "Unusable min_amount, using default");
            default
        }
    }
}

/// Report format from a raw `format` parameter, XLSX when absent
pub fn report_format(raw: Option<&str>) -> Result<ReportFormat, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ReportFormat::default()),
        Some(value) => value.parse().map_err(|e: String| {
            AppError::with_message(ErrorCode::ReportFormatUnsupported, e)
                .with_detail("format", value)
        }),
    }
}
