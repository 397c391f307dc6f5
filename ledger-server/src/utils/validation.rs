//! Input validation helpers
//!
//! Centralized text length constants and validation functions used by the
//! CRUD handlers. SQLite TEXT has no built-in length enforcement.

use chrono::{DateTime, NaiveDate};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Names: customer name parts, document type names
pub const MAX_NAME_LEN: usize = 100;

/// Short codes: document type codes
pub const MAX_CODE_LEN: usize = 10;

/// Document numbers
pub const MAX_DOCUMENT_LEN: usize = 20;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Phones, postal codes, tracking codes
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Notes, product descriptions
pub const MAX_NOTE_LEN: usize = 2000;

// ── Numeric limits ──────────────────────────────────────────────────

/// Largest monetary amount accepted (12 digits, 2 of them decimals)
pub const MAX_AMOUNT: f64 = 9_999_999_999.99;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation(format!("Invalid email address: {value}")));
    }
    Ok(())
}

/// Colombian phone numbers: optional `+`, optional `57` country prefix,
/// then 10 to 12 digits
pub fn validate_phone(value: &str) -> Result<(), AppError> {
    let digits = value.trim().strip_prefix('+').unwrap_or(value.trim());
    let all_digits = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
    let valid = all_digits
        && ["", "5", "7", "57"].iter().any(|prefix| {
            digits
                .strip_prefix(prefix)
                .is_some_and(|rest| (10..=12).contains(&rest.len()))
        });
    if !valid {
        return Err(AppError::validation(format!(
            "Invalid phone number: {value} (expected +57XXXXXXXXXX)"
        )));
    }
    Ok(())
}

/// Validate a birth date (YYYY-MM-DD) that is not after `today`
pub fn validate_birth_date(value: &str, today: NaiveDate) -> Result<(), AppError> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid birth_date: {value}")))?;
    if date > today {
        return Err(AppError::validation(format!(
            "birth_date {date} is in the future (today is {today})"
        )));
    }
    Ok(())
}

/// Validate a monetary amount is finite, non-negative and within [`MAX_AMOUNT`]
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed value {MAX_AMOUNT:.2}, got {value}"
        )));
    }
    Ok(())
}

/// Validate Unix millis map to a representable date-time
pub fn validate_timestamp(value: i64, field: &str) -> Result<(), AppError> {
    if DateTime::from_timestamp_millis(value).is_none() {
        return Err(AppError::validation(format!(
            "{field} is not a valid timestamp, got {value}"
        )));
    }
    Ok(())
}

/// Validate a count is at least 1
pub fn validate_positive(value: i64, field: &str) -> Result<(), AppError> {
    if value < 1 {
        return Err(AppError::validation(format!(
            "{field} must be at least 1, got {value}"
        )));
    }
    Ok(())
}
