//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored as `f64`; every sum, mean and threshold comparison is
//! done in `Decimal` and converted back for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert a stored amount to Decimal, rounded to 2 decimal places
///
/// `None` for non-finite values and values outside the Decimal range.
pub fn try_to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero))
}

/// Lossy [`try_to_decimal`] for read-only reporting, zero when unrepresentable
pub fn to_decimal(value: f64) -> Decimal {
    try_to_decimal(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Unrepresentable f64 in monetary report, counted as zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Mean of `total` over `count` items, zero when empty
pub fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage change from `previous` to `current`, `None` without a base
pub fn growth_percentage(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    Some(
        ((current - previous) / previous * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
    )
}

/// Parse a user-supplied amount (`"5000000"`, `"5000000.50"`)
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// `$5,000,000` style rendering with thousands separators, no decimals
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_is_exact() {
        let total: Decimal = [0.1, 0.2, 0.3].into_iter().map(to_decimal).sum();
        assert_eq!(total, Decimal::new(60, 2));
        assert_eq!(to_f64(total), 0.6);
    }

    #[test]
    fn test_unrepresentable_amounts() {
        assert_eq!(try_to_decimal(f64::NAN), None);
        assert_eq!(try_to_decimal(f64::INFINITY), None);
        assert_eq!(try_to_decimal(1e30), None);
        assert_eq!(try_to_decimal(42.5), Some(Decimal::new(425, 1)));
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_mean_and_growth() {
        assert_eq!(mean(Decimal::from(10), 3), Decimal::new(333, 2));
        assert_eq!(mean(Decimal::from(10), 0), Decimal::ZERO);
        assert_eq!(
            growth_percentage(Decimal::from(200), Decimal::from(250)),
            Some(Decimal::from(25))
        );
        assert_eq!(growth_percentage(Decimal::ZERO, Decimal::from(250)), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 5000000 "), Some(Decimal::from(5_000_000)));
        assert_eq!(parse_amount("12.5"), Some(Decimal::new(125, 1)));
        assert_eq!(parse_amount("cinco"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::from(5_000_000)), "$5,000,000");
        assert_eq!(format_currency(Decimal::from(999)), "$999");
        assert_eq!(format_currency(Decimal::new(12345675, 1)), "$1,234,568");
        assert_eq!(format_currency(Decimal::from(-1500)), "-$1,500");
        assert_eq!(format_currency(Decimal::ZERO), "$0");
    }
}
