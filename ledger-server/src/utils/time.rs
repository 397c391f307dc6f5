//! Business timezone helpers
//!
//! Storage keeps `i64` Unix millis. Calendar concepts (month windows, month
//! buckets, printed dates) are resolved in the configured business timezone.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Fallback when `BUSINESS_TIMEZONE` is missing or invalid
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Bogota;

/// Parse an IANA timezone name, falling back to [`DEFAULT_TIMEZONE`]
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!(
            "Invalid business timezone '{}': {}, falling back to {}",
            name,
            e,
            DEFAULT_TIMEZONE
        );
        DEFAULT_TIMEZONE
    })
}

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Current instant in the business timezone
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Unix millis → local date-time (out-of-range values clamp to the epoch)
pub fn millis_to_local(millis: i64, tz: Tz) -> DateTime<Tz> {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
}

/// First instant of `date` in `tz` as Unix millis
///
/// When local midnight falls in a DST gap the UTC midnight is used.
pub fn start_of_day_millis(date: NaiveDate, tz: Tz) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .timestamp_millis()
}

/// Unix millis → `dd/mm/yyyy` in the business timezone
pub fn format_date(millis: i64, tz: Tz) -> String {
    millis_to_local(millis, tz).format("%d/%m/%Y").to_string()
}

/// Unix millis → `YYYY-MM` month bucket in the business timezone
pub fn month_key(millis: i64, tz: Tz) -> String {
    millis_to_local(millis, tz).format("%Y-%m").to_string()
}

/// Subtract one calendar month
///
/// The day clamps to the end of the shorter month (Mar 31 → Feb 28/29).
/// When the shifted wall-clock time does not exist in `tz` (DST gap) the
/// shift is applied on the UTC timeline instead.
pub fn one_month_before(at: DateTime<Tz>) -> DateTime<Tz> {
    at.checked_sub_months(Months::new(1)).unwrap_or_else(|| {
        let utc = at.naive_utc();
        let shifted = utc.checked_sub_months(Months::new(1)).unwrap_or(utc);
        at.timezone().from_utc_datetime(&shifted)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(tz: Tz, y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
    }

    #[test]
    fn test_one_month_before_clamps_to_month_end() {
        let tz = DEFAULT_TIMEZONE;
        assert_eq!(
            one_month_before(local(tz, 2024, 3, 31, 10)),
            local(tz, 2024, 2, 29, 10)
        );
        assert_eq!(
            one_month_before(local(tz, 2023, 3, 31, 10)),
            local(tz, 2023, 2, 28, 10)
        );
        assert_eq!(
            one_month_before(local(tz, 2024, 1, 31, 23)),
            local(tz, 2023, 12, 31, 23)
        );
        assert_eq!(
            one_month_before(local(tz, 2024, 5, 15, 8)),
            local(tz, 2024, 4, 15, 8)
        );
    }

    #[test]
    fn test_format_and_month_key_use_business_timezone() {
        // 2024-03-01T02:00:00Z is still Feb 29 in Bogotá (UTC-5)
        let millis = Utc
            .with_ymd_and_hms(2024, 3, 1, 2, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(format_date(millis, DEFAULT_TIMEZONE), "29/02/2024");
        assert_eq!(month_key(millis, DEFAULT_TIMEZONE), "2024-02");
        assert_eq!(month_key(millis, chrono_tz::UTC), "2024-03");
    }

    #[test]
    fn test_start_of_day_in_business_timezone() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 1, 5, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(start_of_day_millis(date, DEFAULT_TIMEZONE), expected);
    }

    #[test]
    fn test_parse_timezone_fallback() {
        assert_eq!(parse_timezone("Europe/Madrid"), chrono_tz::Europe::Madrid);
        assert_eq!(parse_timezone("Mars/Olympus"), DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("1990-06-15").unwrap(),
            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
        );
        assert!(parse_date("15/06/1990").is_err());
    }
}
