//! Day-boundary normalization for date filters and opportunity windows.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

/// Truncates a timestamp to 00:00:00.000 of its UTC day.
pub fn start_of_day(value: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&value.date_naive().and_time(NaiveTime::MIN))
}

/// Moves a timestamp to 23:59:59.999 of its UTC day.
pub fn end_of_day(value: DateTime<Utc>) -> DateTime<Utc> {
    let last_millisecond =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&value.date_naive().and_time(last_millisecond))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_start_of_day() {
        let value = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        let start = start_of_day(value);

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_end_of_day() {
        let value = Utc.with_ymd_and_hms(2024, 3, 15, 1, 2, 3).unwrap();
        let end = end_of_day(value);

        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
        assert_eq!(end.second(), 59);
        assert_eq!(end.nanosecond(), 999_000_000);
        assert_eq!(end.date_naive(), value.date_naive());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let value = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(start_of_day(start_of_day(value)), start_of_day(value));
        assert_eq!(end_of_day(end_of_day(value)), end_of_day(value));
    }
}
