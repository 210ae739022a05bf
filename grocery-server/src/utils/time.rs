//! Time helpers
//!
//! Handlers turn calendar notions into `i64` Unix millis; repositories only
//! ever see millis.

use chrono::{DateTime, Local, TimeZone};

/// Midnight of the day containing `now`, in `now`'s time zone, as Unix millis.
///
/// DST gap fallback: if local midnight does not exist, the UTC midnight of
/// the same date is used.
pub fn day_start_millis<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let naive = now.date_naive().and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(now.timezone())
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of today in the server's local time zone
pub fn today_start_millis() -> i64 {
    day_start_millis(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn midnight_in_dubai() {
        let dubai = FixedOffset::east_opt(4 * 3600).unwrap();
        // 2024-03-10 01:30 in Dubai is 2024-03-09 21:30 UTC
        let now = dubai.with_ymd_and_hms(2024, 3, 10, 1, 30, 0).unwrap();
        let start = day_start_millis(&now);
        let expected = dubai.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(start, expected.timestamp_millis());
    }

    #[test]
    fn today_is_not_in_the_future() {
        assert!(today_start_millis() <= shared::util::now_millis());
    }
}
