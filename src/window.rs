// SPDX-License-Identifier: MIT

//! Date range resolution for the sync window.
//!
//! Turns optional `YYYY-MM-DD` strings into a concrete half-open window
//! `[start, end)`. When unspecified the window covers the last 3 days
//! through tomorrow, truncated to UTC midnight, so today's activities are
//! always included.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::{Result, SyncError};

/// Days back from "now" when no start date is given.
const DEFAULT_LOOKBACK_DAYS: i64 = 3;

/// The half-open `[start, end)` time window bounding a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// Resolve optional calendar-date inputs against an injected clock.
    ///
    /// `now` is a parameter rather than `Utc::now()` so the defaulting
    /// behavior is testable with a fixed clock.
    pub fn resolve(
        start_date: Option<&str>,
        end_date: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let start = match start_date {
            Some(s) => parse_date(s)?,
            None => midnight(now - Duration::days(DEFAULT_LOOKBACK_DAYS)),
        };

        let end = match end_date {
            Some(s) => parse_date(s)?,
            // Through tomorrow, so activities from today are included.
            None => midnight(now + Duration::days(1)),
        };

        Ok(Self { start, end })
    }

    /// Epoch seconds for the API's `after` parameter.
    pub fn after_epoch(&self) -> i64 {
        self.start.timestamp()
    }

    /// Epoch seconds for the API's `before` parameter.
    pub fn before_epoch(&self) -> i64 {
        self.end.timestamp()
    }
}

fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|source| {
        SyncError::Parse {
            input: input.to_string(),
            source,
        }
    })?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn midnight(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 13, 42, 7).unwrap()
    }

    #[test]
    fn test_explicit_dates_parse_to_midnight() {
        let window =
            SyncWindow::resolve(Some("2024-01-10"), Some("2024-01-20"), fixed_now()).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap());
        assert!(window.start < window.end);
    }

    #[test]
    fn test_default_window_is_four_days() {
        let window = SyncWindow::resolve(None, None, fixed_now()).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap());
        assert_eq!(window.end - window.start, Duration::days(4));
    }

    #[test]
    fn test_default_start_explicit_end() {
        let window = SyncWindow::resolve(None, Some("2024-07-01"), fixed_now()).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_date_is_parse_error() {
        let err = SyncWindow::resolve(Some("06/15/2024"), None, fixed_now()).unwrap_err();

        match err {
            SyncError::Parse { input, .. } => assert_eq!(input, "06/15/2024"),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_epoch_bounds_match_window() {
        let window =
            SyncWindow::resolve(Some("2024-01-01"), Some("2024-01-02"), fixed_now()).unwrap();

        assert_eq!(window.after_epoch(), 1_704_067_200);
        assert_eq!(window.before_epoch(), 1_704_153_600);
    }
}
