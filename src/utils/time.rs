//! Time utilities: parsing HH:MM:SS, civil clock in the deployment timezone.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

pub const TIME_FMT: &str = "%H:%M:%S";
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `HH:MM:SS`, also accepting `HH:MM` (seconds = 0).
pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(t.trim(), "%H:%M"))
        .ok()
}

pub fn parse_datetime(s: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATETIME_FMT)
        .map_err(|_| AppError::InvalidTime(s.to_string()))
}

pub fn format_time(t: NaiveTime) -> String {
    t.format(TIME_FMT).to_string()
}

/// Wall-clock date and time in the civil timezone `tz`.
pub fn civil_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

/// RFC 3339 timestamp in the civil timezone `tz`.
pub fn civil_timestamp(tz: Tz) -> String {
    Utc::now().with_timezone(&tz).to_rfc3339()
}

/// Re-render a stored RFC 3339 timestamp in `tz` for display.
pub fn display_timestamp(raw: &str, tz: Tz) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&tz).format(DATETIME_FMT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seconds_and_short_form() {
        assert_eq!(parse_time("09:00:01"), NaiveTime::from_hms_opt(9, 0, 1));
        assert_eq!(parse_time("18:00"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_time("25:00"), None);
    }

    #[test]
    fn display_converts_to_civil_zone() {
        let shown = display_timestamp("2025-03-01T04:00:00+00:00", chrono_tz::Asia::Karachi);
        assert_eq!(shown, "2025-03-01 09:00:00");
    }
}
