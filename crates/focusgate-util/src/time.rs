//! Time utilities for focusgate
//!
//! Schedules have minute resolution, so everything here works on
//! wall-clock minutes since local midnight.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `FOCUSGATE_MOCK_TIME` environment variable can be set
//! to override the system time used when evaluating the schedule.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-29 10:00:00`)
//!
//! Example:
//! ```bash
//! FOCUSGATE_MOCK_TIME="2025-12-29 10:00:00" focusgated
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::ScheduleFormatError;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FOCUSGATE_MOCK_TIME";

/// Format accepted by `FOCUSGATE_MOCK_TIME`
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset between mock time and real time, computed once at first use.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive_dt) = NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT)
            else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    expected_format = MOCK_TIME_FORMAT,
                    "Invalid mock time format"
                );
                return None;
            };
            let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    "Failed to convert mock time to local timezone"
                );
                return None;
            };
            let offset = mock_dt.signed_duration_since(chrono::Local::now());
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Format a DateTime with full date and time, as used in logs and status output.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format(MOCK_TIME_FORMAT).to_string()
}

/// Lower-case English day name, as used for schedule keys
pub fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "sunday",
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
    }
}

/// Parse a day name (full or three-letter, any case)
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "sun" | "sunday" => Some(Weekday::Sun),
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Wall-clock time of day with minute resolution (0..=1439)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(24 * 60 - 1);

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour as u16 * 60 + minute as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < 24 * 60).then_some(Self(minutes))
    }

    /// Time of day of the given local datetime, seconds truncated
    pub fn of(dt: &DateTime<Local>) -> Self {
        Self((dt.hour() * 60 + dt.minute()) as u16)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Parse HH:MM time format
    pub fn parse(s: &str) -> Result<Self, ScheduleFormatError> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| ScheduleFormatError::new(s, "Expected HH:MM format"))?;

        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(ScheduleFormatError::new(s, "Expected HH:MM format"));
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ScheduleFormatError::new(s, "Expected digits in HH:MM"));
        }

        let hour: u8 = hour
            .parse()
            .map_err(|_| ScheduleFormatError::new(s, "Invalid hour"))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| ScheduleFormatError::new(s, "Invalid minute"))?;

        if hour >= 24 {
            return Err(ScheduleFormatError::new(s, "Hour must be 0-23"));
        }
        if minute >= 60 {
            return Err(ScheduleFormatError::new(s, "Minute must be 0-59"));
        }

        Ok(Self(hour as u16 * 60 + minute as u16))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleFormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(TimeOfDay::parse("14:30").unwrap().minutes(), 870);
        assert_eq!(TimeOfDay::parse("00:00").unwrap(), TimeOfDay::MIDNIGHT);
        assert_eq!(TimeOfDay::parse("23:59").unwrap(), TimeOfDay::LAST_MINUTE);
        assert_eq!(TimeOfDay::parse("9:05").unwrap().minutes(), 545);

        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("invalid").is_err());
        assert!(TimeOfDay::parse("").is_err());
        assert!(TimeOfDay::parse("12:5").is_err());
        assert!(TimeOfDay::parse("ab:cd").is_err());
        assert!(TimeOfDay::parse("-1:00").is_err());

        // Signs and padding are not digits
        assert!(TimeOfDay::parse("+9:00").is_err());
        assert!(TimeOfDay::parse("09:+5").is_err());
        assert!(TimeOfDay::parse("+1:+0").is_err());
        assert!(TimeOfDay::parse(" 9:00").is_err());
    }

    #[test]
    fn test_time_of_day_display() {
        let t = TimeOfDay::new(9, 5).unwrap();
        assert_eq!(t.to_string(), "09:05");
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 5);
    }

    #[test]
    fn test_time_of_day_serde_uses_clock_string() {
        let t = TimeOfDay::new(17, 0).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"17:00\"");

        let parsed: TimeOfDay = serde_json::from_str("\"08:15\"").unwrap();
        assert_eq!(parsed.minutes(), 495);

        assert!(serde_json::from_str::<TimeOfDay>("\"8h15\"").is_err());
    }

    #[test]
    fn test_time_of_day_of_datetime_truncates_seconds() {
        let dt = Local.with_ymd_and_hms(2025, 12, 29, 10, 30, 59).unwrap();
        assert_eq!(TimeOfDay::of(&dt), TimeOfDay::new(10, 30).unwrap());
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_key(Weekday::Sun), "sunday");
        assert_eq!(parse_weekday("Mon"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("saturday"), Some(Weekday::Sat));
        assert_eq!(parse_weekday("funday"), None);
    }

    #[test]
    fn test_format_datetime_full() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_datetime_full(&dt), "2025-12-25 14:30:45");
    }

    #[test]
    fn test_parse_mock_time_invalid_formats() {
        let invalid_formats = [
            "2025-12-25",
            "14:30:00",
            "2025/12/25 14:30:00",
            "2025-12-25T14:30:00",
            "",
        ];

        for format_str in &invalid_formats {
            let result = NaiveDateTime::parse_from_str(format_str, MOCK_TIME_FORMAT);
            assert!(result.is_err(), "Expected '{}' to fail parsing", format_str);
        }
    }

    #[test]
    fn test_now_returns_time() {
        use chrono::Datelike;

        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }
}
