//! Validated weekly schedule

use chrono::{DateTime, Datelike, Local, Weekday};
use focusgate_api::{RawDayWindow, RawSchedule};
use focusgate_util::{ScheduleFormatError, TimeOfDay, parse_weekday, weekday_key};
use tracing::debug;

/// One day's blocking window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub enabled: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DayWindow {
    pub fn new(enabled: bool, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { enabled, start, end }
    }

    /// Whether the window wraps past midnight (e.g. 22:00 - 06:00)
    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Check if `time` falls inside this window. Both ends are inclusive.
    ///
    /// A window with `start > end` wraps: it covers `start..=23:59` and
    /// `00:00..=end` of the same day.
    pub fn contains(&self, time: TimeOfDay) -> bool {
        if !self.enabled {
            return false;
        }

        if self.crosses_midnight() {
            time >= self.start || time <= self.end
        } else {
            time >= self.start && time <= self.end
        }
    }
}

/// Blocking windows for each day of the week
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    /// Indexed by days from Sunday
    days: [Option<DayWindow>; 7],
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, weekday: Weekday, window: DayWindow) -> Self {
        self.set_day(weekday, Some(window));
        self
    }

    pub fn set_day(&mut self, weekday: Weekday, window: Option<DayWindow>) {
        self.days[weekday.num_days_from_sunday() as usize] = window;
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayWindow> {
        self.days[weekday.num_days_from_sunday() as usize].as_ref()
    }

    /// Window that applies to the given local datetime's day
    pub fn window_for(&self, dt: &DateTime<Local>) -> Option<&DayWindow> {
        self.day(dt.weekday())
    }

    /// Number of days with an enabled window
    pub fn enabled_days(&self) -> usize {
        self.days.iter().flatten().filter(|w| w.enabled).count()
    }

    /// Convert the stored schedule, validating enabled days.
    ///
    /// Enabled days must carry well-formed `HH:MM` times. A disabled day
    /// whose times do not parse is kept as absent, since the settings form
    /// may save blank inputs for days it never blocks. Unknown day keys are
    /// ignored.
    pub fn from_raw(raw: &RawSchedule) -> Result<Self, ScheduleFormatError> {
        let mut schedule = Self::new();

        for (key, window) in &raw.days {
            let Some(weekday) = parse_weekday(key) else {
                debug!(day = %key, "Ignoring unknown schedule day");
                continue;
            };

            match convert_day(window) {
                Ok(day) => schedule.set_day(weekday, Some(day)),
                Err(e) if !window.enabled => {
                    debug!(day = %key, error = %e, "Ignoring malformed disabled day");
                    schedule.set_day(weekday, None);
                }
                Err(e) => return Err(e.on_day(weekday_key(weekday))),
            }
        }

        Ok(schedule)
    }

    /// Convert back into the stored shape
    pub fn to_raw(&self) -> RawSchedule {
        let mut raw = RawSchedule::new();
        for weekday in ALL_WEEKDAYS {
            if let Some(w) = self.day(weekday) {
                raw.set_day(
                    weekday_key(weekday),
                    RawDayWindow::new(w.enabled, w.start.to_string(), w.end.to_string()),
                );
            }
        }
        raw
    }
}

/// Sunday-first ordering, matching the schedule index
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

fn convert_day(raw: &RawDayWindow) -> Result<DayWindow, ScheduleFormatError> {
    Ok(DayWindow {
        enabled: raw.enabled,
        start: TimeOfDay::parse(&raw.start)?,
        end: TimeOfDay::parse(&raw.end)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = DayWindow::new(true, t("09:00"), t("17:00"));
        assert!(!w.contains(TimeOfDay::from_minutes(539).unwrap()));
        assert!(w.contains(TimeOfDay::from_minutes(540).unwrap()));
        assert!(w.contains(TimeOfDay::from_minutes(1020).unwrap()));
        assert!(!w.contains(TimeOfDay::from_minutes(1021).unwrap()));
    }

    #[test]
    fn disabled_window_never_contains() {
        let w = DayWindow::new(false, t("00:00"), t("23:59"));
        assert!(!w.contains(t("12:00")));
    }

    #[test]
    fn midnight_crossing_window_wraps() {
        let w = DayWindow::new(true, t("22:00"), t("06:00"));
        assert!(w.crosses_midnight());
        assert!(w.contains(t("22:00")));
        assert!(w.contains(t("23:59")));
        assert!(w.contains(t("00:00")));
        assert!(w.contains(t("06:00")));
        assert!(!w.contains(t("06:01")));
        assert!(!w.contains(t("21:59")));
        assert!(!w.contains(t("12:00")));
    }

    #[test]
    fn single_minute_window() {
        let w = DayWindow::new(true, t("12:00"), t("12:00"));
        assert!(w.contains(t("12:00")));
        assert!(!w.contains(t("12:01")));
    }

    #[test]
    fn from_raw_converts_known_days() {
        let raw = RawSchedule::new()
            .with_day("monday", RawDayWindow::new(true, "09:00", "17:00"))
            .with_day("Fri", RawDayWindow::new(false, "10:00", "11:00"))
            .with_day("holiday", RawDayWindow::new(true, "nonsense", "x"));

        let schedule = WeeklySchedule::from_raw(&raw).unwrap();
        assert_eq!(
            schedule.day(Weekday::Mon),
            Some(&DayWindow::new(true, t("09:00"), t("17:00")))
        );
        assert!(!schedule.day(Weekday::Fri).unwrap().enabled);
        assert!(schedule.day(Weekday::Tue).is_none());
        assert_eq!(schedule.enabled_days(), 1);
    }

    #[test]
    fn from_raw_rejects_malformed_enabled_day() {
        let raw = RawSchedule::new()
            .with_day("tuesday", RawDayWindow::new(true, "9am", "17:00"));

        let err = WeeklySchedule::from_raw(&raw).unwrap_err();
        assert_eq!(err.value, "9am");
        assert_eq!(err.day.as_deref(), Some("tuesday"));
    }

    #[test]
    fn from_raw_tolerates_blank_disabled_day() {
        let raw = RawSchedule::new()
            .with_day("sunday", RawDayWindow::new(false, "", ""));

        let schedule = WeeklySchedule::from_raw(&raw).unwrap();
        assert!(schedule.day(Weekday::Sun).is_none());
    }

    #[test]
    fn to_raw_uses_day_keys() {
        let schedule = WeeklySchedule::new()
            .with_day(Weekday::Wed, DayWindow::new(true, t("08:30"), t("12:00")));

        let raw = schedule.to_raw();
        assert_eq!(raw.get("wednesday"), Some(&RawDayWindow::new(true, "08:30", "12:00")));
        assert_eq!(WeeklySchedule::from_raw(&raw).unwrap(), schedule);
    }
}
