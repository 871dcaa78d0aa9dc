//! Stored weekly schedule shape
//!
//! This is the schedule exactly as the settings layer saves it: one entry
//! per day name with `HH:MM` strings. Times are validated when the core
//! converts it into a `WeeklySchedule` (see `focusgate-config`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's blocking window as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDayWindow {
    #[serde(default)]
    pub enabled: bool,

    /// Start time (HH:MM format)
    pub start: String,

    /// End time (HH:MM format)
    pub end: String,
}

impl RawDayWindow {
    pub fn new(enabled: bool, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            enabled,
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Weekly schedule keyed by lower-case day name ("monday", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSchedule {
    pub days: BTreeMap<String, RawDayWindow>,
}

impl RawSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: impl Into<String>, window: RawDayWindow) -> Self {
        self.days.insert(day.into(), window);
        self
    }

    pub fn set_day(&mut self, day: impl Into<String>, window: RawDayWindow) {
        self.days.insert(day.into(), window);
    }

    pub fn get(&self, day: &str) -> Option<&RawDayWindow> {
        self.days.get(day)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
