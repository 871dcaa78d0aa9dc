//! Error types shared across focusgate crates

use thiserror::Error;

/// A clock time that is not a well-formed `HH:MM` value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid time '{value}'{}: {message}", day_suffix(.day))]
pub struct ScheduleFormatError {
    pub value: String,
    pub message: String,
    /// Day whose window carried the bad value, when known
    pub day: Option<String>,
}

impl ScheduleFormatError {
    pub fn new(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            message: message.into(),
            day: None,
        }
    }

    pub fn on_day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }
}

fn day_suffix(day: &Option<String>) -> String {
    match day {
        Some(day) => format!(" on {}", day),
        None => String::new(),
    }
}
