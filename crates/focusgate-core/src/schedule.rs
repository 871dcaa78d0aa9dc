//! Schedule evaluation

use chrono::{DateTime, Local};
use focusgate_api::RawSchedule;
use focusgate_config::WeeklySchedule;
use focusgate_util::{ScheduleFormatError, TimeOfDay};

/// Whether blocking should be active at `now`.
///
/// No schedule, no window for today, or a disabled window all mean "not
/// blocking". Windows are inclusive on both ends; see [`DayWindow::contains`]
/// for windows that cross midnight.
///
/// [`DayWindow::contains`]: focusgate_config::DayWindow::contains
pub fn evaluate(schedule: Option<&WeeklySchedule>, now: &DateTime<Local>) -> bool {
    schedule
        .and_then(|s| s.window_for(now))
        .is_some_and(|window| window.contains(TimeOfDay::of(now)))
}

/// Parse a stored schedule and evaluate it.
///
/// A malformed time on an enabled day is an error, never silently coerced.
pub fn evaluate_raw(
    raw: Option<&RawSchedule>,
    now: &DateTime<Local>,
) -> Result<bool, ScheduleFormatError> {
    let schedule = raw.map(WeeklySchedule::from_raw).transpose()?;
    Ok(evaluate(schedule.as_ref(), now))
}
