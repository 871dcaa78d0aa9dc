//! Configuration validation

use crate::schema::RawConfig;
use focusgate_api::{MAX_BASELINE_DOMAINS, RawSchedule, is_valid_host, normalize_domain};
use focusgate_util::{ScheduleFormatError, TimeOfDay, parse_weekday};
use std::collections::HashSet;
use thiserror::Error;

/// Tick interval bounds. Schedules have minute resolution, so the tick must
/// not be slower than one minute.
pub const MIN_TICK_SECONDS: u64 = 1;
pub const MAX_TICK_SECONDS: u64 = 60;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    InvalidTimeFormat(#[from] ScheduleFormatError),

    #[error("Unknown schedule day: {0}")]
    UnknownDay(String),

    #[error("tick_seconds must be {MIN_TICK_SECONDS}-{MAX_TICK_SECONDS}, got {0}")]
    InvalidTickInterval(u64),

    #[error("block_page cannot be empty")]
    EmptyBlockPage,

    #[error("Baseline domain #{index} is empty")]
    EmptyBaselineDomain { index: usize },

    #[error("Baseline domain #{index} is not a valid host: {domain}")]
    InvalidBaselineDomain { index: usize, domain: String },

    #[error("Duplicate baseline domain: {0}")]
    DuplicateBaselineDomain(String),

    #[error("Too many baseline domains: {count} (max {max})")]
    TooManyBaselineDomains { count: usize, max: usize },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(secs) = config.daemon.tick_seconds
        && !(MIN_TICK_SECONDS..=MAX_TICK_SECONDS).contains(&secs)
    {
        errors.push(ValidationError::InvalidTickInterval(secs));
    }

    if let Some(page) = &config.daemon.block_page
        && page.trim().is_empty()
    {
        errors.push(ValidationError::EmptyBlockPage);
    }

    errors.extend(validate_baseline(&config.baseline.domains));

    if let Some(schedule) = &config.schedule {
        errors.extend(validate_schedule(schedule));
    }

    errors
}

fn validate_baseline(domains: &[String]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if domains.len() > MAX_BASELINE_DOMAINS {
        errors.push(ValidationError::TooManyBaselineDomains {
            count: domains.len(),
            max: MAX_BASELINE_DOMAINS,
        });
    }

    let mut seen = HashSet::new();
    for (index, domain) in domains.iter().enumerate() {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            errors.push(ValidationError::EmptyBaselineDomain { index });
        } else if !is_valid_host(&normalized) {
            errors.push(ValidationError::InvalidBaselineDomain {
                index,
                domain: normalized,
            });
        } else if !seen.insert(normalized.clone()) {
            errors.push(ValidationError::DuplicateBaselineDomain(normalized));
        }
    }

    errors
}

/// Validate a stored or configured weekly schedule.
///
/// Stricter than `WeeklySchedule::from_raw`: every day key must be known and
/// every time must parse, enabled or not. Used before saving.
pub fn validate_schedule(schedule: &RawSchedule) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (day, window) in &schedule.days {
        if parse_weekday(day).is_none() {
            errors.push(ValidationError::UnknownDay(day.clone()));
            continue;
        }

        for value in [&window.start, &window.end] {
            if let Err(e) = TimeOfDay::parse(value) {
                errors.push(ValidationError::InvalidTimeFormat(e.on_day(day.clone())));
            }
        }
    }

    errors
}
