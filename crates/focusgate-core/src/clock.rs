//! Wall-clock source for reconciliation passes

use chrono::{DateTime, Duration, Local};
use std::sync::{Mutex, PoisonError};

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// System clock, honouring the mock-time override in debug builds
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        focusgate_util::now()
    }
}

/// Clock pinned to a settable instant (for testing)
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_fixed_clock() {
        let start = Local.with_ymd_and_hms(2025, 12, 29, 8, 59, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(1));
        assert_eq!(clock.now().hour(), 9);
        assert_eq!(clock.now().minute(), 0);
    }
}
