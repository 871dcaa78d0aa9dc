//! Reasons a reconciliation pass is requested

use bitflags::bitflags;
use std::fmt;

/// A single event asking for a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerReason {
    /// Service start, always runs before the first tick
    Startup,
    /// Periodic clock tick
    TimerTick,
    /// The weekly schedule was saved
    ScheduleChanged,
    /// The custom domain list was mutated
    CustomListChanged,
    /// A page navigation was observed by an embedder
    NavigationEvent,
}

bitflags! {
    /// Set of trigger reasons coalesced into one pending pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TriggerReasons: u8 {
        const STARTUP = 1 << 0;
        const TIMER_TICK = 1 << 1;
        const SCHEDULE_CHANGED = 1 << 2;
        const CUSTOM_LIST_CHANGED = 1 << 3;
        const NAVIGATION = 1 << 4;

        const CONFIG_CHANGED = Self::SCHEDULE_CHANGED.bits() | Self::CUSTOM_LIST_CHANGED.bits();
    }
}

impl From<TriggerReason> for TriggerReasons {
    fn from(reason: TriggerReason) -> Self {
        match reason {
            TriggerReason::Startup => TriggerReasons::STARTUP,
            TriggerReason::TimerTick => TriggerReasons::TIMER_TICK,
            TriggerReason::ScheduleChanged => TriggerReasons::SCHEDULE_CHANGED,
            TriggerReason::CustomListChanged => TriggerReasons::CUSTOM_LIST_CHANGED,
            TriggerReason::NavigationEvent => TriggerReasons::NAVIGATION,
        }
    }
}

impl fmt::Display for TriggerReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{}", names.join("|").to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_accumulate() {
        let mut pending = TriggerReasons::empty();
        pending |= TriggerReason::TimerTick.into();
        pending |= TriggerReason::TimerTick.into();
        pending |= TriggerReason::CustomListChanged.into();

        assert!(pending.contains(TriggerReasons::TIMER_TICK));
        assert!(pending.intersects(TriggerReasons::CONFIG_CHANGED));
        assert!(!pending.contains(TriggerReasons::STARTUP));
    }

    #[test]
    fn reasons_display() {
        assert_eq!(TriggerReasons::empty().to_string(), "none");
        assert_eq!(TriggerReasons::TIMER_TICK.to_string(), "timer_tick");
    }
}
