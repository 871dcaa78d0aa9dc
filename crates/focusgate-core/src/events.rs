//! Core events emitted by the coordinator

use focusgate_api::TriggerReasons;

/// Events emitted after reconciliation passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A pass reached the rule engine. `complete` is false when the engine
    /// rejected an operation part way through the plan.
    PolicyApplied {
        reasons: TriggerReasons,
        should_block: bool,
        active_domain_count: usize,
        ops_applied: usize,
        complete: bool,
    },

    /// A pass could not read the installed rules and changed nothing
    PassFailed {
        reasons: TriggerReasons,
        error: String,
    },
}
