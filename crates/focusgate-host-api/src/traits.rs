//! Rule engine traits

use async_trait::async_trait;
use focusgate_api::{EnforcementSnapshot, ReconcileOp, ReconcilePlan};
use focusgate_util::RuleId;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from rule engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Duplicate rule id {0}")]
    DuplicateRuleId(RuleId),

    #[error("Malformed pattern for rule {id}: '{pattern}'")]
    MalformedPattern { id: RuleId, pattern: String },

    #[error("Rule engine unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A plan stopped at its first rejected operation. Operations before it
/// stay applied; nothing is rolled back.
#[derive(Debug, Error)]
#[error("Plan aborted after {applied} of {total} op(s): {source}")]
pub struct PlanAborted {
    pub applied: usize,
    pub total: usize,
    #[source]
    pub source: EngineError,
}

/// Declarative redirect rule engine - implemented by enforcement backends
#[async_trait]
pub trait RuleEngine: Send + Sync {
    /// Read the currently installed rules and baseline state
    async fn get_installed_rules(&self) -> EngineResult<EnforcementSnapshot>;

    /// Apply a single primitive operation
    async fn apply_op(&self, op: &ReconcileOp) -> EngineResult<()>;

    /// Apply a plan in order, stopping at the first rejected operation.
    ///
    /// Returns the number of operations applied.
    async fn apply_plan(&self, plan: &ReconcilePlan) -> Result<usize, PlanAborted> {
        let total = plan.len();

        for (applied, op) in plan.iter().enumerate() {
            if let Err(source) = self.apply_op(op).await {
                warn!(op = %op, applied, total, error = %source, "Rule engine rejected operation");
                return Err(PlanAborted {
                    applied,
                    total,
                    source,
                });
            }
            debug!(op = %op, "Applied");
        }

        Ok(total)
    }

    /// Optional: check if the engine is reachable
    fn is_healthy(&self) -> bool {
        true
    }
}
