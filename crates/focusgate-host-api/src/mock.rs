//! Mock rule engine for testing

use async_trait::async_trait;
use focusgate_api::{EnforcementSnapshot, ReconcileOp};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{EngineError, EngineResult, RuleEngine, apply_to_snapshot};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory rule engine for unit/integration testing
#[derive(Default)]
pub struct MockRuleEngine {
    state: Arc<Mutex<EnforcementSnapshot>>,
    applied: Arc<Mutex<Vec<ReconcileOp>>>,
    snapshot_reads: AtomicUsize,

    /// Configure snapshot reads to fail
    pub fail_snapshot: Arc<Mutex<bool>>,

    /// Accept this many more operations, then reject every one after
    pub fail_after: Arc<Mutex<Option<usize>>>,

    /// Delay applied to every operation (keeps a pass in flight)
    pub op_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-installed state
    pub fn with_snapshot(snapshot: EnforcementSnapshot) -> Self {
        let engine = Self::new();
        *lock(&engine.state) = snapshot;
        engine
    }

    /// Current installed state
    pub fn snapshot(&self) -> EnforcementSnapshot {
        lock(&self.state).clone()
    }

    /// Every operation accepted so far, in order
    pub fn applied_ops(&self) -> Vec<ReconcileOp> {
        lock(&self.applied).clone()
    }

    pub fn clear_applied_ops(&self) {
        lock(&self.applied).clear();
    }

    /// Number of times `get_installed_rules` was called
    pub fn snapshot_reads(&self) -> usize {
        self.snapshot_reads.load(Ordering::SeqCst)
    }

    pub fn set_fail_after(&self, ops: Option<usize>) {
        *lock(&self.fail_after) = ops;
    }

    pub fn set_op_delay(&self, delay: Option<Duration>) {
        *lock(&self.op_delay) = delay;
    }

    fn take_failure(&self) -> bool {
        let mut fail_after = lock(&self.fail_after);
        match fail_after.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}

#[async_trait]
impl RuleEngine for MockRuleEngine {
    async fn get_installed_rules(&self) -> EngineResult<EnforcementSnapshot> {
        self.snapshot_reads.fetch_add(1, Ordering::SeqCst);

        if *lock(&self.fail_snapshot) {
            return Err(EngineError::Unavailable("Mock snapshot failure".into()));
        }

        Ok(self.snapshot())
    }

    async fn apply_op(&self, op: &ReconcileOp) -> EngineResult<()> {
        let delay = *lock(&self.op_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_failure() {
            return Err(EngineError::Unavailable("Mock apply failure".into()));
        }

        apply_to_snapshot(&mut lock(&self.state), op)?;
        lock(&self.applied).push(op.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusgate_api::{ReconcilePlan, RuleDescriptor};
    use focusgate_util::RuleId;

    fn add(id: u32, filter: &str) -> ReconcileOp {
        ReconcileOp::AddRules {
            rules: vec![RuleDescriptor::redirect_main_frame(
                RuleId::new(id),
                filter,
                "/block.html",
            )],
        }
    }

    #[tokio::test]
    async fn test_mock_apply_plan() {
        let engine = MockRuleEngine::new();

        let mut plan = ReconcilePlan::new();
        plan.push(ReconcileOp::EnableBaseline);
        plan.push(add(1000, "*://*.a.com/*"));

        assert_eq!(engine.apply_plan(&plan).await.unwrap(), 2);

        let snapshot = engine.get_installed_rules().await.unwrap();
        assert!(snapshot.baseline_enabled);
        assert_eq!(snapshot.rules.len(), 1);
        assert_eq!(engine.applied_ops().len(), 2);
        assert_eq!(engine.snapshot_reads(), 1);
    }

    #[tokio::test]
    async fn test_mock_plan_aborts_on_duplicate() {
        let engine = MockRuleEngine::new();

        let mut plan = ReconcilePlan::new();
        plan.push(add(1000, "*://*.a.com/*"));
        plan.push(add(1000, "*://*.b.com/*"));
        plan.push(ReconcileOp::EnableBaseline);

        let err = engine.apply_plan(&plan).await.unwrap_err();
        assert_eq!(err.applied, 1);
        assert_eq!(err.total, 3);
        assert!(matches!(err.source, EngineError::DuplicateRuleId(_)));

        // Nothing after the rejected op ran
        assert!(!engine.snapshot().baseline_enabled);
    }

    #[tokio::test]
    async fn test_mock_fail_after() {
        let engine = MockRuleEngine::new();
        engine.set_fail_after(Some(1));

        engine.apply_op(&ReconcileOp::EnableBaseline).await.unwrap();
        assert!(engine.apply_op(&ReconcileOp::DisableBaseline).await.is_err());
        assert!(engine.snapshot().baseline_enabled);

        engine.set_fail_after(None);
        engine.apply_op(&ReconcileOp::DisableBaseline).await.unwrap();
        assert!(!engine.snapshot().baseline_enabled);
    }

    #[tokio::test]
    async fn test_mock_snapshot_failure() {
        let engine = MockRuleEngine::new();
        *engine.fail_snapshot.lock().unwrap() = true;
        assert!(engine.get_installed_rules().await.is_err());
    }

    #[test]
    fn test_applied_ops_serialize() {
        let engine = MockRuleEngine::with_snapshot(EnforcementSnapshot {
            baseline_enabled: true,
            rules: Vec::new(),
        });
        assert!(engine.snapshot().baseline_enabled);

        let json = serde_json::to_value(ReconcileOp::DisableBaseline).unwrap();
        assert_eq!(json["op"], "disable_baseline");
    }
}
