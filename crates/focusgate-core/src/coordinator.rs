//! Single-flight trigger coordinator
//!
//! Every mutation of the rule engine goes through one worker task. Triggers
//! arriving while a pass is in flight are merged into a single pending
//! reason set, so at most one follow-up pass is queued however many
//! triggers arrive.

use focusgate_api::{DesiredState, DomainList, ReconcilePlan, TriggerReasons};
use focusgate_config::WeeklySchedule;
use focusgate_host_api::{EngineError, RuleEngine};
use focusgate_store::{ConfigStore, StoreError};
use focusgate_util::ScheduleFormatError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{Clock, CoreEvent, Notifier, compile, evaluate, reconcile};

/// Reasons a pass could not be computed or applied as intended
#[derive(Debug, Error)]
pub enum PassError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Schedule(#[from] ScheduleFormatError),

    #[error("Rule engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone)]
pub struct PassReport {
    pub reasons: TriggerReasons,
    pub should_block: bool,
    pub active_domain_count: usize,
    pub plan: ReconcilePlan,
    pub ops_applied: usize,
    pub complete: bool,
}

impl PassReport {
    fn event(&self) -> CoreEvent {
        CoreEvent::PolicyApplied {
            reasons: self.reasons,
            should_block: self.should_block,
            active_domain_count: self.active_domain_count,
            ops_applied: self.ops_applied,
            complete: self.complete,
        }
    }
}

/// Drives evaluate -> compile -> reconcile -> apply passes
pub struct Coordinator {
    clock: Arc<dyn Clock>,
    store: Arc<dyn ConfigStore>,
    engine: Arc<dyn RuleEngine>,
    notifier: Arc<dyn Notifier>,
    block_page: String,
    /// Held for the whole pass; the list is refreshed from the store each time
    domains: tokio::sync::Mutex<DomainList>,
}

impl Coordinator {
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<dyn ConfigStore>,
        engine: Arc<dyn RuleEngine>,
        notifier: Arc<dyn Notifier>,
        block_page: impl Into<String>,
    ) -> Self {
        Self {
            clock,
            store,
            engine,
            notifier,
            block_page: block_page.into(),
            domains: tokio::sync::Mutex::new(DomainList::default()),
        }
    }

    /// Run one full pass. Concurrent callers are serialized.
    ///
    /// Storage and schedule failures degrade to "not blocking". Only a
    /// failure to read the installed rules fails the pass, since nothing
    /// can be diffed without them.
    pub async fn run_pass(&self, reasons: TriggerReasons) -> Result<PassReport, PassError> {
        let mut domains = self.domains.lock().await;
        let now = self.clock.now();

        let desired = match self.load_inputs().await {
            Ok((schedule, list)) => {
                *domains = list;
                if evaluate(schedule.as_ref(), &now) {
                    DesiredState::blocking(compile(&domains, &self.block_page))
                } else {
                    DesiredState::unblocked()
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    reasons = %reasons,
                    "Cannot load policy inputs, blocking disabled for this pass"
                );
                DesiredState::unblocked()
            }
        };
        // Two rules per enforced domain
        let active_domain_count = desired.custom_rules.len() / 2;

        let snapshot = match self.engine.get_installed_rules().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, reasons = %reasons, "Cannot read installed rules, pass skipped");
                self.notifier.notify(CoreEvent::PassFailed {
                    reasons,
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let plan = reconcile(&desired, &snapshot);
        for op in &plan {
            debug!(op = %op, "Planned");
        }

        let (ops_applied, complete) = match self.engine.apply_plan(&plan).await {
            Ok(applied) => (applied, true),
            Err(aborted) => {
                warn!(
                    applied = aborted.applied,
                    total = aborted.total,
                    error = %aborted.source,
                    "Plan partially applied, next pass will retry"
                );
                (aborted.applied, false)
            }
        };

        let report = PassReport {
            reasons,
            should_block: desired.should_block,
            active_domain_count,
            plan,
            ops_applied,
            complete,
        };

        info!(
            reasons = %reasons,
            should_block = report.should_block,
            domains = report.active_domain_count,
            ops = report.plan.len(),
            ops_applied,
            complete,
            "Policy applied"
        );
        self.notifier.notify(report.event());

        Ok(report)
    }

    async fn load_inputs(&self) -> Result<(Option<WeeklySchedule>, DomainList), PassError> {
        let raw = self.store.get_schedule().await?;
        let schedule = raw.as_ref().map(WeeklySchedule::from_raw).transpose()?;
        let domains = self.store.get_domain_list().await?;
        Ok((schedule, domains))
    }

    /// Start the worker. A startup pass runs before anything else.
    pub fn spawn(self) -> (CoordinatorHandle, JoinHandle<()>) {
        let handle = CoordinatorHandle {
            shared: Arc::new(Shared {
                pending: Mutex::new(TriggerReasons::STARTUP),
                wake: Notify::new(),
                shutdown: AtomicBool::new(false),
            }),
        };

        let shared = handle.shared.clone();
        let task = tokio::spawn(async move { self.run(shared).await });

        (handle, task)
    }

    async fn run(self, shared: Arc<Shared>) {
        loop {
            if shared.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let reasons = shared.take_pending();
            if reasons.is_empty() {
                shared.wake.notified().await;
                continue;
            }

            // Errors are logged and notified inside the pass
            let _ = self.run_pass(reasons).await;
        }

        debug!("Coordinator stopped");
    }
}

struct Shared {
    pending: Mutex<TriggerReasons>,
    wake: Notify,
    shutdown: AtomicBool,
}

impl Shared {
    fn take_pending(&self) -> TriggerReasons {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Cloneable handle for requesting passes
#[derive(Clone)]
pub struct CoordinatorHandle {
    shared: Arc<Shared>,
}

impl CoordinatorHandle {
    /// Request a pass. Never blocks; merges with any pass already pending.
    pub fn trigger(&self, reason: impl Into<TriggerReasons>) {
        let reason = reason.into();
        {
            let mut pending = self
                .shared
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *pending |= reason;
        }
        debug!(reason = %reason, "Pass requested");
        self.shared.wake.notify_one();
    }

    /// Stop the worker after any in-flight pass. Pending triggers are dropped.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
    }
}
