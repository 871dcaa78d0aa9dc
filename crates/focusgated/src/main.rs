//! focusgated - The focusgate background service
//!
//! This is the main entry point for the focusgated service.
//! It wires together all the components:
//! - Configuration loading
//! - Store initialization and schedule seeding
//! - File-backed rule engine with the baseline ruleset
//! - Trigger coordinator (startup pass, periodic tick, SIGHUP on config change)
//! - Audit of applied policy

use anyhow::{Context, Result};
use clap::Parser;
use focusgate_api::{TriggerReason, TriggerReasons};
use focusgate_config::{Settings, load_config_or_default};
use focusgate_core::{
    BroadcastNotifier, Coordinator, CoordinatorHandle, CoreEvent, SystemClock, compile_baseline,
};
use focusgate_host_api::RuleEngine;
use focusgate_host_file::{BaselineRuleset, FileRuleEngine};
use focusgate_store::{AuditEvent, AuditEventType, AuditLog, ConfigStore, SqliteStore};
use focusgate_util::{
    FOCUSGATE_DATA_DIR_ENV, PidFile, default_config_path, default_rules_path, pid_file_path,
    store_path,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// focusgated - Time-windowed domain blocking service
#[derive(Parser, Debug)]
#[command(name = "focusgated")]
#[command(about = "Time-windowed domain blocking service", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/focusgate/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set FOCUSGATE_DATA_DIR env var)
    #[arg(short, long, env = FOCUSGATE_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Process signals the service reacts to
struct Signals {
    terminate: Signal,
    interrupt: Signal,
    hangup: Signal,
}

impl Signals {
    /// Must run before the pid file is published: SIGHUP terminates a
    /// process that has no handler for it.
    fn install() -> Result<Self> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())
                .context("Failed to create SIGTERM handler")?,
            interrupt: signal(SignalKind::interrupt())
                .context("Failed to create SIGINT handler")?,
            hangup: signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?,
        })
    }
}

/// Main service state
struct Service {
    settings: Settings,
    store: Arc<SqliteStore>,
    engine: Arc<FileRuleEngine>,
    pid_file: PidFile,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let mut settings = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        if let Some(data_dir) = &args.data_dir {
            settings.daemon.rules_path = default_rules_path(data_dir);
            settings.daemon.data_dir = data_dir.clone();
        }

        info!(
            config_path = %args.config.display(),
            baseline_domains = settings.baseline.domains.len(),
            tick_seconds = settings.daemon.tick_interval.as_secs(),
            "Configuration loaded"
        );

        let data_dir = settings.daemon.data_dir.clone();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        // One daemon per data directory
        let pid_path = pid_file_path(&data_dir);
        let pid_file = PidFile::acquire(&pid_path)
            .with_context(|| format!("Failed to lock pid file {:?}", pid_path))?;

        // Initialize store
        let db_path = store_path(&data_dir);
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );
        info!(db_path = %db_path.display(), "Store initialized");

        store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

        // Seed the schedule on first start
        if let Some(seed) = &settings.seed_schedule
            && store.get_schedule().await?.is_none()
        {
            store.set_schedule(seed).await?;
            info!(days = seed.days.len(), "Seeded schedule from configuration");
        }

        // Initialize rule engine with the compiled baseline
        let baseline = BaselineRuleset {
            id: settings.baseline.ruleset_id.clone(),
            rules: compile_baseline(&settings.baseline.domains, &settings.daemon.block_page),
        };
        let engine = Arc::new(FileRuleEngine::new(
            settings.daemon.rules_path.clone(),
            baseline,
        ));
        engine
            .init()
            .await
            .with_context(|| format!("Failed to prepare rules file {:?}", engine.path()))?;

        if !engine.is_healthy() {
            warn!(path = %engine.path().display(), "Rule engine reports unhealthy");
        }

        Ok(Self {
            settings,
            store,
            engine,
            pid_file,
        })
    }

    async fn run(self, signals: Signals) -> Result<()> {
        let notifier = Arc::new(BroadcastNotifier::default());
        let mut events = notifier.subscribe();

        let coordinator = Coordinator::new(
            Arc::new(SystemClock),
            self.store.clone(),
            self.engine.clone(),
            notifier,
            self.settings.daemon.block_page.clone(),
        );
        let (coordinator, worker) = coordinator.spawn();

        let Signals {
            terminate: mut sigterm,
            interrupt: mut sigint,
            hangup: mut sighup,
        } = signals;

        // The startup pass covers "now"; the first tick comes one period later
        let tick_interval = self.settings.daemon.tick_interval;
        let mut tick_timer = tokio::time::interval_at(Instant::now() + tick_interval, tick_interval);
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                // Signal: SIGHUP - schedule or site list changed (sent by focusgatectl)
                _ = sighup.recv() => {
                    info!("Received SIGHUP, reloading schedule and sites");
                    coordinator.trigger(TriggerReasons::CONFIG_CHANGED);
                }

                _ = tick_timer.tick() => {
                    coordinator.trigger(TriggerReason::TimerTick);
                }

                event = events.recv() => {
                    match event {
                        Ok(event) => self.handle_core_event(event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Dropped policy events");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("Coordinator stopped unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown(coordinator, worker).await;
        Ok(())
    }

    fn handle_core_event(&self, event: CoreEvent) {
        match event {
            CoreEvent::PolicyApplied {
                reasons,
                should_block,
                active_domain_count,
                ops_applied,
                complete,
            } => {
                debug!(reasons = %reasons, "Recording applied policy");
                if let Err(e) = self.store.append_audit(AuditEvent::new(
                    AuditEventType::PolicyApplied {
                        should_block,
                        active_domain_count,
                        ops_applied,
                        complete,
                    },
                )) {
                    warn!(error = %e, "Failed to record applied policy");
                }
            }
            CoreEvent::PassFailed { reasons, error } => {
                debug!(reasons = %reasons, error = %error, "Pass failed, waiting for next trigger");
            }
        }
    }

    async fn shutdown(self, coordinator: CoordinatorHandle, worker: JoinHandle<()>) {
        info!("Shutting down focusgated");

        coordinator.shutdown();
        if let Err(e) = worker.await {
            warn!(error = %e, "Coordinator task failed");
        }

        if let Err(e) = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ServiceStopped))
        {
            warn!(error = %e, "Failed to log service shutdown");
        }

        debug!(path = %self.pid_file.path().display(), "Releasing pid file");
        drop(self.pid_file);

        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "focusgated starting"
    );

    if focusgate_util::is_mock_time_active() {
        warn!(
            now = %focusgate_util::format_datetime_full(&focusgate_util::now()),
            "Mock time is active"
        );
    }

    let signals = Signals::install()?;
    let service = Service::new(&args).await?;
    service.run(signals).await
}
