//! focusgatectl - admin tool for focusgated
//!
//! Edits the custom site list and weekly schedule in the daemon's store,
//! then sends SIGHUP to the running daemon so it reconciles right away.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use focusgate_api::{RawDayWindow, RawSchedule, is_valid_host, normalize_domain};
use focusgate_config::{ALL_WEEKDAYS, WeeklySchedule, load_config_or_default};
use focusgate_core::evaluate_raw;
use focusgate_store::{AuditEvent, AuditEventType, AuditLog, ConfigStore, SqliteStore};
use focusgate_util::{
    FOCUSGATE_DATA_DIR_ENV, TimeOfDay, default_config_path, format_datetime_full, parse_weekday,
    pid_file_path, running_pid, store_path, weekday_key,
};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};

/// focusgatectl - Manage blocked sites and the blocking schedule
#[derive(Parser, Debug)]
#[command(name = "focusgatectl")]
#[command(about = "Manage blocked sites and the blocking schedule", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/focusgate/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set FOCUSGATE_DATA_DIR env var)
    #[arg(short, long, env = FOCUSGATE_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the custom blocked-site list
    #[command(subcommand)]
    Sites(SiteCommands),

    /// Manage the weekly blocking schedule
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Show whether blocking is active and recent passes
    Status,
}

#[derive(Subcommand, Debug)]
enum SiteCommands {
    /// Block one or more sites
    Add {
        #[arg(required = true)]
        domains: Vec<String>,
    },
    /// Unblock a site
    Remove { domain: String },
    /// Unblock every custom site
    Clear,
    /// List custom sites in rule order
    List,
}

#[derive(Subcommand, Debug)]
enum ScheduleCommands {
    /// Block on DAY between START and END (HH:MM, inclusive)
    Set {
        day: String,
        start: String,
        end: String,
    },
    /// Never block on DAY
    Disable { day: String },
    /// Print the schedule
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => {
            load_config_or_default(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?
                .daemon
                .data_dir
        }
    };

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
    let db_path = store_path(&data_dir);
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    let changed = match args.command {
        Commands::Sites(cmd) => sites(&store, cmd).await?,
        Commands::Schedule(cmd) => schedule(&store, cmd).await?,
        Commands::Status => {
            status(&store).await?;
            false
        }
    };

    if changed {
        notify_daemon(&data_dir);
    }

    Ok(())
}

async fn sites(store: &SqliteStore, cmd: SiteCommands) -> Result<bool> {
    match cmd {
        SiteCommands::Add { domains } => {
            let invalid: Vec<&str> = domains
                .iter()
                .filter(|d| !is_valid_host(&normalize_domain(d)))
                .map(String::as_str)
                .collect();
            if !invalid.is_empty() {
                bail!("Not a valid domain: {}", invalid.join(", "));
            }

            let mut changed = false;
            for domain in domains {
                if store.add_site(&domain).await? {
                    store.append_audit(AuditEvent::new(AuditEventType::SiteAdded {
                        domain: domain.clone(),
                    }))?;
                    println!("Blocked {}", domain);
                    changed = true;
                } else {
                    println!("{} is already blocked", domain);
                }
            }
            Ok(changed)
        }
        SiteCommands::Remove { domain } => {
            if !store.remove_site(&domain).await? {
                bail!("{} is not in the blocked list", domain);
            }
            store.append_audit(AuditEvent::new(AuditEventType::SiteRemoved {
                domain: domain.clone(),
            }))?;
            println!("Unblocked {}", domain);
            Ok(true)
        }
        SiteCommands::Clear => {
            store.clear_sites().await?;
            store.append_audit(AuditEvent::new(AuditEventType::SitesCleared))?;
            println!("Cleared all custom sites");
            Ok(true)
        }
        SiteCommands::List => {
            let list = store.get_domain_list().await?;
            if list.is_empty() {
                println!("No custom sites");
            }
            for (index, domain) in list.iter().enumerate() {
                println!("{:>4}  {}", index, domain);
            }
            Ok(false)
        }
    }
}

async fn schedule(store: &SqliteStore, cmd: ScheduleCommands) -> Result<bool> {
    match cmd {
        ScheduleCommands::Set { day, start, end } => {
            let key = day_key(&day)?;
            TimeOfDay::parse(&start)?;
            TimeOfDay::parse(&end)?;

            let mut raw = store.get_schedule().await?.unwrap_or_default();
            raw.set_day(key, RawDayWindow::new(true, start.as_str(), end.as_str()));
            save_schedule(store, &raw).await?;

            println!("Blocking on {} from {} to {}", key, start, end);
            Ok(true)
        }
        ScheduleCommands::Disable { day } => {
            let key = day_key(&day)?;

            let mut raw = store.get_schedule().await?.unwrap_or_default();
            let window = match raw.get(key) {
                Some(existing) => RawDayWindow {
                    enabled: false,
                    ..existing.clone()
                },
                None => RawDayWindow::new(false, "", ""),
            };
            raw.set_day(key, window);
            save_schedule(store, &raw).await?;

            println!("No blocking on {}", key);
            Ok(true)
        }
        ScheduleCommands::Show => {
            let raw = store.get_schedule().await?.unwrap_or_default();
            print_schedule(&raw)?;
            Ok(false)
        }
    }
}

async fn save_schedule(store: &SqliteStore, raw: &RawSchedule) -> Result<()> {
    // Refuse to save something the daemon could not evaluate
    WeeklySchedule::from_raw(raw)?;
    store.set_schedule(raw).await?;
    store.append_audit(AuditEvent::new(AuditEventType::ScheduleSaved))?;
    Ok(())
}

fn day_key(day: &str) -> Result<&'static str> {
    match parse_weekday(day) {
        Some(weekday) => Ok(weekday_key(weekday)),
        None => bail!("Unknown day '{}'", day),
    }
}

fn print_schedule(raw: &RawSchedule) -> Result<()> {
    let schedule = WeeklySchedule::from_raw(raw).context("Stored schedule is invalid")?;

    for weekday in ALL_WEEKDAYS {
        match schedule.day(weekday) {
            Some(window) if window.enabled => {
                let note = if window.crosses_midnight() {
                    " (wraps past midnight)"
                } else {
                    ""
                };
                println!(
                    "{:<10} {} - {}{}",
                    weekday_key(weekday),
                    window.start,
                    window.end,
                    note
                );
            }
            _ => println!("{:<10} off", weekday_key(weekday)),
        }
    }
    Ok(())
}

async fn status(store: &SqliteStore) -> Result<()> {
    let now = focusgate_util::now();
    let raw = store.get_schedule().await?;
    let sites = store.get_domain_list().await?;

    match evaluate_raw(raw.as_ref(), &now) {
        Ok(true) => println!("Blocking: active"),
        Ok(false) => println!("Blocking: inactive"),
        Err(e) => println!("Blocking: inactive (schedule error: {})", e),
    }
    println!("Time: {}", format_datetime_full(&now));
    println!("Custom sites: {}", sites.len());

    let applied: Vec<_> = store
        .get_recent_audits(50)?
        .into_iter()
        .filter_map(|event| match event.event {
            AuditEventType::PolicyApplied {
                should_block,
                active_domain_count,
                ops_applied,
                complete,
            } => Some((event.timestamp, should_block, active_domain_count, ops_applied, complete)),
            _ => None,
        })
        .take(5)
        .collect();

    if applied.is_empty() {
        println!("No passes recorded");
        return Ok(());
    }

    println!("Recent passes:");
    for (timestamp, should_block, domains, ops, complete) in applied {
        println!(
            "  {}  {}  {} site(s)  {} op(s){}",
            format_datetime_full(&timestamp),
            if should_block { "blocking" } else { "open    " },
            domains,
            ops,
            if complete { "" } else { "  (partial)" }
        );
    }
    Ok(())
}

/// Ask a running daemon to reconcile now. Missing daemon is not an error.
///
/// Only a pid file still locked by the daemon is trusted, so a file left
/// by a crashed daemon never leads to signalling an unrelated process.
fn notify_daemon(data_dir: &Path) {
    let pid_path = pid_file_path(data_dir);
    let pid = match running_pid(&pid_path) {
        Ok(pid) => pid,
        Err(e) => {
            println!("Could not check for focusgated ({}); changes apply on its next tick", e);
            return;
        }
    };

    let Some(pid) = pid else {
        println!("focusgated is not running; changes apply when it starts");
        return;
    };

    match signal::kill(Pid::from_raw(pid), Signal::SIGHUP) {
        Ok(()) => println!("Notified focusgated (pid {})", pid),
        Err(e) => println!(
            "Could not notify focusgated (pid {}): {}; changes apply on its next tick",
            pid, e
        ),
    }
}
