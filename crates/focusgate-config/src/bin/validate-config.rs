//! Config validation CLI tool
//!
//! Validates a focusgate configuration file and reports any errors.

use focusgate_config::{ConfigError, CURRENT_CONFIG_VERSION, WeeklySchedule, load_config};
use focusgate_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a focusgate configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!("  Data dir: {}", settings.daemon.data_dir.display());
            println!("  Rules file: {}", settings.daemon.rules_path.display());
            println!("  Tick: {}s", settings.daemon.tick_interval.as_secs());
            println!("  Block page: {}", settings.daemon.block_page);
            println!(
                "  Baseline ruleset: {} ({} domains)",
                settings.baseline.ruleset_id,
                settings.baseline.domains.len()
            );

            if let Some(seed) = &settings.seed_schedule {
                // Already validated, so conversion cannot fail here
                if let Ok(schedule) = WeeklySchedule::from_raw(seed) {
                    println!("  Seed schedule: {} enabled day(s)", schedule.enabled_days());
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
