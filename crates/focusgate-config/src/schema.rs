//! Raw configuration schema (as parsed from TOML)

use focusgate_api::RawSchedule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Global daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// Fixed baseline blocking list
    #[serde(default)]
    pub baseline: RawBaseline,

    /// Initial schedule, saved to the store on first start
    #[serde(default)]
    pub schedule: Option<RawSchedule>,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Data directory for the store and pid file
    pub data_dir: Option<PathBuf>,

    /// Where the installed ruleset document is written
    pub rules_path: Option<PathBuf>,

    /// Seconds between periodic reconciliation ticks (1-60)
    pub tick_seconds: Option<u64>,

    /// Redirect target for blocked navigations
    pub block_page: Option<String>,
}

/// Baseline ruleset definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBaseline {
    /// Ruleset identifier (default: "ruleset_1")
    pub ruleset_id: Option<String>,

    /// Domains blocked whenever the schedule is active
    #[serde(default)]
    pub domains: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_daemon_and_baseline() {
        let toml_str = r#"
            config_version = 1

            [daemon]
            tick_seconds = 30
            block_page = "/blocked.html"

            [baseline]
            domains = ["youtube.com", "www.reddit.com"]
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.daemon.tick_seconds, Some(30));
        assert_eq!(config.baseline.domains.len(), 2);
        assert!(config.baseline.ruleset_id.is_none());
        assert!(config.schedule.is_none());
    }

    #[test]
    fn parse_schedule_tables() {
        let toml_str = r#"
            config_version = 1

            [schedule.monday]
            enabled = true
            start = "09:00"
            end = "17:00"

            [schedule.saturday]
            enabled = false
            start = "10:00"
            end = "12:00"
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        let schedule = config.schedule.unwrap();
        assert_eq!(schedule.days.len(), 2);
        assert!(schedule.get("monday").unwrap().enabled);
        assert_eq!(schedule.get("saturday").unwrap().start, "10:00");
    }
}
