//! Validated settings structures

use crate::schema::{RawBaseline, RawConfig, RawDaemonConfig};
use focusgate_api::RawSchedule;
use focusgate_util::{RulesetId, default_data_dir, default_rules_path};
use std::path::PathBuf;
use std::time::Duration;

/// Default redirect target for blocked navigations
pub const DEFAULT_BLOCK_PAGE: &str = "/block.html";

/// Default baseline ruleset identifier
pub const DEFAULT_RULESET_ID: &str = "ruleset_1";

/// Default seconds between periodic ticks
pub const DEFAULT_TICK_SECONDS: u64 = 60;

/// Validated settings ready for use by the daemon
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub daemon: DaemonConfig,
    pub baseline: BaselinePolicy,

    /// Schedule to save when the store has none yet
    pub seed_schedule: Option<RawSchedule>,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            daemon: DaemonConfig::from_raw(raw.daemon),
            baseline: BaselinePolicy::from_raw(raw.baseline),
            seed_schedule: raw.schedule,
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub rules_path: PathBuf,
    pub tick_interval: Duration,
    pub block_page: String,
}

impl DaemonConfig {
    fn from_raw(raw: RawDaemonConfig) -> Self {
        let data_dir = raw.data_dir.unwrap_or_else(default_data_dir);
        let rules_path = raw
            .rules_path
            .unwrap_or_else(|| default_rules_path(&data_dir));

        Self {
            data_dir,
            rules_path,
            tick_interval: Duration::from_secs(
                raw.tick_seconds.unwrap_or(DEFAULT_TICK_SECONDS),
            ),
            block_page: raw
                .block_page
                .map(|p| p.trim().to_string())
                .unwrap_or_else(|| DEFAULT_BLOCK_PAGE.to_string()),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_raw(RawDaemonConfig::default())
    }
}

/// The fixed baseline blocking list
#[derive(Debug, Clone)]
pub struct BaselinePolicy {
    pub ruleset_id: RulesetId,
    pub domains: Vec<String>,
}

impl BaselinePolicy {
    fn from_raw(raw: RawBaseline) -> Self {
        Self {
            ruleset_id: RulesetId::new(
                raw.ruleset_id
                    .unwrap_or_else(|| DEFAULT_RULESET_ID.to_string()),
            ),
            domains: raw
                .domains
                .into_iter()
                .map(|d| d.trim().to_lowercase())
                .collect(),
        }
    }
}

impl Default for BaselinePolicy {
    fn default() -> Self {
        Self::from_raw(RawBaseline::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.daemon.tick_interval, Duration::from_secs(60));
        assert_eq!(settings.daemon.block_page, DEFAULT_BLOCK_PAGE);
        assert_eq!(settings.baseline.ruleset_id.as_str(), DEFAULT_RULESET_ID);
        assert!(settings.baseline.domains.is_empty());
        assert_eq!(
            settings.daemon.rules_path,
            settings.daemon.data_dir.join("rules.json")
        );
    }

    #[test]
    fn test_rules_path_follows_data_dir() {
        let daemon = DaemonConfig::from_raw(RawDaemonConfig {
            data_dir: Some(PathBuf::from("/srv/focusgate")),
            ..Default::default()
        });
        assert_eq!(daemon.rules_path, PathBuf::from("/srv/focusgate/rules.json"));
    }

    #[test]
    fn test_baseline_domains_normalized() {
        let baseline = BaselinePolicy::from_raw(RawBaseline {
            ruleset_id: Some("work".into()),
            domains: vec![" YouTube.com ".into()],
        });
        assert_eq!(baseline.ruleset_id.as_str(), "work");
        assert_eq!(baseline.domains, vec!["youtube.com".to_string()]);
    }
}
