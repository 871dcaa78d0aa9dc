//! Default paths for focusgate components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/focusgate/config.toml` or `~/.config/focusgate/config.toml`
//! - Data: `$XDG_DATA_HOME/focusgate` or `~/.local/share/focusgate`
//! - Rules: `<data dir>/rules.json`

use std::path::{Path, PathBuf};

/// Environment variable for overriding the config file path
pub const FOCUSGATE_CONFIG_ENV: &str = "FOCUSGATE_CONFIG";

/// Environment variable for overriding the data directory
pub const FOCUSGATE_DATA_DIR_ENV: &str = "FOCUSGATE_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "focusgate";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$FOCUSGATE_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/focusgate/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/focusgate/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(FOCUSGATE_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$FOCUSGATE_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/focusgate` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/focusgate` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(FOCUSGATE_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking FOCUSGATE_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// SQLite database holding the schedule, custom sites and audit log
pub fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join("focusgate.db")
}

/// Default location of the materialised rules document
pub fn default_rules_path(data_dir: &Path) -> PathBuf {
    data_dir.join("rules.json")
}

/// Pid file locked by the daemon so admin tools can signal it
pub fn pid_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("focusgated.pid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_focusgate() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("focusgate"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
    }

    #[test]
    fn data_files_live_in_data_dir() {
        let dir = PathBuf::from("/var/lib/focusgate");
        assert_eq!(store_path(&dir).parent().unwrap(), dir);
        assert_eq!(default_rules_path(&dir), dir.join("rules.json"));
        assert_eq!(pid_file_path(&dir), dir.join("focusgated.pid"));
    }
}
