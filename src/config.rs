//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/feelflow/feelflow.toml`
//! 3. Explicit config file (`--config <file>`)
//! 4. Environment variables: `FEELFLOW_*` prefix

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local};
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::util::path::expand_env_vars;

/// File name of the session log inside `data_dir`.
pub const SESSIONS_FILE: &str = "sessions.jsonl";

/// History display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Offset used to bucket sessions into days (default: local offset)
    pub utc_offset_minutes: Option<i32>,
    /// Upper bound for `recent`
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            recent_limit: 100,
        }
    }
}

impl HistoryConfig {
    /// Resolve the configured offset, falling back to the local one.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .unwrap_or_else(|| *Local::now().offset())
    }
}

/// Raw history config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawHistoryConfig {
    pub utc_offset_minutes: Option<i32>,
    pub recent_limit: Option<usize>,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub user_id: Option<String>,
    pub taxonomy: Option<PathBuf>,
    #[serde(default)]
    pub history: RawHistoryConfig,
}

/// Unified configuration for feelflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where the session log lives
    pub data_dir: PathBuf,
    /// Identity recorded with each session (default: $USER)
    pub user_id: String,
    /// JSON taxonomy replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<PathBuf>,
    pub history: HistoryConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let user_id = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "anonymous".into());

        Self {
            data_dir: dirs_default_data_dir(),
            user_id,
            taxonomy: None,
            history: HistoryConfig::default(),
        }
    }
}

/// Platform data directory, or ~/.feelflow when none can be determined.
fn dirs_default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "feelflow")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".feelflow")))
        .unwrap_or_else(|| PathBuf::from("~/.feelflow"))
}

/// Get the XDG config directory for feelflow.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "feelflow").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("feelflow.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Path of the JSON Lines session log.
    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join(SESSIONS_FILE)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);

        if let Some(taxonomy) = &self.taxonomy {
            self.taxonomy = Some(PathBuf::from(expand_env_vars(
                taxonomy.to_string_lossy().as_ref(),
            )));
        }
    }

    /// Merge overlay config onto self (base): overlay wins if specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            user_id: overlay
                .user_id
                .clone()
                .unwrap_or_else(|| self.user_id.clone()),
            taxonomy: overlay.taxonomy.clone().or_else(|| self.taxonomy.clone()),
            history: HistoryConfig {
                utc_offset_minutes: overlay
                    .history
                    .utc_offset_minutes
                    .or(self.history.utc_offset_minutes),
                recent_limit: overlay
                    .history
                    .recent_limit
                    .unwrap_or(self.history.recent_limit),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist if given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply FEELFLOW_* environment variables as explicit overrides.
    ///
    /// Nested keys use a double underscore: `FEELFLOW_HISTORY__RECENT_LIMIT`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("FEELFLOW")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("user_id") {
            settings.user_id = val;
        }
        if let Ok(val) = config.get_string("taxonomy") {
            settings.taxonomy = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("history.utc_offset_minutes") {
            settings.history.utc_offset_minutes = Some(parse_env_number(
                "history.utc_offset_minutes",
                &val,
            )?);
        }
        if let Ok(val) = config.get_string("history.recent_limit") {
            settings.history.recent_limit = parse_env_number("history.recent_limit", &val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# feelflow configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/feelflow/feelflow.toml
#   Explicit: feelflow --config <file>
#   Env:      FEELFLOW_* environment variables (FEELFLOW_HISTORY__RECENT_LIMIT for nested keys)

# Directory holding sessions.jsonl
# data_dir = "~/.local/share/feelflow"

# Identity stored with every session
# user_id = "me"

# JSON taxonomy replacing the built-in emotion wheel
# taxonomy = "~/emotions.json"

[history]
# Offset used to decide which day a session belongs to (default: local time)
# utc_offset_minutes = 60

# Maximum number of sessions shown by `feelflow recent`
# recent_limit = 100
"#
        .to_string()
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ApplicationError>
where
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!("{key}: {e}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_has_user_and_limit() {
        let settings = Settings::default();
        assert!(!settings.user_id.is_empty());
        assert_eq!(settings.history.recent_limit, 100);
        assert!(settings.taxonomy.is_none());
        assert!(settings.sessions_path().ends_with(SESSIONS_FILE));
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/.feelflow"),
            user_id: "me".to_string(),
            taxonomy: Some(PathBuf::from("$HOME/wheel.json")),
            history: HistoryConfig::default(),
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let data_dir = settings.data_dir.to_string_lossy();
        assert!(
            data_dir.starts_with(&home),
            "data_dir should start with home dir: {}",
            data_dir
        );
        assert!(settings
            .taxonomy
            .as_ref()
            .unwrap()
            .to_string_lossy()
            .starts_with(&home));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings {
            data_dir: PathBuf::from("/data"),
            user_id: "base".to_string(),
            taxonomy: None,
            history: HistoryConfig {
                utc_offset_minutes: Some(60),
                recent_limit: 100,
            },
        };
        let overlay = RawSettings {
            user_id: Some("overlay".to_string()),
            history: RawHistoryConfig {
                utc_offset_minutes: None,
                recent_limit: Some(10),
            },
            ..Default::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.data_dir, PathBuf::from("/data"));
        assert_eq!(result.user_id, "overlay");
        assert_eq!(result.history.utc_offset_minutes, Some(60));
        assert_eq!(result.history.recent_limit, 10);
    }

    #[test]
    fn given_configured_offset_when_resolving_then_uses_it() {
        let history = HistoryConfig {
            utc_offset_minutes: Some(-300),
            recent_limit: 100,
        };
        assert_eq!(history.offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.user_id.is_none());
    }
}
