//! TOML-based application configuration.
//!
//! Holds:
//! - Remote service endpoint and credentials
//! - Outbox retry bound
//! - Activity tracker history caps
//! - Prompt assembly budgets
//! - Sign-in migration policy
//!
//! Configuration is stored at `~/.config/ascent/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, CoreError};

/// Remote progress / life-context service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL; when unset, authenticated commands cannot reach a remote.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Remote write outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Attempts per write before it is reported as failed and dropped.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Activity tracker history caps. Values above 20 / 50 are clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_session_history_cap")]
    pub session_history_cap: usize,
    #[serde(default = "default_click_history_cap")]
    pub click_history_cap: usize,
}

/// Context assembler budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Per-lesson summary budget in characters.
    #[serde(default = "default_lesson_summary_chars")]
    pub lesson_summary_chars: usize,
    #[serde(default = "default_max_insights")]
    pub max_insights: usize,
    /// Session-history entries shown in the recency trail.
    #[serde(default = "default_recent_trail")]
    pub recent_trail: usize,
}

/// What happens to anonymous progress when a user signs in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignInConfig {
    /// Push locally completed units to the remote on sign-in.
    #[serde(default)]
    pub merge_local_progress: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ascent/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub outbox: OutboxConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub sign_in: SignInConfig,
    /// Curriculum TOML used by the context assembler.
    #[serde(default)]
    pub curriculum_path: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_session_history_cap() -> usize {
    20
}
fn default_click_history_cap() -> usize {
    50
}
fn default_lesson_summary_chars() -> usize {
    160
}
fn default_max_insights() -> usize {
    5
}
fn default_recent_trail() -> usize {
    5
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            session_history_cap: default_session_history_cap(),
            click_history_cap: default_click_history_cap(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            lesson_summary_chars: default_lesson_summary_chars(),
            max_insights: default_max_insights(),
            recent_trail: default_recent_trail(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        key.split('.').try_fold(root, |current, part| current.get(part))
    }

    /// Parse `value` into the JSON type of the existing leaf at `key`.
    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut parent = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                parent = parent.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let slot = parent
            .as_object_mut()
            .and_then(|obj| obj.get_mut(leaf))
            .ok_or_else(unknown)?;

        let new_value = match slot {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            // Optional strings are null until first set.
            serde_json::Value::Null | serde_json::Value::String(_) => {
                if value.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::String(value.to_string())
                }
            }
        };
        *slot = new_value;
        Ok(())
    }

    /// Location of the config file under the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `~/.config/ascent/config.toml`, writing defaults if absent.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if absent.
    ///
    /// # Errors
    /// Same as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to `~/.config/ascent/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not parse as
    /// the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.remote.timeout_secs, 10);
        assert_eq!(cfg.outbox.max_attempts, 3);
        assert_eq!(cfg.activity.session_history_cap, 20);
        assert_eq!(cfg.activity.click_history_cap, 50);
        assert_eq!(cfg.prompt.max_insights, 5);
        assert_eq!(cfg.prompt.recent_trail, 5);
        assert!(!cfg.sign_in.merge_local_progress);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[outbox]\nmax_attempts = 7\n").unwrap();
        assert_eq!(cfg.outbox.max_attempts, 7);
        assert_eq!(cfg.prompt.lesson_summary_chars, 160);
        assert!(cfg.remote.base_url.is_none());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("outbox.max_attempts").as_deref(), Some("3"));
        assert_eq!(cfg.get("sign_in.merge_local_progress").as_deref(), Some("false"));
        assert!(cfg.get("outbox.missing").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("outbox.max_attempts", "5").unwrap();
        cfg.set("sign_in.merge_local_progress", "true").unwrap();
        cfg.set("remote.base_url", "https://api.example.com").unwrap();
        cfg.set("curriculum_path", "/tmp/c.toml").unwrap();
        assert_eq!(cfg.outbox.max_attempts, 5);
        assert!(cfg.sign_in.merge_local_progress);
        assert_eq!(cfg.remote.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(cfg.curriculum_path.as_deref(), Some("/tmp/c.toml"));

        cfg.set("remote.base_url", "").unwrap();
        assert!(cfg.remote.base_url.is_none());
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("outbox.nope", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.set("outbox.max_attempts", "many"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(cfg.set("sign_in.merge_local_progress", "yes").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("prompt.recent_trail", "3").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().prompt.recent_trail, 3);
    }

    #[test]
    fn load_from_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "outbox = [[[").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
