use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use crate::config::{Tag, TimerConfig};
use crate::error::TimerError;
use crate::logging::LoggerKind;

/// The part of [`TimerConfig`] that can live in a settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub max_time_warning_ms: u64,
    pub use_relative_time: bool,
    pub tag: Option<Tag>,
    pub method_name: Option<String>,
    pub logger: LoggerKind,
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            max_time_warning_ms: 0,
            use_relative_time: true,
            tag: None,
            method_name: None,
            logger: LoggerKind::Stderr,
        }
    }
}

impl TimerSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, TimerError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, TimerError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read settings from disk; `.json` files are JSON, anything else TOML
    pub fn load(path: &Path) -> Result<Self, TimerError> {
        let content = fs::read_to_string(path)
            .map_err(|e| TimerError::from(e).with_context(path.display().to_string()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Like [`TimerSettings::load`] but never fails
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                tracing::debug!(path = ?path, "Loaded timer settings");
                settings
            }
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Failed to load timer settings, using defaults"
                );
                Self::default()
            }
        }
    }

    pub fn into_config(self) -> TimerConfig {
        TimerConfig {
            logger: self.logger.build(),
            max_time_warning: Duration::from_millis(self.max_time_warning_ms),
            use_relative_time: self.use_relative_time,
            tag: self.tag,
            method_name: self.method_name,
            ..TimerConfig::default()
        }
    }
}

impl From<TimerSettings> for TimerConfig {
    fn from(settings: TimerSettings) -> Self {
        settings.into_config()
    }
}
