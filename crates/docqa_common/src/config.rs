//! Client configuration
//!
//! Config file: ~/.config/docqa/config.toml or /etc/docqa/config.toml
//!
//! ```toml
//! [server]
//! base_url = "http://127.0.0.1:8000"
//!
//! [polling]
//! status_interval_secs = 30
//!
//! [ui]
//! notification_ttl_secs = 3
//! color = "auto"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 3;

/// Color display mode for one-shot output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Background readiness poll period
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: DEFAULT_STATUS_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long a notification stays on screen
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_secs: u64,

    #[serde(default)]
    pub color: ColorMode,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            color: ColorMode::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file for the terminal UI; discovered from XDG vars when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocqaConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_status_interval() -> u64 {
    DEFAULT_STATUS_INTERVAL_SECS
}

fn default_notification_ttl() -> u64 {
    DEFAULT_NOTIFICATION_TTL_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DocqaConfig {
    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. User config (~/.config/docqa/config.toml)
    /// 3. System config (/etc/docqa/config.toml)
    /// 4. Defaults
    ///
    /// Environment overrides are applied on top, then the result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => Self::load_discovered()?,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_discovered() -> Result<Self> {
        if let Some(user_path) = paths::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = paths::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: DocqaConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// DOCQA_SERVER_URL and DOCQA_LOG_LEVEL
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DOCQA_SERVER_URL").filter(|v| !v.trim().is_empty()) {
            self.server.base_url = url.trim().to_string();
        }
        if let Some(level) = lookup("DOCQA_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.server.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!(
                "Invalid server.base_url '{}': expected an http:// or https:// URL",
                url
            );
        }
        if self.polling.status_interval_secs == 0 {
            bail!("polling.status_interval_secs must be at least 1");
        }
        Ok(())
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.polling.status_interval_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.ui.notification_ttl_secs)
    }
}
