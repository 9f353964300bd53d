//! BoothLock configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinator::CoordinatorConfig;
use crate::domain::OperatorMode;

/// Main BoothLock configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session timeline settings
    pub timeline: TimelineSettings,

    /// Coordinator actor tuning
    pub coordinator: CoordinatorConfig,

    /// Override audit sink
    pub audit: AuditConfig,

    /// External collaborators
    pub services: ServicesConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.timeline.grace_secs == 0 {
            return Err(eyre::eyre!("timeline.grace-secs must be a positive number of seconds"));
        }
        if self.coordinator.channel_buffer == 0 || self.coordinator.event_capacity == 0 {
            return Err(eyre::eyre!("coordinator channel sizes must be positive"));
        }
        if let Some(cmd) = &self.services.cancel_command
            && cmd.is_empty()
        {
            return Err(eyre::eyre!("services.cancel-command must not be an empty list"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .boothlock.yml
        let local_config = PathBuf::from(".boothlock.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/boothlock/boothlock.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("boothlock").join("boothlock.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Settings the timeline needs once local configuration has loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// How long a busy reset waits before canceling busy work
    #[serde(rename = "grace-secs")]
    pub grace_secs: u64,

    /// Customer or admin terminal
    #[serde(rename = "operator-mode")]
    pub operator_mode: OperatorMode,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            grace_secs: 30,
            operator_mode: OperatorMode::Customer,
        }
    }
}

impl TimelineSettings {
    /// Grace period as a Duration
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

/// Override audit sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Write override entries to disk
    pub enabled: bool,

    /// Directory holding overrides.jsonl
    pub dir: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/boothlock/audit on Linux)
        let dir = dirs::data_local_dir()
            .map(|d| d.join("boothlock").join("audit"))
            .unwrap_or_else(|| PathBuf::from(".boothlock/audit"));

        Self { enabled: true, dir }
    }
}

/// External collaborator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Command (argv) that cancels in-flight export work
    #[serde(rename = "cancel-command", skip_serializing_if = "Option::is_none")]
    pub cancel_command: Option<Vec<String>>,
}
