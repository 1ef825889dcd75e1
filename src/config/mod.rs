//! Configuration for process handles
//!
//! Handles configuration loading (JSON or TOML), environment overrides and
//! validation. The termination signal is platform dependent, so it lives
//! here as an explicit parameter instead of a constant in the lifecycle code.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(unix)]
use nix::sys::signal::Signal;

/// Environment variable overriding [`ProcessConfig::stop_signal`]
pub const ENV_STOP_SIGNAL: &str = "PROCTHREAD_STOP_SIGNAL";
/// Environment variable overriding [`ProcessConfig::on_drop`]
pub const ENV_ON_DROP: &str = "PROCTHREAD_ON_DROP";

/// Stop signal used when neither the caller nor the configuration picks one
#[cfg(unix)]
pub const DEFAULT_STOP_SIGNAL: Signal = Signal::SIGKILL;

/// What a handle does with its child when the handle is dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPolicy {
    /// Leave the child alone; reaping is the caller's obligation
    #[default]
    Detach,
    /// Collect the child's status if it already terminated, never block
    Reap,
    /// Signal the child with the stop signal and wait for it
    Kill,
}

impl std::str::FromStr for DropPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detach" => Ok(DropPolicy::Detach),
            "reap" => Ok(DropPolicy::Reap),
            "kill" => Ok(DropPolicy::Kill),
            other => Err(anyhow::anyhow!("Unknown drop policy: {}", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "procthread=debug"); RUST_LOG wins when set
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

/// Process handle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Signal sent by `stop`/`kill` when the caller does not pick one.
    /// Accepts "SIGKILL", "KILL" or a signal number.
    #[serde(default = "default_stop_signal")]
    pub stop_signal: String,

    /// Behaviour when a handle owning a child is dropped
    #[serde(default)]
    pub on_drop: DropPolicy,

    /// Logging configuration for programs that load this file
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_stop_signal() -> String {
    #[cfg(unix)]
    {
        DEFAULT_STOP_SIGNAL.as_str().to_string()
    }
    #[cfg(not(unix))]
    {
        "SIGKILL".to_string()
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            stop_signal: default_stop_signal(),
            on_drop: DropPolicy::Detach,
            logging: None,
        }
    }
}

impl ProcessConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ProcessConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ProcessConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, choosing the format by file extension
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            _ => Self::from_json_file(path),
        }
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `PROCTHREAD_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(signal) = lookup(ENV_STOP_SIGNAL) {
            self.stop_signal = signal;
        }
        if let Some(policy) = lookup(ENV_ON_DROP) {
            self.on_drop = policy.parse()?;
        }
        self.validate()
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        #[cfg(unix)]
        self.stop_signal()?;
        Ok(())
    }

    /// Resolve the configured stop signal
    #[cfg(unix)]
    pub fn stop_signal(&self) -> anyhow::Result<Signal> {
        parse_signal(&self.stop_signal)
    }
}

/// Parse "SIGTERM", "term" or "15" into a signal
#[cfg(unix)]
pub fn parse_signal(value: &str) -> anyhow::Result<Signal> {
    let value = value.trim();
    if let Ok(number) = value.parse::<i32>() {
        return Signal::try_from(number)
            .map_err(|_| anyhow::anyhow!("Invalid signal number: {}", number));
    }

    let upper = value.to_ascii_uppercase();
    let name = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{}", upper)
    };
    name.parse::<Signal>()
        .map_err(|_| anyhow::anyhow!("Invalid signal name: {}", value))
}
