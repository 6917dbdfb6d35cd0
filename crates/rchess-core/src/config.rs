//! Explorer configuration
//!
//! ```toml
//! threads = 4
//! duration_ms = 10000
//! progress_interval_ms = 1000
//! worker_stack_mb = 8
//! think_ms = 2000
//! ```
//!
//! Every key is optional. `RCHESS_THREADS` overrides the thread count of
//! a loaded file; command-line flags override both.

use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable overriding [`ExplorerConfig::threads`]
pub const THREADS_ENV: &str = "RCHESS_THREADS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    /// Worker threads; 0 = available parallelism
    pub threads: usize,
    /// Length of an `explore` run
    pub duration_ms: u64,
    /// Progress log interval; 0 disables the reporter
    pub progress_interval_ms: u64,
    /// Worker stack size override in MiB
    pub worker_stack_mb: Option<usize>,
    /// Time the engine explores before answering in play mode
    pub think_ms: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            duration_ms: 10_000,
            progress_interval_ms: 1_000,
            worker_stack_mb: None,
            think_ms: 2_000,
        }
    }
}

impl ExplorerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ExplorerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply the environment override
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `RCHESS_THREADS` if set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(THREADS_ENV) {
            self.threads = parse_threads(&value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::Invalid("duration_ms must be positive".into()));
        }
        if self.worker_stack_mb == Some(0) {
            return Err(ConfigError::Invalid("worker_stack_mb must be positive".into()));
        }
        Ok(())
    }

    /// Thread count with 0 resolved to the machine's parallelism
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_ms)
    }

    pub fn progress_interval(&self) -> Option<Duration> {
        (self.progress_interval_ms > 0).then(|| Duration::from_millis(self.progress_interval_ms))
    }
}

fn parse_threads(value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{THREADS_ENV}={value:?} is not a thread count")))
}
