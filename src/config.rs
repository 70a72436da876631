//! Configuration for the memory sampler.
//!
//! Everything here is fixed at startup from the command line; nothing is
//! reloaded while a run is in progress.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a sampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Executable names to monitor
    pub watch: WatchSet,

    /// Duration of each collection window
    #[serde(with = "duration_serde")]
    pub window_duration: Duration,

    /// Time between sampling ticks
    #[serde(with = "duration_serde")]
    pub tick_interval: Duration,

    /// Directory that receives one folder per window
    pub output_root: PathBuf,

    /// Which memory counter to record
    pub metric: MemoryMetric,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch: WatchSet::default(),
            window_duration: Duration::from_secs(30),
            tick_interval: Duration::from_secs(4),
            output_root: PathBuf::from("."),
            metric: MemoryMetric::Private,
        }
    }
}

impl Config {
    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.is_empty() {
            return Err(ConfigError::EmptyWatchSet);
        }
        if self.window_duration.as_secs() == 0 {
            return Err(ConfigError::ZeroDuration("window duration"));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("tick interval"));
        }
        Ok(())
    }

    /// Ensure the output root exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_root).map_err(|e| ConfigError::IoError(e.to_string()))
    }
}

/// The fixed, ordered set of executable names watched during a run.
///
/// Duplicates are dropped; the first occurrence decides the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchSet(Vec<String>);

impl WatchSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !name.is_empty() && !out.contains(&name) {
                out.push(name);
            }
        }
        Self(out)
    }

    /// Parse a comma-separated list of executable names.
    pub fn from_csv(s: &str) -> Self {
        Self::new(s.split(',').map(|s| s.trim().to_string()))
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Memory counter recorded for each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryMetric {
    /// Committed private bytes
    #[default]
    Private,
    /// Resident working set
    WorkingSet,
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    EmptyWatchSet,
    ZeroDuration(&'static str),
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyWatchSet => write!(f, "At least one process name must be watched"),
            ConfigError::ZeroDuration(what) => write!(f, "The {what} must be at least one second"),
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
