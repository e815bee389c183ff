//! Runtime settings for the bridge.
//!
//! Every field has a default, so an empty configuration is valid. Values are
//! layered: defaults, then an optional settings file, then `ATI_*`
//! environment variables (e.g. `ATI_DEBOUNCE_MS=250`).

use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_documents_dir() -> PathBuf {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(|home| PathBuf::from(home).join("Documents"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_platform_folder() -> String {
    "NinjaTrader 8".to_string()
}

fn default_incoming_folder() -> String {
    "incoming".to_string()
}

fn default_outgoing_folder() -> String {
    "outgoing".to_string()
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_max_latency_ms() -> u64 {
    500
}

fn default_poll_tick_ms() -> u64 {
    25
}

fn default_scan_existing() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory that contains the platform's folder.
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    #[serde(default = "default_platform_folder")]
    pub platform_folder: String,

    /// Command directory name, relative to the platform folder.
    #[serde(default = "default_incoming_folder")]
    pub incoming_folder: String,

    /// Update directory name, relative to the platform folder.
    #[serde(default = "default_outgoing_folder")]
    pub outgoing_folder: String,

    /// Quiet time before a changed update file is read.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Longest a file that keeps changing waits before it is read anyway.
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,

    /// How often the watcher wakes up to check for settled files.
    #[serde(default = "default_poll_tick_ms")]
    pub poll_tick_ms: u64,

    /// Load the files already present in the update directory on start.
    #[serde(default = "default_scan_existing")]
    pub scan_existing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
            platform_folder: default_platform_folder(),
            incoming_folder: default_incoming_folder(),
            outgoing_folder: default_outgoing_folder(),
            debounce_ms: default_debounce_ms(),
            max_latency_ms: default_max_latency_ms(),
            poll_tick_ms: default_poll_tick_ms(),
            scan_existing: default_scan_existing(),
        }
    }
}

impl Settings {
    /// Default settings rooted at an explicit documents directory.
    pub fn with_documents_dir(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            ..Self::default()
        }
    }

    /// Loads settings from an optional file plus `ATI_*` environment variables.
    ///
    /// # Arguments
    ///
    /// * `path` - Settings file (any format the `config` crate detects from the
    ///   extension). A missing file is not an error.
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` with defaults for everything not set.
    /// * `Err(AtiError::Config)` if a source is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix("ATI").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Never shorter than the debounce interval.
    pub fn max_latency(&self) -> Duration {
        Duration::from_millis(self.max_latency_ms.max(self.debounce_ms))
    }

    pub fn poll_tick(&self) -> Duration {
        Duration::from_millis(self.poll_tick_ms.max(1))
    }
}
