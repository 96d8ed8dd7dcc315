//! Engine configuration.
//!
//! Loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Timeout applied to each probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to each automatic token acquisition.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum probe results kept in memory.
pub const LOG_CAP: usize = 1000;

/// Maximum probe results written to storage.
pub const PERSISTED_LOG_CAP: usize = 500;

/// Maximum history entries kept and persisted.
pub const HISTORY_CAP: usize = 100;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the persisted buckets.
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|p| p.join("apiwatch"))
            .unwrap_or_else(|| PathBuf::from("apiwatch-data"));
        Self { data_dir }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `APIWATCH_DATA_DIR`: bucket directory (default: platform data dir)
    pub fn load() -> Self {
        let mut cfg = Self::default();
        if let Ok(dir) = env::var("APIWATCH_DATA_DIR") {
            if !dir.is_empty() {
                cfg.data_dir = PathBuf::from(dir);
            }
        }
        cfg
    }
}
