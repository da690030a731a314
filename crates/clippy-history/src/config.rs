use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "clippy.json";
pub const HISTORY_FILENAME: &str = "clippy-history.json";

pub const MAX_HISTORY_ITEMS: usize = 200;
pub const MAX_RESULTS: usize = 50;
pub const MAX_STORED_LENGTH: usize = 20_000;
pub const POLL_INTERVAL_MS: u64 = 1200;
pub const FOCUS_DEBOUNCE_MS: u64 = 80;

/// Tunables for the history service. Every field falls back to its default
/// when absent from `clippy.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub poll_interval_ms: u64,
    pub max_items: usize,
    pub max_results: usize,
    pub max_stored_length: usize,
    pub focus_debounce_ms: u64,
    pub history_file: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            max_items: MAX_HISTORY_ITEMS,
            max_results: MAX_RESULTS,
            max_stored_length: MAX_STORED_LENGTH,
            focus_debounce_ms: FOCUS_DEBOUNCE_MS,
            history_file: HISTORY_FILENAME.to_string(),
        }
    }
}

impl HistoryConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn focus_debounce(&self) -> Duration {
        Duration::from_millis(self.focus_debounce_ms)
    }
}

/// Reads `clippy.json` from `dir`. A missing file yields the defaults; an
/// unreadable or malformed one is logged and also yields the defaults.
pub fn load_config(dir: &Path) -> HistoryConfig {
    let path = dir.join(CONFIG_FILENAME);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return HistoryConfig::default()
        }
        Err(error) => {
            tracing::warn!("failed to read config {}: {error}", path.display());
            return HistoryConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!("failed to parse config {}: {error}", path.display());
            HistoryConfig::default()
        }
    }
}
