//! Persisted run state.
//!
//! One JSON file under `DATA_DIR` carries the last run's outcome counters
//! and the per-meeting payload fingerprints that drive unchanged-skips.
//! Like the geocode cache, loading tolerates a missing or corrupt file and
//! saving is atomic.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const STATE_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to write run state {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode run state {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of the most recent sync run plus the fingerprint map carried
/// across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub skipped_reasons: BTreeMap<String, u32>,
    #[serde(default)]
    pub failed_reasons: BTreeMap<String, u32>,
    /// WordPress post id (as a string key) → payload fingerprint.
    #[serde(default)]
    pub fingerprints: BTreeMap<String, String>,
}

impl RunState {
    /// The state file location inside a data directory.
    #[must_use]
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(STATE_FILE)
    }

    /// Loads state from `path`, starting fresh when the file is missing or
    /// unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Writes the state to `path` atomically (`.tmp` sibling + rename).
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the parent directory cannot be created, the
    /// state cannot be encoded, or the file cannot be written or renamed.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let io_err = |source: std::io::Error| StateError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_vec_pretty(self).map_err(|e| StateError::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}
