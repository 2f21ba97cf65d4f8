//! Analysis history: one JSONL line per completed action.
//!
//! Every `predict` / `waste` run that reaches the service (success or
//! failure) is appended to `~/.cloudcost/history.jsonl` unless logging is
//! disabled. `cloudcost history` reads it back.
//!
//! Writes are best-effort: a failing log never fails the analysis.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::controller::ActionKind;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single line in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    /// `"predict"` or `"waste"`.
    pub action: String,
    pub file: String,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub latency_ms: u64,
    /// The user-facing error message when the action failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl HistoryEntry {
    pub fn new(action: ActionKind, file: &str, latency_ms: u64, error: Option<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            action: action.as_str().to_string(),
            file: file.to_string(),
            success: error.is_none(),
            latency_ms,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// Log file
// ---------------------------------------------------------------------------

/// Handle to a JSONL history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the log from the `[logging]` section. Returns `None` when
    /// logging is disabled or no home directory exists.
    pub fn from_config(config: &LoggingConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        match config.history_file {
            Some(ref path) => Some(Self::new(path)),
            None => default_history_path().map(Self::new),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry, ignoring I/O failures.
    pub fn append(&self, entry: &HistoryEntry) {
        let _ = self.try_append(entry);
    }

    fn try_append(&self, entry: &HistoryEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry. Malformed lines are skipped; a missing file reads
    /// as empty.
    pub fn read_all(&self) -> Vec<HistoryEntry> {
        let Ok(file) = fs::File::open(&self.path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<HistoryEntry>(&line).ok())
            .collect()
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut entries = self.read_all();
        entries.reverse();
        entries.truncate(limit);
        entries
    }
}

/// `~/.cloudcost/history.jsonl`
pub fn default_history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cloudcost").join("history.jsonl"))
}
