//! History Store — load/save of the JSON history file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::record::HistoryLog;

/// File-backed store for the evaluation history.
///
/// Whole-file read on load, whole-file overwrite on save. Last writer wins;
/// the log is small enough that rewriting it per evaluation is fine. Callers
/// that run concurrently must serialize the load-mutate-save cycle (the
/// evaluate handler holds a lock across it).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted log. A missing file is an empty history. An
    /// unreadable or malformed file is downgraded to an empty history with a
    /// warning: the log is an advisory aid for the prompt, not a ledger, so
    /// forward progress wins over strict integrity here.
    pub fn load(&self) -> HistoryLog {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return HistoryLog::new(),
            Err(e) => {
                warn!(
                    "Could not read history file {}: {e}. Continuing with an empty history.",
                    self.path.display()
                );
                return HistoryLog::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(log) => log,
            Err(e) => {
                warn!(
                    "History file {} is corrupted or empty: {e}. Continuing with an empty history.",
                    self.path.display()
                );
                HistoryLog::new()
            }
        }
    }

    /// Serializes the full log and overwrites the file in a single write.
    /// Pretty-printed UTF-8 so the file stays hand-inspectable; non-ASCII
    /// text is written verbatim, never escaped.
    pub fn save(&self, log: &HistoryLog) -> Result<()> {
        let serialized =
            serde_json::to_string_pretty(log).context("Failed to serialize history log")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write history file {}", self.path.display()))?;
        Ok(())
    }
}
