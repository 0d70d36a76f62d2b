//! The append-only history log.
//!
//! The log is one JSON array of batches, rewritten in full on every change.
//! Only the last batch can ever be removed. Nothing is cached between calls:
//! each operation loads the file, mutates, and persists.
//!
//! Concurrent invocations against the same log are not supported; the
//! read-modify-write cycle takes no lock.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::copy::TIMESTAMP_FORMAT;
use crate::history::HistoryError;

/// A copy or extraction that actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedOperation {
    /// Source exactly as written in the manifest
    pub source: String,
    /// Final destination path
    pub destination: String,
}

/// All successful operations of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub timestamp: String,
    #[serde(default)]
    pub operations: Vec<CompletedOperation>,
}

/// Shapes accepted when reading the log. A lone batch object is read as a
/// one-element history.
#[derive(Deserialize)]
#[serde(untagged)]
enum LogContents {
    Batches(Vec<Batch>),
    Single(Batch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded batch, oldest first.
    ///
    /// A missing, empty or unparseable log reads as no batches.
    pub fn load(&self) -> Result<Vec<Batch>, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "history log is not text; treating as empty"
                );
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<LogContents>(&content) {
            Ok(LogContents::Batches(batches)) => Ok(batches),
            Ok(LogContents::Single(batch)) => Ok(vec![batch]),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "history log is malformed; treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Record `operations` as a new batch.
    ///
    /// Returns the new batch, or `None` without touching the log when there
    /// is nothing to record.
    pub fn append(
        &self,
        operations: Vec<CompletedOperation>,
    ) -> Result<Option<Batch>, HistoryError> {
        if operations.is_empty() {
            return Ok(None);
        }

        let mut batches = self.load()?;
        let batch = Batch {
            id: next_id(&batches)?,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            operations,
        };
        batches.push(batch.clone());
        self.save(&batches)?;

        Ok(Some(batch))
    }

    /// Remove and return the most recent batch, persisting the shorter log
    /// immediately. `None` means there was nothing to remove.
    pub fn pop_last(&self) -> Result<Option<Batch>, HistoryError> {
        let mut batches = self.load()?;
        let Some(batch) = batches.pop() else {
            return Ok(None);
        };
        self.save(&batches)?;
        info!(batch_id = batch.id, remaining = batches.len(), "removed last batch from history");

        Ok(Some(batch))
    }

    /// Replace the log with `batches`, via a temporary file in the same
    /// directory so a crash never leaves a half-written log.
    fn save(&self, batches: &[Batch]) -> Result<(), HistoryError> {
        let content = serde_json::to_string_pretty(batches)?;
        let write_failed = |source: io::Error| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_failed)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
        tmp.write_all(content.as_bytes()).map_err(write_failed)?;
        tmp.persist(&self.path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }
}

/// Nanosecond timestamp, bumped past the newest recorded id if the clock
/// hasn't moved on. Fails once the newest id is `i64::MAX`.
fn next_id(batches: &[Batch]) -> Result<i64, HistoryError> {
    let now = Utc::now();
    let id = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros());
    match batches.iter().map(|b| b.id).max() {
        Some(newest) if newest >= id => newest
            .checked_add(1)
            .ok_or(HistoryError::IdsExhausted { newest }),
        _ => Ok(id),
    }
}
