//! Structured progress reported by the batch runner.
//!
//! The engine never prints; callers render these however they like.

use std::path::PathBuf;

use crate::copy::error::{ExecutionError, SkipReason};

/// Event emitted while a batch runs.
#[derive(Debug)]
pub enum RunEvent {
    /// Something happened to the manifest record at `index` (0-based)
    Record {
        index: usize,
        total: usize,
        outcome: RecordOutcome,
    },
    /// The run's successful operations were appended to history
    BatchRecorded { batch_id: i64, operations: usize },
}

/// What happened to a single manifest record.
#[derive(Debug)]
pub enum RecordOutcome {
    Skipped {
        raw_source: String,
        reason: SkipReason,
    },
    WouldCreateDirectory {
        dir: PathBuf,
    },
    DirectoryCreated {
        dir: PathBuf,
    },
    WouldCopy {
        from: PathBuf,
        to: PathBuf,
    },
    WouldExtract {
        archive: PathBuf,
        entry: String,
        to: PathBuf,
    },
    Copied {
        from: PathBuf,
        to: PathBuf,
    },
    Extracted {
        archive: PathBuf,
        entry: String,
        to: PathBuf,
    },
    Failed {
        raw_source: String,
        destination: PathBuf,
        error: ExecutionError,
    },
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub copied: usize,
    pub extracted: usize,
    /// Operations that would have run (preview only)
    pub previewed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Id of the batch written to history, if any
    pub batch_id: Option<i64>,
}

impl RunSummary {
    /// Operations that actually changed the filesystem.
    pub fn completed(&self) -> usize {
        self.copied + self.extracted
    }
}
