//! Reversal of the most recent batch.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::warn;

use crate::history::{HistoryError, HistoryStore};

/// Progress reported while undoing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoEvent {
    /// History is empty (or unreadable); nothing was touched
    NothingToUndo,
    /// The batch being reverted, already removed from history
    BatchPopped {
        batch_id: i64,
        timestamp: String,
        operations: usize,
    },
    Removed {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// Destination no longer exists; nothing to delete
    AlreadyGone {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    RemoveFailed {
        index: usize,
        total: usize,
        path: PathBuf,
        reason: String,
    },
}

/// Totals for an undo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoSummary {
    /// Batch that was reverted; `None` if there was nothing to undo
    pub batch_id: Option<i64>,
    pub removed: usize,
    pub already_gone: usize,
    pub failed: usize,
}

/// Delete every file written by the most recent batch.
///
/// The batch leaves history before any file is touched. Deletion is best
/// effort: a file that can't be removed is reported and the rest continue.
pub fn undo_last<F>(store: &HistoryStore, mut on_event: F) -> Result<UndoSummary, HistoryError>
where
    F: FnMut(UndoEvent),
{
    let Some(batch) = store.pop_last()? else {
        on_event(UndoEvent::NothingToUndo);
        return Ok(UndoSummary::default());
    };

    let total = batch.operations.len();
    let mut summary = UndoSummary {
        batch_id: Some(batch.id),
        ..UndoSummary::default()
    };
    on_event(UndoEvent::BatchPopped {
        batch_id: batch.id,
        timestamp: batch.timestamp.clone(),
        operations: total,
    });

    for (index, op) in batch.operations.iter().enumerate() {
        let path = PathBuf::from(&op.destination);

        match fs::symlink_metadata(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                summary.already_gone += 1;
                on_event(UndoEvent::AlreadyGone { index, total, path });
                continue;
            }
            _ => {}
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                summary.removed += 1;
                on_event(UndoEvent::Removed { index, total, path });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove file during undo");
                summary.failed += 1;
                on_event(UndoEvent::RemoveFailed {
                    index,
                    total,
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}
