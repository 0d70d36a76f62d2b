pub mod store;
pub mod undo;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// Re-export public items
pub use store::{Batch, CompletedOperation, HistoryStore};
pub use undo::{undo_last, UndoEvent, UndoSummary};

/// Error reading or writing the history log.
///
/// Unparseable content is not an error; it is logged and read as an empty
/// history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Log exists but could not be read
    #[error("failed to read history log '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    /// Log (or its directory) could not be written
    #[error("failed to write history log '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    /// The newest recorded id is `i64::MAX`; no larger id exists
    #[error("no batch id left after {newest}")]
    IdsExhausted { newest: i64 },
    /// Batches could not be encoded as JSON
    #[error("failed to encode history: {0}")]
    Serialize(#[from] serde_json::Error),
}
