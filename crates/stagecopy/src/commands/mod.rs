pub mod history;
pub mod run;
pub mod undo;

use stagecopy_core::history::HistoryError;
use stagecopy_core::utils::manifest::ManifestError;
use thiserror::Error;

/// Failure that ends a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    History(#[from] HistoryError),
}
