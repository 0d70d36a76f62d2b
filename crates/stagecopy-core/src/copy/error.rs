use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A raw source string that names neither a file nor an archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No regular file and no enclosing archive containing the entry
    #[error("source not found: '{path}'")]
    NotFound { path: String },
}

/// Error raised while copying or extracting a planned operation.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Plain file copy failed (permissions, I/O, source vanished)
    #[error("failed to copy '{}' to '{}': {reason}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        reason: io::Error,
    },
    /// Container could not be opened or read as a zip archive
    #[error("failed to open archive '{}': {reason}", .archive.display())]
    ArchiveOpen { archive: PathBuf, reason: String },
    /// Entry resolved earlier is no longer present in the container
    #[error("entry '{entry}' vanished from archive '{}'", .archive.display())]
    EntryVanished { archive: PathBuf, entry: String },
    /// Entry found but decompressing it to the destination failed
    #[error("failed to extract '{entry}' from '{}' to '{}': {reason}", .archive.display(), .to.display())]
    Extract {
        archive: PathBuf,
        entry: String,
        to: PathBuf,
        reason: String,
    },
}

/// Why a manifest record was skipped without being executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Source field blank or missing
    #[error("source is empty")]
    MissingSource,
    /// Destination directory field blank or missing
    #[error("destination directory is empty")]
    MissingDestination,
    /// Preferred name is not a single file name
    #[error("invalid file name '{name}': expected a single file name")]
    InvalidName { name: String },
    /// Destination directory did not exist and could not be created
    #[error("cannot create directory '{}': {reason}", .dir.display())]
    DirectoryCreation { dir: PathBuf, reason: String },
    /// Source resolved to nothing
    #[error(transparent)]
    SourceNotFound(#[from] ResolveError),
}
