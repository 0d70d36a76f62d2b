use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::copy::error::ExecutionError;
use crate::copy::plan::PlannedOperation;
use crate::copy::source::ResolvedSource;
use crate::history::CompletedOperation;

/// Carry out a planned operation.
///
/// - Plain file: copied over the destination
/// - Archive entry: decompressed over the destination
///
/// In preview mode nothing is touched and the would-be result is returned.
/// The returned operation is only meaningful for history when `preview` is
/// false.
///
/// A failed write never leaves a partial destination behind.
pub fn execute(
    op: &PlannedOperation,
    preview: bool,
) -> Result<CompletedOperation, ExecutionError> {
    if !preview {
        match &op.source {
            ResolvedSource::PlainFile { path } => copy_file(path, &op.destination)?,
            ResolvedSource::ArchiveEntry { container, entry } => {
                extract_entry(container, entry, &op.destination)?
            }
        }
    }

    Ok(CompletedOperation {
        source: op.raw_source.clone(),
        destination: op.destination.to_string_lossy().into_owned(),
    })
}

/// A destination that existed before the copy is left in place on failure.
fn copy_file(from: &Path, to: &Path) -> Result<(), ExecutionError> {
    let existed = to.exists();
    match fs::copy(from, to) {
        Ok(bytes) => {
            debug!(from = %from.display(), to = %to.display(), bytes, "copied file");
            Ok(())
        }
        Err(reason) => {
            if !existed {
                discard_partial(to);
            }
            Err(ExecutionError::Copy {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                reason,
            })
        }
    }
}

/// The archive handle is dropped on every return path, closing the container.
fn extract_entry(container: &Path, entry: &str, to: &Path) -> Result<(), ExecutionError> {
    let open_failed = |reason: String| ExecutionError::ArchiveOpen {
        archive: container.to_path_buf(),
        reason,
    };

    let file = File::open(container).map_err(|e| open_failed(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| open_failed(e.to_string()))?;

    let mut zipped = match archive.by_name(entry) {
        Ok(zipped) => zipped,
        Err(ZipError::FileNotFound) => {
            return Err(ExecutionError::EntryVanished {
                archive: container.to_path_buf(),
                entry: entry.to_string(),
            });
        }
        Err(e) => return Err(open_failed(e.to_string())),
    };

    let extract_failed = |reason: String| ExecutionError::Extract {
        archive: container.to_path_buf(),
        entry: entry.to_string(),
        to: to.to_path_buf(),
        reason,
    };

    let mut out = File::create(to).map_err(|e| extract_failed(e.to_string()))?;
    match io::copy(&mut zipped, &mut out) {
        Ok(bytes) => {
            debug!(
                archive = %container.display(),
                entry,
                to = %to.display(),
                bytes,
                "extracted entry"
            );
            Ok(())
        }
        Err(e) => {
            drop(out);
            discard_partial(to);
            Err(extract_failed(e.to_string()))
        }
    }
}

/// Remove a half-written destination.
fn discard_partial(to: &Path) {
    match fs::remove_file(to) {
        Ok(()) => debug!(path = %to.display(), "removed partial output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %to.display(), error = %e, "failed to remove partial output"),
    }
}
