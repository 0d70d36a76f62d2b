use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::copy::error::SkipReason;
use crate::copy::events::{RecordOutcome, RunEvent, RunSummary};
use crate::copy::execute::execute;
use crate::copy::plan::{plan, ManifestRecord, PlannedOperation};
use crate::copy::source::{resolve, ArchiveLookup, ResolvedSource};
use crate::history::{HistoryError, HistoryStore};

/// Settings for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Resolve and plan everything, change nothing
    pub preview: bool,
    pub archive_lookup: ArchiveLookup,
}

/// Process manifest records in order and record the successes as one batch.
///
/// Per-record problems are reported through `on_event` and never stop the
/// run. Only a failure to write the history log is returned as an error.
///
/// Every planned destination is reserved for the rest of the run, including
/// destinations whose copy failed, so two records never share a target.
pub fn run<F>(
    records: &[ManifestRecord],
    options: &RunOptions,
    store: &HistoryStore,
    mut on_event: F,
) -> Result<RunSummary, HistoryError>
where
    F: FnMut(RunEvent),
{
    let total = records.len();
    let mut summary = RunSummary::default();
    let mut occupied: HashSet<PathBuf> = HashSet::new();
    let mut completed = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let mut emit = |outcome: RecordOutcome| {
            on_event(RunEvent::Record {
                index,
                total,
                outcome,
            })
        };

        let op = match prepare(record, options, &occupied, &mut emit) {
            Ok(op) => op,
            Err(reason) => {
                warn!(index, source = %record.raw_source, %reason, "skipping record");
                summary.skipped += 1;
                emit(RecordOutcome::Skipped {
                    raw_source: record.raw_source.clone(),
                    reason,
                });
                continue;
            }
        };
        occupied.insert(op.destination.clone());

        match execute(&op, options.preview) {
            Ok(done) => {
                if options.preview {
                    summary.previewed += 1;
                } else {
                    match op.source {
                        ResolvedSource::PlainFile { .. } => summary.copied += 1,
                        ResolvedSource::ArchiveEntry { .. } => summary.extracted += 1,
                    }
                    completed.push(done);
                }
                emit(success_outcome(op, options.preview));
            }
            Err(error) => {
                warn!(index, source = %record.raw_source, %error, "operation failed");
                summary.failed += 1;
                emit(RecordOutcome::Failed {
                    raw_source: record.raw_source.clone(),
                    destination: op.destination,
                    error,
                });
            }
        }
    }

    if !options.preview {
        if let Some(batch) = store.append(completed)? {
            info!(
                batch_id = batch.id,
                operations = batch.operations.len(),
                "batch recorded"
            );
            summary.batch_id = Some(batch.id);
            on_event(RunEvent::BatchRecorded {
                batch_id: batch.id,
                operations: batch.operations.len(),
            });
        }
    }

    Ok(summary)
}

/// Validate, resolve and plan a record, creating its destination directory
/// when not previewing.
fn prepare<F>(
    record: &ManifestRecord,
    options: &RunOptions,
    occupied: &HashSet<PathBuf>,
    emit: &mut F,
) -> Result<PlannedOperation, SkipReason>
where
    F: FnMut(RecordOutcome),
{
    let raw_source = record.raw_source.trim();
    if raw_source.is_empty() {
        return Err(SkipReason::MissingSource);
    }
    let dir = record.destination_dir.trim();
    if dir.is_empty() {
        return Err(SkipReason::MissingDestination);
    }
    record.preferred_name()?;

    let source = resolve(raw_source, options.archive_lookup)?;
    ensure_directory(Path::new(dir), options.preview, emit)?;

    let op = plan(record, source, occupied);
    debug!(source = %op.raw_source, destination = %op.destination.display(), "planned");
    Ok(op)
}

fn ensure_directory<F>(dir: &Path, preview: bool, emit: &mut F) -> Result<(), SkipReason>
where
    F: FnMut(RecordOutcome),
{
    if dir.is_dir() {
        return Ok(());
    }
    if preview {
        emit(RecordOutcome::WouldCreateDirectory {
            dir: dir.to_path_buf(),
        });
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| SkipReason::DirectoryCreation {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    emit(RecordOutcome::DirectoryCreated {
        dir: dir.to_path_buf(),
    });
    Ok(())
}

fn success_outcome(op: PlannedOperation, preview: bool) -> RecordOutcome {
    let to = op.destination;
    match (op.source, preview) {
        (ResolvedSource::PlainFile { path }, true) => RecordOutcome::WouldCopy { from: path, to },
        (ResolvedSource::PlainFile { path }, false) => RecordOutcome::Copied { from: path, to },
        (ResolvedSource::ArchiveEntry { container, entry }, true) => RecordOutcome::WouldExtract {
            archive: container,
            entry,
            to,
        },
        (ResolvedSource::ArchiveEntry { container, entry }, false) => RecordOutcome::Extracted {
            archive: container,
            entry,
            to,
        },
    }
}
