use stagecopy_core::history::{self, HistoryStore, UndoEvent, UndoSummary};

use crate::commands::CommandError;

fn print_event(event: UndoEvent) {
    match event {
        UndoEvent::NothingToUndo => println!("Nothing to undo"),
        UndoEvent::BatchPopped {
            batch_id,
            timestamp,
            operations,
        } => {
            println!(
                "Undoing batch {} from {} ({} operations)",
                batch_id, timestamp, operations
            );
        }
        UndoEvent::Removed { index, total, path } => {
            println!("[{}/{}] Removed: {}", index + 1, total, path.display());
        }
        UndoEvent::AlreadyGone { index, total, path } => {
            eprintln!(
                "Warning: [{}/{}] already gone: {}",
                index + 1,
                total,
                path.display()
            );
        }
        UndoEvent::RemoveFailed {
            index,
            total,
            path,
            reason,
        } => {
            eprintln!(
                "Error: [{}/{}] could not remove {}: {}",
                index + 1,
                total,
                path.display(),
                reason
            );
        }
    }
}

/// Undo the most recent batch by deleting the files it wrote.
///
/// The batch is dropped from history even if some files can't be removed.
pub fn run(store: &HistoryStore) -> Result<UndoSummary, CommandError> {
    let summary = history::undo_last(store, print_event)?;

    if summary.batch_id.is_some() {
        println!(
            "\nUndo complete: {} removed, {} already gone, {} failed.",
            summary.removed, summary.already_gone, summary.failed
        );
    }

    Ok(summary)
}
