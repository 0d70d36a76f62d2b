use stagecopy_core::history::{Batch, HistoryStore};

use crate::commands::CommandError;

/// Print recorded batches, oldest first. Read-only.
pub fn run(store: &HistoryStore) -> Result<Vec<Batch>, CommandError> {
    let batches = store.load()?;

    if batches.is_empty() {
        println!("No batches recorded in {}", store.path().display());
        return Ok(batches);
    }

    println!("History: {}", store.path().display());
    let last = batches.len() - 1;
    for (index, batch) in batches.iter().enumerate() {
        let marker = if index == last { " (undoable)" } else { "" };
        println!(
            "  {}  {}  {} operations{}",
            batch.id,
            batch.timestamp,
            batch.operations.len(),
            marker
        );
    }

    Ok(batches)
}
