mod constants;
mod error;
pub mod events;
pub mod execute;
pub mod names;
pub mod plan;
pub mod runner;
pub mod source;

// Re-export public items
pub use constants::{ARCHIVE_EXTENSION, ARCHIVE_SEPARATOR, HISTORY_FILENAME, TIMESTAMP_FORMAT};
pub use error::{ExecutionError, ResolveError, SkipReason};
pub use events::{RunEvent, RunSummary};
pub use execute::execute;
pub use names::allocate;
pub use plan::{plan, ManifestRecord, PlannedOperation};
pub use runner::{run, RunOptions};
pub use source::{resolve, ArchiveLookup, ResolvedSource};
