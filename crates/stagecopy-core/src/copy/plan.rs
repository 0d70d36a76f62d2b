use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::copy::error::SkipReason;
use crate::copy::names::allocate;
use crate::copy::source::ResolvedSource;

/// One manifest row: where to read from, where to put it, and optionally
/// what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestRecord {
    pub raw_source: String,
    pub destination_dir: String,
    pub preferred_name: Option<String>,
}

impl ManifestRecord {
    pub fn new(raw_source: &str, destination_dir: &str, preferred_name: Option<&str>) -> Self {
        ManifestRecord {
            raw_source: raw_source.to_string(),
            destination_dir: destination_dir.to_string(),
            preferred_name: preferred_name.map(|s| s.to_string()),
        }
    }

    /// The trimmed preferred name, `None` when absent or blank.
    ///
    /// A name must be a single file name: anything with a path separator,
    /// `.`, `..` or a root would land outside the destination directory.
    pub fn preferred_name(&self) -> Result<Option<&str>, SkipReason> {
        let name = match self.preferred_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(None),
        };

        let mut components = Path::new(name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || name.contains(['/', '\\']) {
            return Err(SkipReason::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(Some(name))
    }
}

/// A resolved record with its final, collision-free destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    /// Source string exactly as it appeared in the manifest
    pub raw_source: String,
    pub source: ResolvedSource,
    pub destination: PathBuf,
    /// Name asked for before collision handling
    pub base_name: String,
}

/// Turn a record and its resolved source into a planned operation.
///
/// Only checks for existing files; nothing is created or reserved. The
/// caller must add `destination` to `occupied` afterwards. A preferred name
/// that isn't a plain file name falls back to the source's name; callers
/// that want to reject it check [`ManifestRecord::preferred_name`] first.
pub fn plan(
    record: &ManifestRecord,
    source: ResolvedSource,
    occupied: &HashSet<PathBuf>,
) -> PlannedOperation {
    let base_name = match record.preferred_name() {
        Ok(Some(name)) => name.to_string(),
        _ => source.file_name(),
    };

    let dir = Path::new(record.destination_dir.trim());
    let final_name = allocate(dir, &base_name, occupied);

    PlannedOperation {
        raw_source: record.raw_source.clone(),
        source,
        destination: dir.join(final_name),
        base_name,
    }
}
