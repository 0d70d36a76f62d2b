//! Classification of raw manifest sources.
//!
//! A source is either a regular file, or a path that runs *through* a zip
//! archive: `dir/bundle.zip/inner/file.txt` names the entry `inner/file.txt`
//! inside `dir/bundle.zip`.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::copy::constants::{ARCHIVE_EXTENSION, ARCHIVE_SEPARATOR};
use crate::copy::error::ResolveError;

/// How entry names are matched inside an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveLookup {
    /// Byte-for-byte match of the entry name
    #[default]
    Exact,
    /// Case-insensitive match; the archive's own spelling is kept
    CaseInsensitive,
}

/// Where the bytes of a manifest record come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    PlainFile {
        path: PathBuf,
    },
    ArchiveEntry {
        container: PathBuf,
        entry: String,
    },
}

impl ResolvedSource {
    /// Final component of the source: the file name, or the text after the
    /// last `/` of an entry path.
    pub fn file_name(&self) -> String {
        match self {
            ResolvedSource::PlainFile { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ResolvedSource::ArchiveEntry { entry, .. } => entry
                .rsplit(ARCHIVE_SEPARATOR)
                .next()
                .unwrap_or(entry)
                .to_string(),
        }
    }
}

/// Resolve a raw source string to a file or archive entry.
///
/// Walks upward from `raw` one component at a time. Each stripped component
/// is prepended to the candidate entry path; each ancestor that is a `.zip`
/// file is opened and searched for that entry. Archives that fail to open are
/// passed over.
pub fn resolve(raw: &str, lookup: ArchiveLookup) -> Result<ResolvedSource, ResolveError> {
    let path = Path::new(raw);
    if path.is_file() {
        return Ok(ResolvedSource::PlainFile {
            path: path.to_path_buf(),
        });
    }

    let mut inner: Vec<String> = Vec::new();
    let mut current = path;
    while let (Some(parent), Some(name)) = (current.parent(), current.file_name()) {
        inner.push(name.to_string_lossy().into_owned());
        current = parent;

        if !is_archive(current) {
            continue;
        }

        let entry = inner
            .iter()
            .rev()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(ARCHIVE_SEPARATOR);

        if let Some(found) = find_entry(current, &entry, lookup) {
            debug!(container = %current.display(), entry = %found, "resolved archive entry");
            return Ok(ResolvedSource::ArchiveEntry {
                container: current.to_path_buf(),
                entry: found,
            });
        }
    }

    Err(ResolveError::NotFound {
        path: raw.to_string(),
    })
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        && path.is_file()
}

/// Look up `entry` in the archive at `container`, returning the name as
/// stored in the archive. Any failure to open or read counts as no match.
fn find_entry(container: &Path, entry: &str, lookup: ArchiveLookup) -> Option<String> {
    let file = File::open(container).ok()?;
    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            debug!(container = %container.display(), error = %e, "not a readable archive");
            return None;
        }
    };

    match lookup {
        ArchiveLookup::Exact => {
            let is_file = archive.by_name(entry).ok().is_some_and(|f| !f.is_dir());
            is_file.then(|| entry.to_string())
        }
        ArchiveLookup::CaseInsensitive => {
            let wanted = entry.to_lowercase();
            archive
                .file_names()
                .find(|name| !name.ends_with(ARCHIVE_SEPARATOR) && name.to_lowercase() == wanted)
                .map(str::to_string)
        }
    }
}
