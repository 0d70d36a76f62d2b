//! Reading manifest files.
//!
//! A manifest is delimited text, one copy instruction per row:
//! `source, destination directory[, new name]`. Blank lines and lines
//! starting with `#` are ignored, as is a header row whose first field is
//! `source`. Fields may be double-quoted, with `""` for a literal quote.
//! Quoted fields cannot span lines.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::copy::ManifestRecord;

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

const HEADER_FIELD: &str = "source";
const COMMENT_PREFIX: char = '#';
const BOM: char = '\u{feff}';

/// The manifest could not be read at all.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file does not exist
    #[error("manifest not found: '{}'", .0.display())]
    NotFound(PathBuf),
    /// Manifest exists but could not be read
    #[error("failed to read manifest '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub records: Vec<ManifestRecord>,
}

impl Manifest {
    pub fn load(path: &Path, delimiter: char) -> Result<Manifest, ManifestError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ManifestError::NotFound(path.to_path_buf()),
            _ => ManifestError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Ok(Manifest::parse(&content, delimiter))
    }

    pub fn parse(content: &str, delimiter: char) -> Manifest {
        let content = content.strip_prefix(BOM).unwrap_or(content);
        let mut records = Vec::new();
        let mut first_row = true;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let fields = split_fields(line, delimiter);
            if first_row {
                first_row = false;
                if fields[0].eq_ignore_ascii_case(HEADER_FIELD) {
                    continue;
                }
            }

            let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");
            let name = field(2);
            records.push(ManifestRecord::new(
                field(0),
                field(1),
                (!name.is_empty()).then_some(name),
            ));
        }

        Manifest { records }
    }
}

/// Split one row into trimmed fields. Always returns at least one field.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
