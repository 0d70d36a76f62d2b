use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Pick a filename in `dir` that collides neither with the disk nor with
/// paths already claimed in this run.
///
/// `report.pdf` becomes `report_1.pdf`, `report_2.pdf`, ... The counter only
/// moves forward, so a candidate rejected because of `occupied` is never
/// retried. `occupied` is not modified; the caller inserts the returned path.
pub fn allocate(dir: &Path, desired: &str, occupied: &HashSet<PathBuf>) -> String {
    let (stem, extension) = split_name(desired);
    let is_taken = |name: &str| {
        let candidate = dir.join(name);
        occupied.contains(&candidate) || candidate.exists()
    };

    let mut candidate = desired.to_string();
    let mut counter: u64 = 1;
    while is_taken(&candidate) {
        candidate = match extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        counter += 1;
    }
    candidate
}

/// Split at the last dot. A leading dot belongs to the stem, so `.env`
/// has no extension.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(index) if index > 0 && index + 1 < name.len() => {
            (&name[..index], Some(&name[index + 1..]))
        }
        _ => (name, None),
    }
}
