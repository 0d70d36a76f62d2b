use std::path::Path;

use stagecopy_core::copy::events::RecordOutcome;
use stagecopy_core::copy::{self, RunEvent, RunOptions, RunSummary};
use stagecopy_core::history::HistoryStore;
use stagecopy_core::utils::manifest::Manifest;
use tracing::info;

use crate::commands::CommandError;

fn print_event(event: RunEvent, preview: bool) {
    let tag = if preview { "[preview] " } else { "" };
    match event {
        RunEvent::Record {
            index,
            total,
            outcome,
        } => {
            let at = format!("[{}/{}]", index + 1, total);
            match outcome {
                RecordOutcome::Skipped { raw_source, reason } => {
                    eprintln!("Warning: {} skipping '{}': {}", at, raw_source, reason);
                }
                RecordOutcome::WouldCreateDirectory { dir } => {
                    println!("{}{} Would create directory: {}", tag, at, dir.display());
                }
                RecordOutcome::DirectoryCreated { dir } => {
                    println!("{} Created directory: {}", at, dir.display());
                }
                RecordOutcome::WouldCopy { from, to } => {
                    println!("{}{} Would copy: {} -> {}", tag, at, from.display(), to.display());
                }
                RecordOutcome::WouldExtract { archive, entry, to } => {
                    println!(
                        "{}{} Would extract: {}::{} -> {}",
                        tag,
                        at,
                        archive.display(),
                        entry,
                        to.display()
                    );
                }
                RecordOutcome::Copied { from, to } => {
                    println!("{} Copied: {} -> {}", at, from.display(), to.display());
                }
                RecordOutcome::Extracted { archive, entry, to } => {
                    println!(
                        "{} Extracted: {}::{} -> {}",
                        at,
                        archive.display(),
                        entry,
                        to.display()
                    );
                }
                RecordOutcome::Failed { error, .. } => {
                    eprintln!("Error: {} {}", at, error);
                }
            }
        }
        RunEvent::BatchRecorded {
            batch_id,
            operations,
        } => {
            println!("Recorded batch {} ({} operations)", batch_id, operations);
        }
    }
}

fn print_summary(summary: &RunSummary, preview: bool) {
    if preview {
        println!(
            "\nPreview: {} operations planned, {} skipped, {} failed. Nothing was changed.",
            summary.previewed, summary.skipped, summary.failed
        );
    } else {
        println!(
            "\nDone: {} copied, {} extracted, {} skipped, {} failed.",
            summary.copied, summary.extracted, summary.skipped, summary.failed
        );
    }
}

/// Copy everything listed in a manifest.
///
/// Workflow:
/// 1. Load the manifest (a missing manifest aborts before anything runs)
/// 2. Resolve, name and copy/extract each record in order
/// 3. Record the successes as one undoable batch (not in preview)
pub fn run(
    manifest_path: &Path,
    delimiter: char,
    options: &RunOptions,
    store: &HistoryStore,
) -> Result<RunSummary, CommandError> {
    let manifest = Manifest::load(manifest_path, delimiter)?;
    info!(
        manifest = %manifest_path.display(),
        records = manifest.records.len(),
        preview = options.preview,
        "starting run"
    );

    let summary = copy::run(&manifest.records, options, store, |event| {
        print_event(event, options.preview)
    })?;
    print_summary(&summary, options.preview);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::undo;
    use stagecopy_core::copy::ArchiveLookup;
    use stagecopy_core::utils::manifest::{ManifestError, DEFAULT_DELIMITER};
    use std::collections::BTreeMap;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Every file under `dir` with its contents.
    fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            for entry in fs::read_dir(&current).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.insert(path.clone(), fs::read(&path).unwrap());
                }
            }
        }
        files
    }

    fn write_manifest(dir: &Path, rows: &[String]) -> PathBuf {
        let path = dir.join("manifest.csv");
        fs::write(&path, rows.join("\n")).unwrap();
        path
    }

    fn real() -> RunOptions {
        RunOptions::default()
    }

    #[test]
    fn copies_rows_and_records_batch() {
        let work = tempdir().unwrap();
        let src = work.path().join("a.txt");
        fs::write(&src, b"alpha").unwrap();
        let out = work.path().join("out");
        let store = HistoryStore::new(work.path().join("history.json"));
        let manifest = write_manifest(
            work.path(),
            &[format!("{},{},renamed.txt", src.display(), out.display())],
        );

        let summary = run(&manifest, DEFAULT_DELIMITER, &real(), &store).unwrap();

        assert_eq!(summary.copied, 1);
        assert_eq!(fs::read(out.join("renamed.txt")).unwrap(), b"alpha");
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn missing_manifest_aborts() {
        let work = tempdir().unwrap();
        let store = HistoryStore::new(work.path().join("history.json"));

        let result = run(&work.path().join("nope.csv"), DEFAULT_DELIMITER, &real(), &store);

        assert!(matches!(result, Err(CommandError::Manifest(ManifestError::NotFound(_)))));
        assert!(!store.path().exists());
    }

    #[test]
    fn preview_changes_nothing() {
        let work = tempdir().unwrap();
        let src = work.path().join("a.txt");
        fs::write(&src, b"alpha").unwrap();
        let out = work.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("a.txt"), b"already here").unwrap();
        let store = HistoryStore::new(work.path().join("history.json"));

        // Seed history with one real batch so the log exists before preview
        let other = work.path().join("b.txt");
        fs::write(&other, b"beta").unwrap();
        let seed = write_manifest(work.path(), &[format!("{},{}", other.display(), out.display())]);
        run(&seed, DEFAULT_DELIMITER, &real(), &store).unwrap();

        let manifest = write_manifest(
            work.path(),
            &[
                format!("{},{}", src.display(), out.display()),
                format!("{},{}", src.display(), work.path().join("new_dir").display()),
                format!("{},{}", work.path().join("missing.txt").display(), out.display()),
            ],
        );
        let before = snapshot(work.path());

        let options = RunOptions {
            preview: true,
            ..RunOptions::default()
        };
        let summary = run(&manifest, DEFAULT_DELIMITER, &options, &store).unwrap();

        assert_eq!(summary.previewed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(snapshot(work.path()), before);
        assert!(!work.path().join("new_dir").exists());
    }

    #[test]
    fn run_then_undo_round_trip() {
        let work = tempdir().unwrap();
        let out = work.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("keep.txt"), b"untouched").unwrap();
        let store = HistoryStore::new(work.path().join("history.json"));

        let archive = work.path().join("bundle.zip");
        let mut zip = ZipWriter::new(File::create(&archive).unwrap());
        zip.start_file("inner/file.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"zipped").unwrap();
        zip.finish().unwrap();

        let src = work.path().join("a.txt");
        fs::write(&src, b"alpha").unwrap();

        // An earlier batch that must survive the undo
        let earlier =
            write_manifest(work.path(), &[format!("{},{}", src.display(), out.display())]);
        run(&earlier, DEFAULT_DELIMITER, &real(), &store).unwrap();

        let manifest = write_manifest(
            work.path(),
            &[
                format!("{},{}", src.display(), out.display()),
                format!("{}/inner/file.txt,{}", archive.display(), out.display()),
            ],
        );
        let summary = run(&manifest, DEFAULT_DELIMITER, &real(), &store).unwrap();
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.extracted, 1);
        assert!(out.join("a_1.txt").is_file());
        assert!(out.join("file.txt").is_file());

        let undone = undo::run(&store).unwrap();
        assert_eq!(undone.removed, 2);
        assert!(!out.join("a_1.txt").exists());
        assert!(!out.join("file.txt").exists());
        assert!(out.join("a.txt").is_file());
        assert!(out.join("keep.txt").is_file());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn existing_file_pushes_both_rows_to_suffixes() {
        let work = tempdir().unwrap();
        let out = work.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("report.pdf"), b"existing").unwrap();
        for dir in ["q1", "q2"] {
            fs::create_dir(work.path().join(dir)).unwrap();
            fs::write(work.path().join(dir).join("report.pdf"), dir.as_bytes()).unwrap();
        }
        let store = HistoryStore::new(work.path().join("history.json"));

        let manifest = write_manifest(
            work.path(),
            &[
                format!("{},{}", work.path().join("q1/report.pdf").display(), out.display()),
                format!("{},{}", work.path().join("q2/report.pdf").display(), out.display()),
            ],
        );
        run(&manifest, DEFAULT_DELIMITER, &real(), &store).unwrap();

        assert_eq!(fs::read(out.join("report.pdf")).unwrap(), b"existing");
        assert_eq!(fs::read(out.join("report_1.pdf")).unwrap(), b"q1");
        assert_eq!(fs::read(out.join("report_2.pdf")).unwrap(), b"q2");

        let batch = &store.load().unwrap()[0];
        let destinations: Vec<_> = batch.operations.iter().map(|o| o.destination.clone()).collect();
        assert_eq!(
            destinations,
            [
                out.join("report_1.pdf").to_string_lossy().into_owned(),
                out.join("report_2.pdf").to_string_lossy().into_owned(),
            ]
        );
    }

    #[test]
    fn malformed_log_recovers_on_next_run() {
        let work = tempdir().unwrap();
        let log = work.path().join("history.json");
        fs::write(&log, "[{\"id\": 3, \"operations\": [").unwrap();
        let store = HistoryStore::new(&log);

        let undone = undo::run(&store).unwrap();
        assert_eq!(undone.batch_id, None);

        let src = work.path().join("a.txt");
        fs::write(&src, b"alpha").unwrap();
        let manifest = write_manifest(
            work.path(),
            &[format!("{},{}", src.display(), work.path().join("out").display())],
        );
        run(&manifest, DEFAULT_DELIMITER, &real(), &store).unwrap();

        let batches = store.load().unwrap();
        assert_eq!(batches.len(), 1);
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&log).unwrap()).unwrap();
        assert!(parsed.is_array());
    }

    #[test]
    fn case_insensitive_lookup_is_opt_in() {
        let work = tempdir().unwrap();
        let archive = work.path().join("bundle.zip");
        let mut zip = ZipWriter::new(File::create(&archive).unwrap());
        zip.start_file("Docs/Guide.md", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"guide").unwrap();
        zip.finish().unwrap();
        let out = work.path().join("out");
        let store = HistoryStore::new(work.path().join("history.json"));
        let manifest = write_manifest(
            work.path(),
            &[format!("{}/docs/guide.md,{}", archive.display(), out.display())],
        );

        let exact = run(&manifest, DEFAULT_DELIMITER, &real(), &store).unwrap();
        assert_eq!(exact.skipped, 1);

        let options = RunOptions {
            archive_lookup: ArchiveLookup::CaseInsensitive,
            ..RunOptions::default()
        };
        let relaxed = run(&manifest, DEFAULT_DELIMITER, &options, &store).unwrap();
        assert_eq!(relaxed.extracted, 1);
        assert_eq!(fs::read(out.join("Guide.md")).unwrap(), b"guide");
    }
}
