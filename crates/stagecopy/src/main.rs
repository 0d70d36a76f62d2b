use std::path::PathBuf;
use std::process;

use clap::Parser;
use stagecopy::commands;
use stagecopy::config::{self, HISTORY_ENV};
use stagecopy::logging::init_logging;
use stagecopy_core::copy::{ArchiveLookup, RunOptions};
use stagecopy_core::history::HistoryStore;
use stagecopy_core::utils::manifest::DEFAULT_DELIMITER;
use tracing::debug;

#[derive(Parser)]
#[command(name = "stagecopy")]
#[command(about = "Copy or extract files in bulk from a manifest, with preview and undo")]
#[command(version)]
struct Cli {
    /// Manifest file, one `source,destination_dir[,new_name]` row per copy.
    /// A source may point inside a zip archive: `bundle.zip/dir/file.txt`
    #[arg(required_unless_present_any = ["undo", "list_history"])]
    manifest: Option<PathBuf>,

    /// Show what would be copied without touching files or history
    #[arg(short = 'n', long)]
    preview: bool,

    /// Undo the most recent batch and exit (the manifest is ignored)
    #[arg(long)]
    undo: bool,

    /// List recorded batches and exit
    #[arg(long, conflicts_with = "undo")]
    list_history: bool,

    /// History log file
    #[arg(long, env = HISTORY_ENV)]
    history: Option<PathBuf>,

    /// Field delimiter used in the manifest
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,

    /// Match entry names inside archives case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Error: failed to initialise logging: {}", e);
        process::exit(2);
    }

    let store = HistoryStore::new(config::history_path(cli.history));
    debug!(history = %store.path().display(), "using history log");

    let result = if cli.undo {
        commands::undo::run(&store).map(|_| ())
    } else if cli.list_history {
        commands::history::run(&store).map(|_| ())
    } else {
        let Some(manifest) = cli.manifest else {
            eprintln!("Error: a manifest file is required");
            process::exit(2);
        };
        let options = RunOptions {
            preview: cli.preview,
            archive_lookup: if cli.ignore_case {
                ArchiveLookup::CaseInsensitive
            } else {
                ArchiveLookup::Exact
            },
        };
        commands::run::run(&manifest, cli.delimiter, &options, &store).map(|_| ())
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(2);
    }
}
