//! Where things live when the command line doesn't say.

use std::path::PathBuf;

use stagecopy_core::copy::HISTORY_FILENAME;

/// Environment variable naming the history log
pub const HISTORY_ENV: &str = "STAGECOPY_HISTORY";
/// Log used when the platform has no data directory
const FALLBACK_HISTORY: &str = "stagecopy-history.json";
const APP_DIR: &str = "stagecopy";

/// History log location: the explicit path if given, else
/// `<data dir>/stagecopy/history.json`, else a file in the working directory.
pub fn history_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    match dirs::data_dir() {
        Some(base) => base.join(APP_DIR).join(HISTORY_FILENAME),
        None => PathBuf::from(FALLBACK_HISTORY),
    }
}
