/// File extension (without the dot) that marks a path component as a zip container
pub const ARCHIVE_EXTENSION: &str = "zip";
/// Separator used by entry names inside an archive, regardless of host platform
pub const ARCHIVE_SEPARATOR: &str = "/";
/// Default filename for the history log
pub const HISTORY_FILENAME: &str = "history.json";
/// Format of the human-readable batch timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
