//! Batch copy engine behind `stagecopy`.
//!
//! Manifest records are resolved (plain file or entry inside a zip archive),
//! given a collision-free destination name, then copied or extracted. Every
//! successful run is recorded as one batch in a JSON history log so that the
//! most recent batch can be undone.

pub mod copy;
pub mod history;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
