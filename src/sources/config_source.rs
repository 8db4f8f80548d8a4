//! Configuration source trait.

use crate::error::Result;
use crate::value::Map;
use std::path::PathBuf;

/// A provider of one configuration tree.
///
/// Implement this trait to feed trees from somewhere the crate does not cover
/// (a database, a key-value store, a secrets manager).
pub trait ConfigSource: Send + Sync {
    /// Load this source's tree.
    ///
    /// The returned tree is deep-merged with other sources according to
    /// priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load(&self) -> Result<Map>;

    /// A human-readable name for logging.
    fn name(&self) -> String;

    /// Priority of this source; higher values override lower ones.
    ///
    /// Conventional priorities:
    /// - Defaults: 0
    /// - Files: 100, 110, 120... in the order they were added
    /// - HTTP: 250
    /// - Environment variables: 300
    fn priority(&self) -> i32 {
        100
    }

    /// Filesystem paths whose modification should trigger a reload.
    fn watch_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}
