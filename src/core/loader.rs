//! Configuration loader that merges multiple sources.

use crate::error::{ConfigError, Result};
use crate::sources::ConfigSource;
use crate::tree::merge;
use crate::value::Map;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Loads every source and deep-merges the trees.
///
/// Sources are applied from lowest to highest priority. Mappings merge key by
/// key; any other value from a later source replaces the earlier one. Sources
/// with equal priority apply in the order they were added.
pub struct ConfigLoader {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigLoader {
    /// Create a loader with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a configuration source.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    fn ordered(&self) -> Vec<&dyn ConfigSource> {
        let mut sorted: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
        sorted.sort_by_key(|s| s.priority());
        sorted
    }

    /// Load and merge all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadError`] if there are no sources or any
    /// source fails to load.
    pub fn load(&self) -> Result<Map> {
        if self.sources.is_empty() {
            return Err(ConfigError::LoadError(
                "No configuration sources specified".to_string(),
            ));
        }

        let mut merged = Map::new();
        for source in self.ordered() {
            let tree = source.load().map_err(|e| {
                ConfigError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
            })?;
            debug!(
                source = %source.name(),
                priority = source.priority(),
                keys = tree.len(),
                "merging configuration source"
            );
            merge(&mut merged, tree);
        }

        Ok(merged)
    }

    /// Source names in merge order.
    pub fn source_names(&self) -> Vec<String> {
        self.ordered().iter().map(|s| s.name()).collect()
    }

    /// Paths of every source that can be watched.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        self.sources.iter().flat_map(|s| s.watch_paths()).collect()
    }
}

/// Run [`ConfigLoader::load`] on tokio's blocking pool when called inside a
/// runtime, and inline otherwise.
pub(crate) async fn load_off_worker(loader: Arc<ConfigLoader>) -> Result<Map> {
    #[cfg(feature = "tokio")]
    if tokio::runtime::Handle::try_current().is_ok() {
        return tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| ConfigError::Other(format!("Configuration load task failed: {}", e)))?;
    }

    loader.load()
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
