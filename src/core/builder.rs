//! Builder for constructing TierConfig instances.

use crate::core::config_handle::Validator;
use crate::core::loader::load_off_worker;
use crate::core::{ConfigLoader, Snapshot, TierConfig};
use crate::error::{ConfigError, Result, ValidationError};
use crate::sources::{ConfigSource, EnvSource, FileSource, MemorySource};
use crate::tree::Resolver;
use crate::value::Map;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "file-watch")]
use std::time::Duration;

#[cfg(feature = "file-watch")]
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Fluent construction of a [`TierConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let config = TierConfig::builder()
///     .with_file("config/default.yaml")
///     .with_file("config/production.yaml")
///     .with_env_overrides("APP", "__")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct TierConfigBuilder {
    file_paths: Vec<PathBuf>,
    env: Option<(String, String)>,
    defaults: Option<Map>,
    custom_sources: Vec<Box<dyn ConfigSource>>,
    separator: Option<String>,
    validator: Option<Validator>,
    #[cfg(feature = "file-watch")]
    watch: bool,
    #[cfg(feature = "file-watch")]
    debounce: Duration,
}

impl TierConfigBuilder {
    /// Create a builder with no sources.
    pub fn new() -> Self {
        Self {
            file_paths: Vec::new(),
            env: None,
            defaults: None,
            custom_sources: Vec::new(),
            separator: None,
            validator: None,
            #[cfg(feature = "file-watch")]
            watch: false,
            #[cfg(feature = "file-watch")]
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Add a file source; the format comes from the extension.
    ///
    /// Files get priorities 100, 110, 120... in the order they are added, so
    /// later files override earlier ones.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add environment variables `<prefix>_<path>`, with `separator` splitting
    /// nested keys. They take priority 300.
    ///
    /// ```rust,no_run
    /// use tierconf::prelude::*;
    ///
    /// // APP_SERVER__PORT=8080 -> server.port = 8080
    /// TierConfig::builder().with_env_overrides("APP", "__");
    /// ```
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env = Some((prefix.to_string(), separator.to_string()));
        self
    }

    /// Baseline values under every other source (priority 0).
    pub fn with_defaults(mut self, defaults: Map) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Add any other source at its own priority.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Separator between key tiers. Defaults to `.`.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Check every candidate snapshot, at build time and on each reload or
    /// update. A rejected snapshot is never published.
    ///
    /// ```rust,no_run
    /// use tierconf::prelude::*;
    ///
    /// # async fn example() -> Result<()> {
    /// let config = TierConfig::builder()
    ///     .with_file("config.yaml")
    ///     .with_validation(|snapshot: &Snapshot| {
    ///         match snapshot.get_as::<u16>("server.port") {
    ///             Ok(Some(port)) if port >= 1024 => Ok(()),
    ///             _ => Err(ValidationError::invalid_field("server.port", "must be >= 1024")),
    ///         }
    ///     })
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Snapshot) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Reload automatically when a source file changes.
    #[cfg(feature = "file-watch")]
    pub fn with_file_watch(mut self, enabled: bool) -> Self {
        self.watch = enabled;
        self
    }

    /// Quiet period after a file change before reloading. Defaults to 500ms.
    #[cfg(feature = "file-watch")]
    pub fn with_watch_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    fn into_loader(self) -> (ConfigLoader, Resolver, Option<Validator>) {
        let mut loader = ConfigLoader::new();

        if let Some(defaults) = self.defaults {
            loader.add_source(Box::new(
                MemorySource::from_tree("defaults", defaults).with_priority(0),
            ));
        }

        for (index, path) in self.file_paths.into_iter().enumerate() {
            let priority = 100 + (index as i32 * 10);
            loader.add_source(Box::new(FileSource::new(path).with_priority(priority)));
        }

        for source in self.custom_sources {
            loader.add_source(source);
        }

        if let Some((prefix, separator)) = self.env {
            loader.add_source(Box::new(EnvSource::new(prefix, separator)));
        }

        let resolver = self.separator.map(Resolver::new).unwrap_or_default();
        (loader, resolver, self.validator)
    }

    /// Load every source, validate, and return the handle.
    ///
    /// With file watching enabled this spawns the reload task, so it must
    /// run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load or validation fails, or a
    /// watched file cannot be watched.
    pub async fn build(self) -> Result<TierConfig> {
        #[cfg(feature = "file-watch")]
        let (watch, debounce) = (self.watch, self.debounce);

        let (loader, resolver, validator) = self.into_loader();
        let loader = Arc::new(loader);
        let tree = load_off_worker(Arc::clone(&loader)).await?;
        let initial = Snapshot::with_resolver(tree, resolver);

        if let Some(validator) = &validator {
            validator(&initial).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        info!(
            sources = ?loader.source_names(),
            keys = initial.keys().len(),
            "configuration loaded"
        );

        #[cfg(feature = "file-watch")]
        let watch_paths = loader.watch_paths();

        let config = TierConfig::from_parts(initial, Some(loader), validator);

        #[cfg(feature = "file-watch")]
        if watch {
            return spawn_watch(config, watch_paths, debounce);
        }

        Ok(config)
    }
}

/// Watch `paths` and reload `config` on every debounced change.
///
/// The task keeps a handle without the watcher, so dropping the last
/// user-facing handle stops the watcher and then the task.
#[cfg(feature = "file-watch")]
fn spawn_watch(config: TierConfig, paths: Vec<PathBuf>, debounce: Duration) -> Result<TierConfig> {
    use crate::notify::ConfigWatcher;
    use tracing::warn;

    let (watcher, mut signals) = ConfigWatcher::new(debounce)?;
    for path in &paths {
        watcher.watch(path)?;
    }

    let reloader = config.clone();
    tokio::spawn(async move {
        while signals.recv().await.is_some() {
            if let Err(err) = reloader.reload().await {
                warn!(error = %err, "reload failed, keeping previous configuration");
            }
        }
    });

    Ok(config.with_watcher(Arc::new(watcher)))
}

impl Default for TierConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TierConfig {
    /// Create a new builder.
    pub fn builder() -> TierConfigBuilder {
        TierConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_builder_accumulates_files() {
        let builder = TierConfigBuilder::new()
            .with_file("config1.yaml")
            .with_file("config2.yaml")
            .with_file("config3.yaml");

        assert_eq!(builder.file_paths.len(), 3);
    }

    #[test]
    fn test_builder_env_overrides() {
        let builder = TierConfigBuilder::new().with_env_overrides("APP", "__");
        assert_eq!(builder.env, Some(("APP".to_string(), "__".to_string())));
    }

    #[test]
    fn test_loader_priorities() {
        let (loader, resolver, _) = TierConfigBuilder::new()
            .with_file("b.yaml")
            .with_file("a.yaml")
            .with_env_overrides("APP", "__")
            .with_defaults(Map::new())
            .with_separator("/")
            .into_loader();

        assert_eq!(
            loader.source_names(),
            vec!["memory:defaults", "file:b.yaml", "file:a.yaml", "env:APP*"]
        );
        assert_eq!(resolver.separator(), "/");
    }

    #[tokio::test]
    async fn test_build_from_defaults_and_override() {
        let mut defaults = Map::new();
        defaults.insert("port".into(), Value::Int(80));
        defaults.insert("host".into(), Value::from("localhost"));

        let config = TierConfigBuilder::new()
            .with_defaults(defaults)
            .with_source(MemorySource::new("override").with_value("port", "8080"))
            .build()
            .await
            .unwrap();

        assert_eq!(config.get_as::<u16>("port").unwrap(), Some(8080));
        assert_eq!(config.get_as::<String>("host").unwrap().as_deref(), Some("localhost"));
    }

    #[tokio::test]
    async fn test_validation_rejects_initial_load() {
        let result = TierConfigBuilder::new()
            .with_source(MemorySource::new("m").with_value("port", 80))
            .with_validation(|snapshot: &Snapshot| match snapshot.get_as::<u16>("port") {
                Ok(Some(port)) if port >= 1024 => Ok(()),
                _ => Err(ValidationError::invalid_field("port", "must be >= 1024")),
            })
            .build()
            .await;

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_build_without_sources_fails() {
        assert!(matches!(
            TierConfigBuilder::new().build().await,
            Err(ConfigError::LoadError(_))
        ));
    }
}
