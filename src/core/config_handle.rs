//! The main configuration handle providing lock-free access.

use crate::convert::{FromValue, Unmarshal};
use crate::core::loader::load_off_worker;
use crate::core::{ConfigLoader, Snapshot};
use crate::error::{ConfigError, ConvertError, Result, ValidationError};
use crate::tree::{Getter, Resolver};
use crate::value::{Map, Value};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "file-watch")]
use crate::notify::{ConfigWatcher, SubscriberRegistry};

/// Validator run against every candidate snapshot before it is published.
pub(crate) type Validator =
    Arc<dyn Fn(&Snapshot) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// The main configuration handle: lock-free reads, atomic reloads.
///
/// The handle publishes immutable [`Snapshot`]s through `arc-swap`. Every
/// lookup method loads the current snapshot once, so a single call never
/// observes two versions. Hold on to [`TierConfig::snapshot`] when several
/// reads must agree with each other.
///
/// Clones share the same state.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let config = TierConfig::builder()
///     .with_file("config.yaml")
///     .build()
///     .await?;
///
/// let port: u16 = config.get_or("server.port", 8080);
/// let replicas = config.get_as::<u32>("deploy.replicas")?;
/// println!("port {port}, replicas {replicas:?}");
/// # Ok(())
/// # }
/// ```
pub struct TierConfig {
    current: Arc<ArcSwap<Snapshot>>,
    loader: Option<Arc<ConfigLoader>>,
    validator: Option<Validator>,
    resolver: Resolver,
    #[cfg(feature = "file-watch")]
    watcher: Option<Arc<ConfigWatcher>>,
    #[cfg(feature = "file-watch")]
    subscribers: SubscriberRegistry,
}

impl TierConfig {
    /// A handle over a fixed tree, with no sources behind it.
    ///
    /// [`TierConfig::update`] still works; [`TierConfig::reload`] fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tierconf::prelude::*;
    ///
    /// let mut tree = Map::new();
    /// tree.insert("retries".into(), Value::from("3"));
    ///
    /// let config = TierConfig::new(tree);
    /// assert_eq!(config.get_as::<u8>("retries").unwrap(), Some(3));
    /// ```
    pub fn new(tree: Map) -> Self {
        Self::from_parts(Snapshot::new(tree), None, None)
    }

    pub(crate) fn from_parts(
        initial: Snapshot,
        loader: Option<Arc<ConfigLoader>>,
        validator: Option<Validator>,
    ) -> Self {
        Self {
            resolver: initial.resolver().clone(),
            current: Arc::new(ArcSwap::from_pointee(initial)),
            loader,
            validator,
            #[cfg(feature = "file-watch")]
            watcher: None,
            #[cfg(feature = "file-watch")]
            subscribers: SubscriberRegistry::new(),
        }
    }

    #[cfg(feature = "file-watch")]
    pub(crate) fn with_watcher(mut self, watcher: Arc<ConfigWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// The raw leaf at `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.current.load().get(key)
    }

    /// The leaf at `key` coerced into `T`. Absent keys give `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] when the value exists but cannot become a `T`.
    pub fn get_as<T: FromValue>(&self, key: &str) -> std::result::Result<Option<T>, ConvertError> {
        self.current.load().get_as(key)
    }

    /// The leaf at `key` coerced into `T`, or `default` when it is absent or
    /// does not convert.
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> T {
        match self.get_as(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                debug!(key, error = %err, "using default for unconvertible value");
                default
            }
        }
    }

    /// Whether `key` names a leaf or a mapping.
    pub fn is_set(&self, key: &str) -> bool {
        self.current.load().is_set(key)
    }

    /// Every leaf path, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.current.load().keys()
    }

    /// Populate a `T` from the mapping at `key`.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::unmarshal_key`].
    pub fn unmarshal_key<T: Unmarshal + Default>(
        &self,
        key: &str,
    ) -> std::result::Result<Option<T>, ConvertError> {
        self.current.load().unmarshal_key(key)
    }

    /// Populate a `T` from the whole tree.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::unmarshal`].
    pub fn unmarshal<T: Unmarshal + Default>(&self) -> std::result::Result<T, ConvertError> {
        self.current.load().unmarshal()
    }

    /// Reload every source, validate, and publish the result.
    ///
    /// Inside a tokio runtime the sources are read on the blocking pool. On
    /// any failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle has no sources, a source fails to
    /// load, or validation rejects the new tree.
    pub async fn reload(&self) -> Result<()> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| ConfigError::Other("No loader available for reload".to_string()))?;

        let tree = load_off_worker(Arc::clone(loader)).await?;
        self.publish(tree).await?;
        info!("configuration reloaded");
        Ok(())
    }

    /// Replace the tree directly, bypassing the sources.
    ///
    /// The next [`TierConfig::reload`] rebuilds from the sources again.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub async fn update(&self, tree: Map) -> Result<()> {
        self.publish(tree).await?;
        debug!("configuration updated");
        Ok(())
    }

    async fn publish(&self, tree: Map) -> Result<()> {
        let candidate = Snapshot::with_resolver(tree, self.resolver.clone());

        if let Some(validator) = &self.validator {
            validator(&candidate).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        let published = Arc::new(candidate);
        self.current.store(Arc::clone(&published));

        #[cfg(feature = "file-watch")]
        self.subscribers.notify_all(&published).await;

        Ok(())
    }

    /// Register a callback run with each newly published snapshot. Dropping
    /// the returned handle unsubscribes.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use tierconf::prelude::*;
    /// # async fn example(config: TierConfig) {
    /// let handle = config
    ///     .subscribe(|snapshot: &Snapshot| println!("now {} keys", snapshot.keys().len()))
    ///     .await;
    ///
    /// drop(handle);
    /// # }
    /// ```
    #[cfg(feature = "file-watch")]
    pub async fn subscribe<F>(&self, callback: F) -> crate::notify::SubscriptionHandle
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback).await
    }

    /// Whether source files are being watched for changes.
    #[cfg(feature = "file-watch")]
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Getter for TierConfig {
    fn get(&self, key: &str) -> Option<Value> {
        TierConfig::get(self, key)
    }
}

impl Clone for TierConfig {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            loader: self.loader.clone(),
            validator: self.validator.clone(),
            resolver: self.resolver.clone(),
            #[cfg(feature = "file-watch")]
            watcher: self.watcher.clone(),
            #[cfg(feature = "file-watch")]
            subscribers: self.subscribers.clone(),
        }
    }
}
