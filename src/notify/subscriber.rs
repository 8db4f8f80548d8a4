//! Change callbacks.

use crate::core::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

type Callback = Box<dyn Fn(&Snapshot) + Send + Sync>;

struct Subscribers {
    entries: Vec<(usize, Callback)>,
    next_id: usize,
}

/// Keeps a subscription alive; dropping it unsubscribes.
pub struct SubscriptionHandle {
    id: usize,
    registry: Arc<RwLock<Subscribers>>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        let id = self.id;
        if let Ok(mut inner) = self.registry.try_write() {
            inner.entries.retain(|(entry_id, _)| *entry_id != id);
            return;
        }
        // Contended: finish the removal once the lock frees up.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let registry = Arc::clone(&self.registry);
            runtime.spawn(async move {
                registry
                    .write()
                    .await
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            });
        }
    }
}

/// Callbacks to run after each successful reload or update.
///
/// Each callback receives the snapshot that was just published.
///
/// # Examples
///
/// ```rust
/// use tierconf::core::Snapshot;
/// use tierconf::notify::SubscriberRegistry;
///
/// # async fn example() {
/// let registry = SubscriberRegistry::new();
/// let handle = registry
///     .subscribe(|snapshot: &Snapshot| println!("{} keys", snapshot.keys().len()))
///     .await;
///
/// registry.notify_all(&Snapshot::default()).await;
/// drop(handle);
/// # }
/// ```
#[derive(Clone)]
pub struct SubscriberRegistry {
    inner: Arc<RwLock<Subscribers>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Subscribers {
                entries: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `callback`. Keep the returned handle for as long as the
    /// callback should stay registered.
    pub async fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Box::new(callback)));

        SubscriptionHandle {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Run every callback, in subscription order.
    pub async fn notify_all(&self, snapshot: &Snapshot) {
        let inner = self.inner.read().await;
        for (_, callback) in &inner.entries {
            callback(snapshot);
        }
    }

    /// Number of live subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
