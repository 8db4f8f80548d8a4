//! File watching for automatic configuration reloads.

use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, trace};

type PathSet = Arc<Mutex<BTreeSet<PathBuf>>>;

/// Watches configuration files and emits one reload signal per burst of
/// changes.
///
/// The parent directory of each file is watched rather than the file itself,
/// so editors that save by renaming a temporary file over the original are
/// still seen. Events for other files in that directory are ignored.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::notify::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(500))?;
/// watcher.watch("/path/to/config.yaml")?;
///
/// while let Some(()) = rx.recv().await {
///     println!("config file changed");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    watcher: Mutex<RecommendedWatcher>,
    debounce_duration: Duration,
    watched_paths: PathSet,
}

impl ConfigWatcher {
    /// Create a watcher and the receiver its reload signals arrive on.
    ///
    /// After the first event of a burst the watcher waits `debounce_duration`,
    /// swallows whatever else arrived meanwhile and sends a single signal.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<()>();
        let watched_paths: PathSet = Arc::new(Mutex::new(BTreeSet::new()));

        let filter = Arc::clone(&watched_paths);
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            let watched = lock(&filter);
            if event.paths.iter().any(|path| watched.contains(path)) {
                trace!(paths = ?event.paths, kind = ?event.kind, "configuration file event");
                let _ = event_tx.send(());
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        tokio::spawn(async move {
            while event_rx.recv().await.is_some() {
                sleep(debounce_duration).await;
                while event_rx.try_recv().is_ok() {}
                if tx.send(()).await.is_err() {
                    break;
                }
            }
            debug!("configuration watcher stopped");
        });

        Ok((
            Self {
                watcher: Mutex::new(watcher),
                debounce_duration,
                watched_paths,
            },
            rx,
        ))
    }

    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be watched.
    pub fn watch(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = canonical(path.as_ref())?;
        let dir = parent_of(&file)?;

        lock(&self.watcher)
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;

        debug!(path = %file.display(), "watching configuration file");
        lock(&self.watched_paths).insert(file);
        Ok(())
    }

    /// Stop watching `path`. The parent directory stays watched while other
    /// files in it are still of interest.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or unwatched.
    pub fn unwatch(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = canonical(path.as_ref())?;
        let dir = parent_of(&file)?;

        let dir_still_needed = {
            let mut watched = lock(&self.watched_paths);
            watched.remove(&file);
            watched.iter().any(|other| other.parent() == Some(dir.as_path()))
        };

        if !dir_still_needed {
            lock(&self.watcher)
                .unwatch(&dir)
                .map_err(|e| ConfigError::WatchError(format!("Failed to unwatch path: {}", e)))?;
        }
        Ok(())
    }

    /// The debounce window.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Files currently watched, canonicalized.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        lock(&self.watched_paths).iter().cloned().collect()
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        ConfigError::WatchError(format!("Failed to resolve path {}: {}", path.display(), e))
    })
}

fn parent_of(file: &Path) -> Result<PathBuf> {
    file.parent().map(Path::to_path_buf).ok_or_else(|| {
        ConfigError::WatchError(format!("No parent directory for {}", file.display()))
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
