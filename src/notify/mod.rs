//! Change notification: file watching and subscriber callbacks.

pub mod subscriber;
pub mod watcher;

pub use subscriber::{SubscriberRegistry, SubscriptionHandle};
pub use watcher::ConfigWatcher;
