//! The aggregation layer: loading, snapshots and the shared handle.

mod builder;
mod config_handle;
mod loader;
mod snapshot;

pub use builder::TierConfigBuilder;
pub use config_handle::TierConfig;
pub use loader::ConfigLoader;
pub use snapshot::Snapshot;
