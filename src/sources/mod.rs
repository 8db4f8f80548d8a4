//! Configuration source implementations.

mod config_source;
mod env;
mod file;
mod memory;

#[cfg(feature = "remote")]
mod remote;

pub use config_source::ConfigSource;
pub use env::EnvSource;
pub use file::FileSource;
pub use memory::MemorySource;

#[cfg(feature = "remote")]
pub use remote::{HttpAuth, HttpSource, HttpSourceBuilder};
