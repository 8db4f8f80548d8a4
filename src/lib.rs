//! # tierconf
//!
//! Hierarchical configuration aggregation: several sources are merged into
//! one tree, keys like `server.tls.cert` or `backends[2].port` are resolved
//! against it, and whatever is found is coerced into the type the caller
//! asks for.
//!
//! ## Overview
//!
//! - **Sources**: files (YAML, TOML, JSON, INI), environment variables, HTTP,
//!   in-memory defaults, or any [`ConfigSource`](sources::ConfigSource).
//!   Higher priorities override lower ones; mappings merge deeply.
//! - **Resolution**: [`Resolver`](tree::Resolver) walks the tree tier by
//!   tier, supports `name[i]` indexing and `name[]` length queries, and never
//!   hands out mappings as values.
//! - **Coercion**: [`FromValue`](convert::FromValue) converts permissively
//!   (`"8080"` becomes a `u16`, `"t"` a `bool`, `"1m30s"` a `Duration`) and
//!   reports overflow instead of wrapping.
//! - **Structs**: [`Unmarshal`](convert::Unmarshal) types declare a field
//!   table and are populated from any subtree.
//! - **Hot reload**: reads are lock-free through `arc-swap`; reloads are
//!   validated before they are published, and subscribers hear about each
//!   one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tierconf::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> tierconf::error::Result<()> {
//! let config = TierConfig::builder()
//!     .with_file("config/default.yaml")
//!     .with_env_overrides("APP", "__")
//!     .with_file_watch(true)
//!     .build()
//!     .await?;
//!
//! let port: u16 = config.get_or("server.port", 8080);
//! let timeout = config.get_as::<Duration>("server.timeout")?;
//! let replicas = config.get_as::<usize>("backends[]")?;
//! println!("{port} {timeout:?} {replicas:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): reload when source files change, and change
//!   subscriptions.
//! - `remote`: `sources::HttpSource`.
//! - `tokio-runtime`: the tokio runtime used by `remote`.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod convert;
pub mod core;
pub mod error;
pub mod sources;
pub mod tree;
pub mod value;

#[cfg(feature = "file-watch")]
pub mod notify;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::convert::{Fields, FromValue, Kind, Unmarshal};
    pub use crate::core::{Snapshot, TierConfig, TierConfigBuilder};
    pub use crate::error::{ConfigError, ConvertError, Result, ValidationError};
    pub use crate::sources::ConfigSource;
    pub use crate::tree::{Getter, Resolver};
    pub use crate::value::{Map, Value};
}
