//! The configuration tree and key-path resolution over it.
//!
//! A tree is a [`Map`](crate::value::Map) whose values may themselves be
//! mappings. Keys address it tier by tier, joined by a separator (default
//! `.`), with optional bracket suffixes on any tier: `name[i]` indexes a
//! sequence, `name[i][j]` chains, and `name[]` asks for a length.

mod merge;
mod path;
mod resolver;

pub use merge::{insert_path, merge};
pub use resolver::{Getter, Resolver};
