//! In-memory configuration source.

use super::ConfigSource;
use crate::error::Result;
use crate::tree::{Resolver, insert_path};
use crate::value::{Map, Value};

/// A tree held in memory, for defaults and tests.
///
/// # Examples
///
/// ```rust
/// use tierconf::sources::{ConfigSource, MemorySource};
/// use tierconf::value::Value;
///
/// let source = MemorySource::new("defaults")
///     .with_value("server.port", 8080)
///     .with_value("server.host", "localhost");
///
/// let tree = source.load().unwrap();
/// let server = tree["server"].as_mapping().unwrap();
/// assert_eq!(server["port"], Value::Int(8080));
/// ```
#[derive(Debug, Clone)]
pub struct MemorySource {
    label: String,
    tree: Map,
    separator: String,
    priority: i32,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tree: Map::new(),
            separator: Resolver::DEFAULT_SEPARATOR.to_string(),
            priority: 100,
        }
    }

    /// Create a source serving `tree` as-is.
    pub fn from_tree(label: impl Into<String>, tree: Map) -> Self {
        Self {
            tree,
            ..Self::new(label)
        }
    }

    /// Separator used by [`MemorySource::with_value`] to split keys.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set `key` to `value`, expanding the key into nested mappings.
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        insert_path(&mut self.tree, key, &self.separator, value.into());
        self
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ConfigSource for MemorySource {
    fn load(&self) -> Result<Map> {
        Ok(self.tree.clone())
    }

    fn name(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
