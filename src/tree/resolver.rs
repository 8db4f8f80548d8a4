//! Key-path resolution against a configuration tree.

use super::path::Segment;
use crate::value::{Map, Value};

/// Anything that can answer a flat key lookup.
///
/// Only leaves are returned: a key naming a nested mapping yields `None`.
pub trait Getter {
    /// Look up `key`, returning the raw value if it names a leaf.
    fn get(&self, key: &str) -> Option<Value>;
}

/// Resolves key paths such as `a.b.c`, `a.b[2]` and `a.b[]` against a tree.
///
/// The separator is per instance, so differently-configured resolvers can
/// coexist. Resolution is pure: the same key against the same tree always
/// gives the same answer.
///
/// # Examples
///
/// ```rust
/// use tierconf::tree::Resolver;
/// use tierconf::value::Value;
///
/// let tree: Value = serde_json::from_str(
///     r#"{"nested": {"leaf": "44", "slice": ["c", "d"]}}"#,
/// ).unwrap();
/// let tree = tree.as_mapping().unwrap();
/// let resolver = Resolver::default();
///
/// assert_eq!(resolver.resolve(tree, "nested.leaf"), Some(Value::from("44")));
/// assert_eq!(resolver.resolve(tree, "nested.slice[]"), Some(Value::Int(2)));
/// assert_eq!(resolver.resolve(tree, "nested.slice[1]"), Some(Value::from("d")));
/// assert_eq!(resolver.resolve(tree, "nested"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    separator: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            separator: Self::DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl Resolver {
    /// The separator used when none is configured.
    pub const DEFAULT_SEPARATOR: &'static str = ".";

    /// A resolver splitting tiers on `separator`. An empty separator falls
    /// back to [`Resolver::DEFAULT_SEPARATOR`].
    pub fn new(separator: impl Into<String>) -> Self {
        let separator = separator.into();
        if separator.is_empty() {
            return Self::default();
        }
        Self { separator }
    }

    /// The tier separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Resolve `key` against `tree`.
    ///
    /// Returns `None` for absent keys, keys naming a mapping, paths that run
    /// past a leaf and out-of-range indices. A sequence whose elements are
    /// mappings comes back as a sequence of the same length filled with
    /// [`Value::Null`]: its length is observable, its objects are not.
    ///
    /// A trailing `[]` asks for a length: elements of a sequence, entries of
    /// a mapping, and bytes of a string or byte buffer. String lengths count
    /// UTF-8 bytes, not characters.
    pub fn resolve(&self, tree: &Map, key: &str) -> Option<Value> {
        if key.is_empty() {
            return None;
        }

        // Flat sources store dotted keys verbatim.
        if let Some(found) = tree.get(key) {
            if !found.is_node() {
                return Some(leaf(found));
            }
        }

        let (segment, rest) = self.split(key);

        if let Some(rest) = rest {
            match tree.get(segment) {
                Some(Value::Mapping(sub)) => return self.resolve(sub, rest),
                Some(_) => return None,
                None => {}
            }
        }

        let addressed = Segment::parse(segment)?;
        let current = index_into(tree, &addressed)?;

        if addressed.length {
            return match rest {
                None => length_of(current),
                Some(_) => None,
            };
        }

        match (current, rest) {
            (Value::Mapping(sub), Some(rest)) => self.resolve(sub, rest),
            (Value::Mapping(_), None) | (_, Some(_)) => None,
            (value, None) => Some(leaf(value)),
        }
    }

    /// Find the mapping at `key`, for struct population. The empty key names
    /// the root.
    pub fn node<'t>(&self, tree: &'t Map, key: &str) -> Option<&'t Map> {
        if key.is_empty() {
            return Some(tree);
        }
        if let Some(Value::Mapping(sub)) = tree.get(key) {
            return Some(sub);
        }

        let (segment, rest) = self.split(key);
        let target = match Segment::parse(segment) {
            Some(addressed) if !addressed.length => index_into(tree, &addressed)?,
            Some(_) => return None,
            None => tree.get(segment)?,
        };

        match (target, rest) {
            (Value::Mapping(sub), Some(rest)) => self.node(sub, rest),
            (Value::Mapping(sub), None) => Some(sub),
            _ => None,
        }
    }

    /// Every leaf path in `tree`, joined with the separator, sorted.
    pub fn keys(&self, tree: &Map) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_keys(tree, None, &mut out);
        out.sort();
        out
    }

    fn collect_keys(&self, tree: &Map, prefix: Option<&str>, out: &mut Vec<String>) {
        for (key, value) in tree {
            let path = match prefix {
                Some(prefix) => format!("{}{}{}", prefix, self.separator, key),
                None => key.clone(),
            };
            match value {
                Value::Mapping(sub) => self.collect_keys(sub, Some(&path), out),
                _ => out.push(path),
            }
        }
    }

    fn split<'k>(&self, key: &'k str) -> (&'k str, Option<&'k str>) {
        match key.split_once(self.separator.as_str()) {
            Some((head, rest)) => (head, Some(rest)),
            None => (key, None),
        }
    }
}

/// Look up the bare name and apply each index in turn.
fn index_into<'t>(tree: &'t Map, addressed: &Segment<'_>) -> Option<&'t Value> {
    let mut current = tree.get(addressed.name)?;
    for &index in &addressed.indices {
        let items = current.as_sequence()?;
        current = usize::try_from(index).ok().and_then(|i| items.get(i))?;
    }
    Some(current)
}

/// A sequence of mappings is reported by shape only.
fn leaf(value: &Value) -> Value {
    match value {
        Value::Sequence(items) if items.first().is_some_and(Value::is_node) => {
            Value::Sequence(vec![Value::Null; items.len()])
        }
        other => other.clone(),
    }
}

/// Length for a `[]` query. Strings report their UTF-8 byte length.
fn length_of(value: &Value) -> Option<Value> {
    let len = match value {
        Value::Sequence(items) => items.len(),
        Value::Mapping(map) => map.len(),
        Value::String(s) => s.len(),
        Value::Bytes(bytes) => bytes.len(),
        _ => return None,
    };
    i64::try_from(len).ok().map(Value::Int)
}
