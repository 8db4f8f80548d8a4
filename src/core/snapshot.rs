//! An immutable, resolved view of the merged configuration tree.

use crate::convert::{FromValue, Unmarshal, populate};
use crate::error::ConvertError;
use crate::tree::{Getter, Resolver};
use crate::value::{Map, Value};

/// One published version of the configuration.
///
/// All lookups go through the snapshot's [`Resolver`], so keys use its
/// separator and bracket syntax.
///
/// # Examples
///
/// ```rust
/// use tierconf::core::Snapshot;
/// use tierconf::value::Value;
///
/// let tree: Value = serde_json::from_str(r#"{"db": {"port": "5432", "hosts": ["a", "b"]}}"#).unwrap();
/// let snapshot = Snapshot::new(tree.as_mapping().unwrap().clone());
///
/// assert_eq!(snapshot.get_as::<u16>("db.port").unwrap(), Some(5432));
/// assert_eq!(snapshot.get_as::<usize>("db.hosts[]").unwrap(), Some(2));
/// assert!(snapshot.is_set("db"));
/// assert_eq!(snapshot.get("db"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    tree: Map,
    resolver: Resolver,
}

impl Snapshot {
    /// Wrap `tree` with the default `.` separator.
    pub fn new(tree: Map) -> Self {
        Self::with_resolver(tree, Resolver::default())
    }

    /// Wrap `tree`, resolving keys with `resolver`.
    pub fn with_resolver(tree: Map, resolver: Resolver) -> Self {
        Self { tree, resolver }
    }

    /// The raw leaf at `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.resolver.resolve(&self.tree, key)
    }

    /// The leaf at `key` coerced into `T`. Absent keys give `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] when the value exists but cannot become a `T`.
    pub fn get_as<T: FromValue>(&self, key: &str) -> Result<Option<T>, ConvertError> {
        self.get(key).map(|value| T::from_value(&value)).transpose()
    }

    /// Whether `key` names a leaf or a mapping.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some() || (!key.is_empty() && self.node(key).is_some())
    }

    /// The mapping at `key`; the empty key is the root.
    pub fn node(&self, key: &str) -> Option<&Map> {
        self.resolver.node(&self.tree, key)
    }

    /// Every leaf path, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.resolver.keys(&self.tree)
    }

    /// Populate a `T` from the mapping at `key`. Absent keys give `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the first field conversion error, after every field has been
    /// attempted. A key that names a leaf is an
    /// [`ConvertError::InvalidArgument`].
    pub fn unmarshal_key<T: Unmarshal + Default>(&self, key: &str) -> Result<Option<T>, ConvertError> {
        match self.node(key) {
            Some(map) => {
                let mut dest = T::default();
                populate(map, &mut dest)?;
                Ok(Some(dest))
            }
            None if self.get(key).is_some() => Err(ConvertError::InvalidArgument(format!(
                "key {key:?} names a value, not a mapping"
            ))),
            None => Ok(None),
        }
    }

    /// Populate a `T` from the whole tree.
    ///
    /// # Errors
    ///
    /// Returns the first field conversion error.
    pub fn unmarshal<T: Unmarshal + Default>(&self) -> Result<T, ConvertError> {
        let mut dest = T::default();
        populate(&self.tree, &mut dest)?;
        Ok(dest)
    }

    /// The merged tree.
    pub fn tree(&self) -> &Map {
        &self.tree
    }

    /// The resolver used for lookups.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

impl Getter for Snapshot {
    fn get(&self, key: &str) -> Option<Value> {
        Snapshot::get(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Fields;
    use serde_json::json;
    use std::time::Duration;

    fn snapshot(json: serde_json::Value) -> Snapshot {
        match serde_json::from_value(json).unwrap() {
            Value::Mapping(map) => Snapshot::new(map),
            other => panic!("not a mapping: {other:?}"),
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Pool {
        size: u8,
        idle: Duration,
    }

    impl Unmarshal for Pool {
        fn fields() -> Fields<Self> {
            Fields::new()
                .field("Size", |p: &mut Self, v| p.size = v)
                .field("Idle", |p: &mut Self, v| p.idle = v)
        }
    }

    #[test]
    fn test_get_as_absent_and_failing() {
        let s = snapshot(json!({"port": "80", "name": "x"}));
        assert_eq!(s.get_as::<u16>("port").unwrap(), Some(80));
        assert_eq!(s.get_as::<u16>("missing").unwrap(), None);
        assert!(s.get_as::<u16>("name").unwrap_err().is_parse());
    }

    #[test]
    fn test_is_set_and_keys() {
        let s = snapshot(json!({"a": {"b": 1}, "c": null}));
        assert!(s.is_set("a"));
        assert!(s.is_set("a.b"));
        assert!(s.is_set("c"));
        assert!(!s.is_set("a.z"));
        assert!(!s.is_set(""));
        assert_eq!(s.keys(), vec!["a.b", "c"]);
    }

    #[test]
    fn test_unmarshal_key() {
        let s = snapshot(json!({"db": {"pool": {"size": "8", "idle": "30s"}, "host": "x"}}));
        assert_eq!(
            s.unmarshal_key::<Pool>("db.pool").unwrap(),
            Some(Pool {
                size: 8,
                idle: Duration::from_secs(30)
            })
        );
        assert_eq!(s.unmarshal_key::<Pool>("db.cache").unwrap(), None);
        assert!(matches!(
            s.unmarshal_key::<Pool>("db.host"),
            Err(ConvertError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unmarshal_root_reports_bad_field() {
        let s = snapshot(json!({"size": 300, "idle": "1m"}));
        assert!(s.unmarshal::<Pool>().unwrap_err().is_overflow());
    }

    #[test]
    fn test_custom_separator() {
        let tree = snapshot(json!({"a": {"b": "1"}})).tree().clone();
        let s = Snapshot::with_resolver(tree, Resolver::new("/"));
        assert_eq!(s.get_as::<i32>("a/b").unwrap(), Some(1));
        assert_eq!(s.resolver().separator(), "/");
    }
}
