//! Building and layering trees.

use crate::value::{Map, Value};

/// Merge `overlay` into `base`.
///
/// Mappings present on both sides are merged key by key; any other value in
/// `overlay` replaces what `base` had at that key.
pub fn merge(base: &mut Map, overlay: Map) {
    for (key, incoming) in overlay {
        let slot = base.entry(key).or_insert(Value::Null);
        match (slot, incoming) {
            (Value::Mapping(existing), Value::Mapping(incoming)) => merge(existing, incoming),
            (slot, incoming) => *slot = incoming,
        }
    }
}

/// Insert `value` at a separator-delimited path, creating intermediate
/// mappings and replacing any leaf that is in the way.
pub fn insert_path(tree: &mut Map, key: &str, separator: &str, value: Value) {
    match key.split_once(separator) {
        Some((head, rest)) if !separator.is_empty() => {
            let slot = tree
                .entry(head.to_string())
                .or_insert_with(|| Value::Mapping(Map::new()));
            if !slot.is_node() {
                *slot = Value::Mapping(Map::new());
            }
            if let Value::Mapping(sub) = slot {
                insert_path(sub, rest, separator, value);
            }
        }
        _ => {
            tree.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: serde_json::Value) -> Map {
        match serde_json::from_value(json).unwrap() {
            Value::Mapping(map) => map,
            other => panic!("not a mapping: {other:?}"),
        }
    }

    #[test]
    fn test_merge_is_deep() {
        let mut base = tree(serde_json::json!({
            "server": {"port": 8080, "host": "localhost"},
            "debug": false
        }));
        let overlay = tree(serde_json::json!({
            "server": {"port": 9090},
            "extra": [1, 2]
        }));
        merge(&mut base, overlay);

        assert_eq!(
            base,
            tree(serde_json::json!({
                "server": {"port": 9090, "host": "localhost"},
                "debug": false,
                "extra": [1, 2]
            }))
        );
    }

    #[test]
    fn test_merge_leaf_replaces_node_and_back() {
        let mut base = tree(serde_json::json!({"a": {"b": 1}, "c": 1}));
        merge(&mut base, tree(serde_json::json!({"a": "flat", "c": {"d": 2}})));
        assert_eq!(base, tree(serde_json::json!({"a": "flat", "c": {"d": 2}})));
    }

    #[test]
    fn test_insert_path() {
        let mut map = Map::new();
        insert_path(&mut map, "db.pool.size", ".", Value::Int(5));
        insert_path(&mut map, "db.host", ".", Value::from("x"));
        assert_eq!(
            map,
            tree(serde_json::json!({"db": {"pool": {"size": 5}, "host": "x"}}))
        );

        insert_path(&mut map, "db.host.port", ".", Value::Int(1));
        assert_eq!(
            map["db"].as_mapping().unwrap()["host"],
            Value::Mapping(tree(serde_json::json!({"port": 1})))
        );
    }
}
