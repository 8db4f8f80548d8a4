//! Struct population from a string-keyed map.
//!
//! Instead of reflecting over fields at run time, each destination type
//! declares a [`Fields`] table: field name, optional key override, whether
//! the field is a nested struct, and a setter.
//!
//! ```rust
//! use tierconf::convert::{Fields, Unmarshal, unmarshal};
//! use tierconf::value::Value;
//!
//! #[derive(Debug, Default)]
//! struct Tls {
//!     enabled: bool,
//! }
//!
//! impl Unmarshal for Tls {
//!     fn fields() -> Fields<Self> {
//!         Fields::new().field("Enabled", |t: &mut Self, v| t.enabled = v)
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Server {
//!     port: u16,
//!     host: String,
//!     tls: Tls,
//! }
//!
//! impl Unmarshal for Server {
//!     fn fields() -> Fields<Self> {
//!         Fields::new()
//!             .field("Port", |s: &mut Self, v| s.port = v)
//!             .field("Host", |s: &mut Self, v| s.host = v)
//!             .key("hostname")
//!             .nested("Tls", |s: &mut Self| &mut s.tls)
//!     }
//! }
//!
//! let source: Value = serde_json::from_str(
//!     r#"{"port": "8080", "hostname": "db", "tls": {"enabled": "t"}}"#,
//! ).unwrap();
//! let server: Server = unmarshal(&source).unwrap();
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.host, "db");
//! assert!(server.tls.enabled);
//! ```

use super::{FromValue, Kind};
use crate::error::ConvertError;
use crate::value::{Map, Value};
use std::borrow::Cow;

/// A struct that can be populated from a configuration subtree.
pub trait Unmarshal: Sized {
    /// The field table, in declaration order.
    fn fields() -> Fields<Self>;
}

type LeafSetter<T> = Box<dyn Fn(&mut T, &Value) -> Result<(), ConvertError>>;
type NestedSetter<T> = Box<dyn Fn(&mut T, &Map) -> Result<(), ConvertError>>;
type SequenceSetter<T> = Box<dyn Fn(&mut T, &[Value]) -> Result<(), ConvertError>>;

enum Setter<T> {
    Leaf(LeafSetter<T>),
    Nested(NestedSetter<T>),
    NestedSequence(SequenceSetter<T>),
}

/// One entry of a [`Fields`] table.
pub struct Field<T> {
    name: &'static str,
    key: Option<&'static str>,
    setter: Setter<T>,
}

impl<T> Field<T> {
    /// The declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The source key: the override if one was given, otherwise the field
    /// name with its first character lowercased.
    pub fn key(&self) -> Cow<'static, str> {
        match self.key {
            Some(key) => Cow::Borrowed(key),
            None => Cow::Owned(default_key(self.name)),
        }
    }

    /// Whether the field is a nested struct or a sequence of them.
    pub fn is_nested(&self) -> bool {
        !matches!(self.setter, Setter::Leaf(_))
    }
}

/// The field table of an [`Unmarshal`] type.
pub struct Fields<T> {
    fields: Vec<Field<T>>,
}

impl<T> Fields<T> {
    /// An empty table.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Override the source key of the most recently added field.
    pub fn key(mut self, key: &'static str) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.key = Some(key);
        }
        self
    }

    /// The fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Field<T>> {
        self.fields.iter()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T: 'static> Fields<T> {
    /// A leaf field converted through [`FromValue`].
    pub fn field<V, F>(mut self, name: &'static str, set: F) -> Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T, V) + 'static,
    {
        self.fields.push(Field {
            name,
            key: None,
            setter: Setter::Leaf(Box::new(move |dest, raw| {
                set(dest, V::from_value(raw)?);
                Ok(())
            })),
        });
        self
    }

    /// A nested struct, populated in place.
    pub fn nested<N, F>(mut self, name: &'static str, get: F) -> Self
    where
        N: Unmarshal + 'static,
        F: Fn(&mut T) -> &mut N + 'static,
    {
        self.fields.push(Field {
            name,
            key: None,
            setter: Setter::Nested(Box::new(move |dest, map| populate(map, get(dest)))),
        });
        self
    }

    /// A sequence of nested structs. The first failing element aborts the
    /// field and leaves it untouched.
    pub fn nested_seq<N, F>(mut self, name: &'static str, get: F) -> Self
    where
        N: Unmarshal + Default + 'static,
        F: Fn(&mut T) -> &mut Vec<N> + 'static,
    {
        self.fields.push(Field {
            name,
            key: None,
            setter: Setter::NestedSequence(Box::new(move |dest, items| {
                let parsed = items
                    .iter()
                    .map(|item| match item {
                        Value::Mapping(map) => {
                            let mut element = N::default();
                            populate(map, &mut element)?;
                            Ok(element)
                        }
                        other => Err(ConvertError::type_mismatch(other, Kind::Struct)),
                    })
                    .collect::<Result<Vec<N>, ConvertError>>()?;
                *get(dest) = parsed;
                Ok(())
            })),
        });
        self
    }
}

impl<T> Default for Fields<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase the first character: `MaxConns` -> `maxConns`.
pub fn default_key(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Populate `dest` from `value`, which must be a mapping.
///
/// Every declared field is attempted even after a failure; the first error
/// is returned once all fields have been processed. Keys absent from the
/// source leave their field untouched.
pub fn unmarshal_struct<T: Unmarshal>(value: &Value, dest: &mut T) -> Result<(), ConvertError> {
    match value {
        Value::Mapping(map) => populate(map, dest),
        other => Err(ConvertError::InvalidArgument(format!(
            "struct population needs a mapping, found {}",
            other.type_name()
        ))),
    }
}

/// Build a `T` from its default and populate it from `value`.
pub fn unmarshal<T: Unmarshal + Default>(value: &Value) -> Result<T, ConvertError> {
    let mut out = T::default();
    unmarshal_struct(value, &mut out)?;
    Ok(out)
}

/// Populate `dest` from an already-extracted mapping.
pub fn populate<T: Unmarshal>(map: &Map, dest: &mut T) -> Result<(), ConvertError> {
    let mut first_error = None;

    for field in T::fields().iter() {
        let key = field.key();
        let Some(raw) = map.get(key.as_ref()) else {
            continue;
        };

        let result = match &field.setter {
            Setter::Leaf(set) => set(dest, raw),
            Setter::Nested(set) => match raw {
                Value::Mapping(sub) => set(dest, sub),
                other => Err(ConvertError::type_mismatch(other, Kind::Struct)),
            },
            Setter::NestedSequence(set) => match raw {
                Value::Sequence(items) => set(dest, items),
                other => Err(ConvertError::type_mismatch(other, Kind::slice(Kind::Struct))),
            },
        };

        if let Err(err) = result {
            tracing::debug!(field = field.name, key = %key, error = %err, "failed to populate field");
            first_error.get_or_insert(err);
        }
    }

    first_error.map_or(Ok(()), Err)
}
