//! Type coercion engine.
//!
//! Turns loosely-typed [`Value`](crate::value::Value)s into the types callers
//! ask for. The per-kind functions in [`cast`] work at 64-bit width;
//! [`FromValue`] adds destination-width checks; [`Unmarshal`] populates
//! structs from a mapping.

pub mod cast;
mod from_value;
mod kind;
pub mod literal;
mod unmarshal;

pub use from_value::{FromValue, convert};
pub use kind::Kind;
pub use unmarshal::{
    Field, Fields, Unmarshal, default_key, populate, unmarshal, unmarshal_struct,
};
