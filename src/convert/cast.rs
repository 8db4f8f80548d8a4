//! Per-kind conversions at 64-bit width.
//!
//! Every function takes any [`Value`] and either produces the requested
//! primitive or fails with a [`ConvertError`]. Width-specific narrowing lives
//! in [`FromValue`](super::FromValue).

use super::Kind;
use super::literal::{parse_bool, parse_duration, parse_timestamp};
use crate::error::ConvertError;
use crate::value::Value;
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

// 2^63 and 2^64 as floats; anything at or above is out of range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Coerce to `bool`.
///
/// Integers map nonzero to `true`, strings must be a boolean literal and
/// `Null` is `false`. Floats are rejected.
pub fn to_bool(value: &Value) -> Result<bool, ConvertError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Uint(u) => Ok(*u != 0),
        Value::String(s) => parse_bool(s).map_err(|e| ConvertError::parse(s, Kind::Bool, e)),
        _ => Err(ConvertError::type_mismatch(value, Kind::Bool)),
    }
}

/// Coerce to `i64`.
///
/// Floats truncate toward zero; unsigned values and floats outside the `i64`
/// range overflow.
pub fn to_i64(value: &Value) -> Result<i64, ConvertError> {
    const TARGET: Kind = Kind::Int(64);

    match value {
        Value::Null => Ok(0),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Int(i) => Ok(*i),
        Value::Uint(u) => i64::try_from(*u).map_err(|_| ConvertError::overflow(u, TARGET)),
        Value::Float(x) => {
            if x.is_nan() || *x < -I64_BOUND || *x >= I64_BOUND {
                Err(ConvertError::overflow(x, TARGET))
            } else {
                Ok(x.trunc() as i64)
            }
        }
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|e| ConvertError::parse(s, TARGET, e)),
        _ => Err(ConvertError::type_mismatch(value, TARGET)),
    }
}

/// Coerce to `u64`.
///
/// Negative integers and floats are overflow errors rather than parse
/// failures.
pub fn to_u64(value: &Value) -> Result<u64, ConvertError> {
    const TARGET: Kind = Kind::Uint(64);

    match value {
        Value::Null => Ok(0),
        Value::Bool(b) => Ok(u64::from(*b)),
        Value::Int(i) => u64::try_from(*i).map_err(|_| ConvertError::overflow(i, TARGET)),
        Value::Uint(u) => Ok(*u),
        Value::Float(x) => {
            if x.is_nan() || *x < 0.0 || *x >= U64_BOUND {
                Err(ConvertError::overflow(x, TARGET))
            } else {
                Ok(x.trunc() as u64)
            }
        }
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|e| ConvertError::parse(s, TARGET, e)),
        _ => Err(ConvertError::type_mismatch(value, TARGET)),
    }
}

/// Coerce to `f64`.
pub fn to_f64(value: &Value) -> Result<f64, ConvertError> {
    const TARGET: Kind = Kind::Float(64);

    match value {
        Value::Null => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Ok(*i as f64),
        Value::Uint(u) => Ok(*u as f64),
        Value::Float(x) => Ok(*x),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| ConvertError::parse(s, TARGET, e)),
        _ => Err(ConvertError::type_mismatch(value, TARGET)),
    }
}

/// Coerce to `String`.
///
/// A sequence of strings is joined with `,`: some sources split a literal
/// that happened to contain their list separator, and this puts it back.
pub fn to_string(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Uint(u) => Ok(u.to_string()),
        Value::Float(x) => Ok(x.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Value::Sequence(items) => {
            let parts: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            parts
                .map(|parts| parts.join(","))
                .ok_or_else(|| ConvertError::type_mismatch(value, Kind::String))
        }
        Value::Mapping(_) => Err(ConvertError::type_mismatch(value, Kind::String)),
    }
}

/// Coerce to a sequence of values.
///
/// A non-empty string becomes a one-element sequence, because flat sources
/// cannot tell a scalar from a single-item list. The empty string and `Null`
/// are rejected so that "no value" stays distinct from "empty list".
pub fn to_slice(value: &Value) -> Result<Vec<Value>, ConvertError> {
    let target = || Kind::slice(Kind::Any);

    match value {
        Value::Sequence(items) => Ok(items.clone()),
        Value::Bytes(bytes) => Ok(bytes.iter().map(|b| Value::Int(i64::from(*b))).collect()),
        Value::String(s) if !s.is_empty() => Ok(vec![value.clone()]),
        _ => Err(ConvertError::type_mismatch(value, target())),
    }
}

/// Coerce text to a [`Duration`].
pub fn to_duration(value: &Value) -> Result<Duration, ConvertError> {
    let text = text_of(value, Kind::Duration)?;
    parse_duration(&text).map_err(|e| ConvertError::parse(&text, Kind::Duration, e))
}

/// Coerce text to a timestamp with its original offset.
pub fn to_timestamp(value: &Value) -> Result<DateTime<FixedOffset>, ConvertError> {
    let text = text_of(value, Kind::Timestamp)?;
    parse_timestamp(&text).map_err(|e| ConvertError::parse(&text, Kind::Timestamp, e))
}

fn text_of(value: &Value, target: Kind) -> Result<String, ConvertError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => Err(ConvertError::type_mismatch(value, target)),
    }
}
