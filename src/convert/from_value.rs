//! Typed conversion out of a [`Value`].

use super::{Kind, cast};
use crate::error::ConvertError;
use crate::value::Value;
use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;

/// A type a configuration value can be coerced into.
///
/// Integer and float implementations convert at 64-bit width first and then
/// check the destination width, so `257` into `u8` fails with
/// [`ConvertError::Overflow`] rather than wrapping.
pub trait FromValue: Sized {
    /// The destination shape, for diagnostics.
    fn kind() -> Kind;

    /// Convert `value`, or explain why it cannot be.
    fn from_value(value: &Value) -> Result<Self, ConvertError>;
}

/// Convert `value` into `T`.
pub fn convert<T: FromValue>(value: &Value) -> Result<T, ConvertError> {
    T::from_value(value)
}

macro_rules! impl_from_value_signed {
    ($($ty:ty => $bits:expr),*) => {
        $(
            impl FromValue for $ty {
                fn kind() -> Kind {
                    Kind::Int($bits)
                }

                fn from_value(value: &Value) -> Result<Self, ConvertError> {
                    let n = cast::to_i64(value).map_err(|e| e.retarget(Self::kind()))?;
                    <$ty>::try_from(n).map_err(|_| ConvertError::overflow(n, Self::kind()))
                }
            }
        )*
    };
}

macro_rules! impl_from_value_unsigned {
    ($($ty:ty => $bits:expr),*) => {
        $(
            impl FromValue for $ty {
                fn kind() -> Kind {
                    Kind::Uint($bits)
                }

                fn from_value(value: &Value) -> Result<Self, ConvertError> {
                    let n = cast::to_u64(value).map_err(|e| e.retarget(Self::kind()))?;
                    <$ty>::try_from(n).map_err(|_| ConvertError::overflow(n, Self::kind()))
                }
            }
        )*
    };
}

impl_from_value_signed!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, isize => isize::BITS);
impl_from_value_unsigned!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, usize => usize::BITS);

impl FromValue for f64 {
    fn kind() -> Kind {
        Kind::Float(64)
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        cast::to_f64(value)
    }
}

impl FromValue for f32 {
    fn kind() -> Kind {
        Kind::Float(32)
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        let x = cast::to_f64(value).map_err(|e| e.retarget(Self::kind()))?;
        if x.is_finite() && x.abs() > f64::from(f32::MAX) {
            return Err(ConvertError::overflow(x, Self::kind()));
        }
        Ok(x as f32)
    }
}

impl FromValue for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        cast::to_bool(value)
    }
}

impl FromValue for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        cast::to_string(value)
    }
}

impl FromValue for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        cast::to_duration(value)
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        cast::to_timestamp(value)
    }
}

impl FromValue for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        cast::to_timestamp(value).map(|ts| ts.with_timezone(&Utc))
    }
}

impl FromValue for Value {
    fn kind() -> Kind {
        Kind::Any
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn kind() -> Kind {
        Kind::slice(T::kind())
    }

    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        let items = cast::to_slice(value).map_err(|e| e.retarget(Self::kind()))?;
        items.iter().map(T::from_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_integer_overflow() {
        let err = convert::<u8>(&Value::Int(257)).unwrap_err();
        assert!(err.is_overflow());
        assert_eq!(
            err,
            ConvertError::Overflow {
                value: "257".into(),
                target: Kind::Uint(8)
            }
        );

        let err = convert::<u8>(&Value::from("257")).unwrap_err();
        assert!(err.is_overflow());

        assert!(convert::<i8>(&Value::Int(-129)).unwrap_err().is_overflow());
        assert_eq!(convert::<i8>(&Value::Int(-128)).unwrap(), -128);
        assert_eq!(convert::<u16>(&Value::from("65535")).unwrap(), 65535);
    }

    #[test]
    fn test_negative_into_unsigned_is_overflow_with_narrow_target() {
        let err = convert::<u32>(&Value::Int(-1)).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Overflow {
                value: "-1".into(),
                target: Kind::Uint(32)
            }
        );
    }

    #[test]
    fn test_parse_error_names_narrow_target() {
        match convert::<i16>(&Value::from("glob")).unwrap_err() {
            ConvertError::Parse { target, input, .. } => {
                assert_eq!(target, Kind::Int(16));
                assert_eq!(input, "glob");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_f32_range() {
        assert_eq!(convert::<f32>(&Value::Float(1.5)).unwrap(), 1.5);
        assert!(convert::<f32>(&Value::Float(1e300)).unwrap_err().is_overflow());
        assert!(convert::<f32>(&Value::Float(f64::INFINITY)).unwrap().is_infinite());
    }

    #[test]
    fn test_vec_elementwise_with_early_exit() {
        let ports: Vec<u16> = convert(&Value::from(vec!["80", "443"])).unwrap();
        assert_eq!(ports, vec![80, 443]);

        let err = convert::<Vec<u8>>(&Value::from(vec![1, 300, -1])).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Overflow {
                value: "300".into(),
                target: Kind::Uint(8)
            }
        );

        let single: Vec<String> = convert(&Value::from("42")).unwrap();
        assert_eq!(single, vec!["42".to_string()]);

        let err = convert::<Vec<String>>(&Value::from("")).unwrap_err();
        assert!(err.is_type());
        assert!(err.to_string().contains("[string]"));
    }

    #[test]
    fn test_option_and_any() {
        assert_eq!(convert::<Option<i32>>(&Value::Null).unwrap(), None);
        assert_eq!(convert::<Option<i32>>(&Value::from("7")).unwrap(), Some(7));
        let raw = Value::from(vec![1, 2]);
        assert_eq!(convert::<Value>(&raw).unwrap(), raw);
    }

    #[test]
    fn test_timestamps() {
        let utc: DateTime<Utc> = convert(&Value::from("2024-01-01T01:00:00+01:00")).unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_duration() {
        let timeout: Duration = convert(&Value::from("250ms")).unwrap();
        assert_eq!(timeout, Duration::from_millis(250));
    }
}
