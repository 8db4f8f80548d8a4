//! Error types for tierconf.

use crate::convert::Kind;
use crate::value::Value;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

/// Result type alias for tierconf operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or reloading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to load configuration from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Failed to deserialize configuration.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// File watching is not supported or failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value could not be coerced into the requested type.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Errors raised by the coercion engine.
///
/// A caller can tell a value of the wrong shape ([`ConvertError::Type`]) from
/// one that is the right shape but does not fit ([`ConvertError::Overflow`])
/// or a string that is not a valid literal ([`ConvertError::Parse`]).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The value's representation is incompatible with the destination kind.
    #[error("cannot convert {value} ({found}) to {target}")]
    Type {
        /// Rendering of the offending value
        value: String,
        /// Variant name of the offending value
        found: &'static str,
        /// Requested destination
        target: Kind,
    },

    /// The value is numeric but does not fit the destination width or sign.
    #[error("value {value} overflows {target}")]
    Overflow {
        /// Rendering of the offending value
        value: String,
        /// Requested destination
        target: Kind,
    },

    /// A string failed to parse as a literal of the destination kind.
    #[error("cannot parse {input:?} as {target}: {source}")]
    Parse {
        /// The text that failed to parse
        input: String,
        /// Requested destination
        target: Kind,
        /// Underlying parser error
        source: ParseFailure,
    },

    /// Struct population was handed something that is not a string-keyed map.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConvertError {
    pub(crate) fn type_mismatch(value: &Value, target: Kind) -> Self {
        Self::Type {
            value: value.to_string(),
            found: value.type_name(),
            target,
        }
    }

    pub(crate) fn overflow(value: impl fmt::Display, target: Kind) -> Self {
        Self::Overflow {
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn parse(input: &str, target: Kind, source: impl Into<ParseFailure>) -> Self {
        Self::Parse {
            input: input.to_string(),
            target,
            source: source.into(),
        }
    }

    /// Point the error at a narrower destination than the stage that raised it.
    pub(crate) fn retarget(mut self, kind: Kind) -> Self {
        match &mut self {
            Self::Type { target, .. } | Self::Overflow { target, .. } | Self::Parse { target, .. } => {
                *target = kind
            }
            Self::InvalidArgument(_) => {}
        }
        self
    }

    /// True for [`ConvertError::Type`].
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type { .. })
    }

    /// True for [`ConvertError::Overflow`].
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }

    /// True for [`ConvertError::Parse`].
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// The native error of whichever literal parser rejected the input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseFailure {
    /// Integer literal
    #[error(transparent)]
    Int(#[from] ParseIntError),

    /// Float literal
    #[error(transparent)]
    Float(#[from] ParseFloatError),

    /// Boolean literal
    #[error(transparent)]
    Bool(#[from] BoolLiteralError),

    /// Duration literal
    #[error(transparent)]
    Duration(#[from] DurationError),

    /// RFC 3339 timestamp
    #[error(transparent)]
    Timestamp(#[from] chrono::ParseError),
}

/// The string is not one of the accepted boolean literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid boolean literal")]
pub struct BoolLiteralError;

/// A duration literal could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    /// Nothing to parse.
    #[error("empty duration")]
    Empty,

    /// A unit was not preceded by a number.
    #[error("expected a number at offset {0}")]
    MissingNumber(usize),

    /// A number was not followed by a unit.
    #[error("missing unit after {0}")]
    MissingUnit(String),

    /// The unit is not one of ns, us, ms, s, m, h, d.
    #[error("unknown unit {0:?}")]
    UnknownUnit(String),

    /// The number itself is malformed.
    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    /// Durations are unsigned.
    #[error("negative durations are not supported")]
    Negative,

    /// The total does not fit a `Duration`.
    #[error("duration out of range")]
    OutOfRange,
}

/// Validation error for configuration validation.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific key has an invalid value.
    InvalidField {
        /// The key path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_predicates() {
        let err = ConvertError::overflow(257, Kind::Uint(8));
        assert!(err.is_overflow());
        assert!(!err.is_type());
        assert_eq!(err.to_string(), "value 257 overflows u8");

        let err = ConvertError::type_mismatch(&Value::Sequence(vec![]), Kind::Bool);
        assert!(err.is_type());
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let source = "glob".parse::<i64>().unwrap_err();
        let err = ConvertError::parse("glob", Kind::Int(64), source);
        assert!(err.is_parse());
        assert!(err.to_string().contains("\"glob\""));
        match err {
            ConvertError::Parse {
                source: ParseFailure::Int(_),
                ..
            } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Multiple(vec![
            ValidationError::custom("first"),
            ValidationError::invalid_field("server.port", "must be >= 1024"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("1. first"));
        assert!(msg.contains("Field 'server.port' is invalid"));
    }

    #[test]
    fn test_convert_error_into_config_error() {
        let err: ConfigError = ConvertError::InvalidArgument("not a map".into()).into();
        assert_eq!(err.to_string(), "invalid argument: not a map");
    }
}
