//! Destination shapes for coercion.

use std::fmt;

/// The shape a value is being coerced into.
///
/// Numeric kinds carry their bit width so overflow diagnostics can name the
/// exact destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// `bool`
    Bool,
    /// Signed integer of the given width.
    Int(u32),
    /// Unsigned integer of the given width.
    Uint(u32),
    /// Float of the given width.
    Float(u32),
    /// `String`
    String,
    /// `std::time::Duration`
    Duration,
    /// RFC 3339 timestamp.
    Timestamp,
    /// Sequence of the inner kind.
    Slice(Box<Kind>),
    /// A struct populated through [`Unmarshal`](super::Unmarshal).
    Struct,
    /// No conversion.
    Any,
}

impl Kind {
    /// A slice of `inner`.
    pub fn slice(inner: Kind) -> Self {
        Kind::Slice(Box::new(inner))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Int(bits) => write!(f, "i{}", bits),
            Kind::Uint(bits) => write!(f, "u{}", bits),
            Kind::Float(bits) => write!(f, "f{}", bits),
            Kind::String => write!(f, "string"),
            Kind::Duration => write!(f, "duration"),
            Kind::Timestamp => write!(f, "timestamp"),
            Kind::Slice(inner) => write!(f, "[{}]", inner),
            Kind::Struct => write!(f, "struct"),
            Kind::Any => write!(f, "any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Kind::Uint(8).to_string(), "u8");
        assert_eq!(Kind::slice(Kind::Int(32)).to_string(), "[i32]");
        assert_eq!(Kind::Timestamp.to_string(), "timestamp");
    }
}
