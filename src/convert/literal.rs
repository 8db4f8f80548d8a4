//! Literal parsers for text values: booleans, durations and timestamps.

use crate::error::{BoolLiteralError, DurationError};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a boolean literal.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything
/// else, the empty string included, is rejected.
pub fn parse_bool(s: &str) -> Result<bool, BoolLiteralError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(BoolLiteralError),
    }
}

/// Parse a duration literal such as `"300ms"`, `"1.5h"` or `"2h45m"`.
///
/// The grammar is a sequence of decimal numbers, each followed by a unit
/// (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`, `d`). A bare `"0"` is accepted.
/// A leading `+` is allowed; a leading `-` is only accepted for zero.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    if body.is_empty() {
        return Err(DurationError::Empty);
    }
    if body == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = body;
    while !rest.is_empty() {
        let offset = s.len() - rest.len();

        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(DurationError::MissingNumber(offset));
        }
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(number.to_string()));
        }

        let scale = unit_scale(unit)?;
        total = total
            .checked_add(scaled(number, scale)?)
            .ok_or(DurationError::OutOfRange)?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(DurationError::Negative);
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| DurationError::OutOfRange)?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

fn unit_scale(unit: &str) -> Result<u128, DurationError> {
    Ok(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        "d" => 86_400 * NANOS_PER_SEC,
        _ => return Err(DurationError::UnknownUnit(unit.to_string())),
    })
}

/// Nanoseconds for `number` units of `scale` nanoseconds each, exact for the
/// fractional part up to 18 digits.
fn scaled(number: &str, scale: u128) -> Result<u128, DurationError> {
    let invalid = || DurationError::InvalidNumber(number.to_string());

    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut nanos = whole.checked_mul(scale).ok_or(DurationError::OutOfRange)?;

    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for digit in frac.bytes().take(18) {
        numerator = numerator * 10 + u128::from(digit - b'0');
        denominator *= 10;
    }
    nanos = nanos
        .checked_add(numerator * scale / denominator)
        .ok_or(DurationError::OutOfRange)?;
    Ok(nanos)
}

/// Parse an RFC 3339 (ISO-8601 with offset) timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_literals() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(s), Ok(true), "{s}");
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(s), Ok(false), "{s}");
        }
        for s in ["", "junk", "yes", "tRUE", " true"] {
            assert!(parse_bool(s).is_err(), "{s}");
        }
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("1500us").unwrap(), Duration::from_micros(1500));
        assert_eq!(parse_duration("1500µs").unwrap(), Duration::from_micros(1500));
        assert_eq!(parse_duration("42ns").unwrap(), Duration::from_nanos(42));
    }

    #[test]
    fn test_parse_duration_compound_and_fractional() {
        assert_eq!(
            parse_duration("2h45m").unwrap(),
            Duration::from_secs(2 * 3600 + 45 * 60)
        );
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(
            parse_duration("1m500ms").unwrap(),
            Duration::from_millis(60_500)
        );
        assert_eq!(parse_duration("+3s").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_parse_duration_zero() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_errors() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert_eq!(parse_duration("10"), Err(DurationError::MissingUnit("10".into())));
        assert_eq!(parse_duration("5y"), Err(DurationError::UnknownUnit("y".into())));
        assert_eq!(parse_duration("s"), Err(DurationError::MissingNumber(0)));
        assert_eq!(parse_duration("-5s"), Err(DurationError::Negative));
        assert_eq!(
            parse_duration("1.2.3s"),
            Err(DurationError::InvalidNumber("1.2.3".into()))
        );
        assert_eq!(parse_duration("."), Err(DurationError::InvalidNumber(".".into())));
    }

    #[test]
    fn test_parse_duration_fraction_past_u128() {
        // The whole part fits in u128 nanoseconds; the fraction pushes it over.
        assert_eq!(
            parse_duration("3938453320844195178974243.999999999999999999d"),
            Err(DurationError::OutOfRange)
        );
        assert_eq!(
            parse_duration("99999999999999999999999999999999999999d"),
            Err(DurationError::OutOfRange)
        );
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00+02:00");
        assert!(parse_timestamp("2024-03-01").is_err());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
