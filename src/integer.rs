//! Bounded integer parsing for numeric document fields.

use crate::issue::{json_kind, FieldPath, Issue, IssueKind, Report, Validated};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static HEX_U16: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{4}$").unwrap());

/// Reads a JSON number as an integer. `4.0` counts, `4.5` does not.
pub fn read_integer(value: &Value, path: &FieldPath) -> Validated<i128> {
    let Value::Number(n) = value else {
        return Err(Report::single(Issue::type_mismatch(
            path,
            "an integer",
            value,
        )));
    };

    if let Some(i) = n.as_i64() {
        return Ok(i as i128);
    }
    if let Some(u) = n.as_u64() {
        return Ok(u as i128);
    }

    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e18 => Ok(f as i128),
        _ => Err(Report::single(
            Issue::new(IssueKind::Type, path, format!("expected an integer, found {}", n))
                .with_input(value.clone()),
        )),
    }
}

/// Accepts an integer in `min..=max`.
pub fn parse_bounded(value: &Value, path: &FieldPath, min: i128, max: i128) -> Validated<i128> {
    let n = read_integer(value, path)?;
    if n < min || n > max {
        return Err(Report::single(
            Issue::new(
                IssueKind::Range,
                path,
                format!("{} is out of range, expected {} to {}", n, min, max),
            )
            .with_input(value.clone()),
        ));
    }
    Ok(n)
}

/// Accepts an integer in `[0, 2^bits - 1]`.
pub fn parse_uint(value: &Value, path: &FieldPath, bits: u32) -> Validated<u64> {
    debug_assert!((1..=64).contains(&bits));
    let max = (1i128 << bits) - 1;
    parse_bounded(value, path, 0, max).map(|n| n as u64)
}

pub fn parse_u8(value: &Value, path: &FieldPath) -> Validated<u8> {
    parse_uint(value, path, 8).map(|n| n as u8)
}

pub fn parse_u16(value: &Value, path: &FieldPath) -> Validated<u16> {
    parse_uint(value, path, 16).map(|n| n as u16)
}

/// Accepts a 16-bit integer or a string of the form `0xNNNN`.
pub fn parse_hex_u16(value: &Value, path: &FieldPath) -> Validated<u16> {
    match value {
        Value::Number(_) => parse_u16(value, path),
        Value::String(s) => {
            let format_issue = || {
                Report::single(
                    Issue::new(
                        IssueKind::Format,
                        path,
                        format!("'{}' is not a 16-bit hex literal like 0x1234", s),
                    )
                    .with_input(value.clone()),
                )
            };
            if !HEX_U16.is_match(s) {
                return Err(format_issue());
            }
            u16::from_str_radix(&s[2..], 16).map_err(|_| format_issue())
        }
        other => Err(Report::single(
            Issue::new(
                IssueKind::Type,
                path,
                format!(
                    "expected an integer or a 0xNNNN string, found {}",
                    json_kind(other)
                ),
            )
            .with_input(other.clone()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> FieldPath {
        FieldPath::root().key("value")
    }

    #[test]
    fn test_u8_bounds() {
        assert_eq!(parse_u8(&json!(0), &path()).unwrap(), 0);
        assert_eq!(parse_u8(&json!(255), &path()).unwrap(), 255);
        assert!(parse_u8(&json!(256), &path()).is_err());
        assert!(parse_u8(&json!(-1), &path()).is_err());
    }

    #[test]
    fn test_integral_float_is_accepted() {
        assert_eq!(parse_u8(&json!(12.0), &path()).unwrap(), 12);
        let err = parse_u8(&json!(12.5), &path()).unwrap_err();
        assert!(err.has_kind(IssueKind::Type));
    }

    #[test]
    fn test_hex_upper_and_lower() {
        assert_eq!(parse_hex_u16(&json!("0xabcd"), &path()).unwrap(), 0xABCD);
        assert_eq!(parse_hex_u16(&json!("0xABCD"), &path()).unwrap(), 0xABCD);
    }
}
