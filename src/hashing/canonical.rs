//! Canonical JSON encoding
//!
//! The encoding is byte-stable:
//! - object keys sorted (byte order), recursively
//! - no insignificant whitespace
//! - floats rounded to 9 decimal places, `-0` written as `0`
//! - floats with no fractional part written as integers
//! - array order preserved
//!
//! Two values that are logically equal produce identical bytes regardless of
//! the field order they were built or parsed with.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::errors::{HashError, HashResult};

/// Decimal places kept when normalizing floats.
pub const FLOAT_DECIMALS: i32 = 9;

/// Largest float magnitude still written as an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Serialize a value into canonical JSON bytes.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> HashResult<Vec<u8>> {
    let json = serde_json::to_value(value)
        .map_err(|e| HashError::serialization(format!("value is not representable as JSON: {}", e)))?;

    let mut out = String::with_capacity(256);
    write_value(&mut out, &json)?;
    Ok(out.into_bytes())
}

/// Return the canonical form of a JSON value.
///
/// Encoding the result with [`canonical_json`] yields the same bytes as
/// encoding the input.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(n) => Value::Number(normalize_number(n)),
        other => other.clone(),
    }
}

fn write_value(out: &mut String, value: &Value) -> HashResult<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&normalize_number(n).to_string()),
        Value::String(s) => write_string(out, s)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key)?;
                out.push(':');
                write_value(out, &map[key])?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) -> HashResult<()> {
    let quoted = serde_json::to_string(s)
        .map_err(|e| HashError::serialization(format!("string encoding failed: {}", e)))?;
    out.push_str(&quoted);
    Ok(())
}

fn normalize_number(n: &Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n.clone();
    }

    let Some(raw) = n.as_f64() else {
        return n.clone();
    };
    let scale = 10f64.powi(FLOAT_DECIMALS);
    // From 2^53 / 10^9 up, 9 decimals are below f64 precision and scaling
    // can overflow; such values pass through unrounded.
    let rounded = if raw.abs() < MAX_EXACT_INTEGER / scale {
        (raw * scale).round() / scale
    } else {
        raw
    };

    if rounded == 0.0 {
        return Number::from(0);
    }
    if rounded.fract() == 0.0 && rounded.abs() < MAX_EXACT_INTEGER {
        return Number::from(rounded as i64);
    }
    Number::from_f64(rounded).unwrap_or_else(|| n.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: &Value) -> String {
        String::from_utf8(canonical_json(value).unwrap()).unwrap()
    }

    #[test]
    fn test_keys_sorted_recursively() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [3, {"y": true, "x": null}]});
        assert_eq!(
            encode(&value),
            r#"{"a":[3,{"x":null,"y":true}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn test_float_normalization() {
        assert_eq!(encode(&json!(1.0)), "1");
        assert_eq!(encode(&json!(-0.0)), "0");
        assert_eq!(encode(&json!(0.1 + 0.2)), "0.3");
        assert_eq!(encode(&json!(0.1234567891234)), "0.123456789");
    }

    #[test]
    fn test_large_floats_keep_their_value() {
        assert_eq!(encode(&json!({"b": 1e300})), r#"{"b":1e300}"#);
        assert_eq!(encode(&json!(-1.7976931348623157e308)), "-1.7976931348623157e308");
        assert_eq!(encode(&json!(12345678.5)), "12345678.5");
        assert_ne!(encode(&json!(1e300)), encode(&json!(0)));
    }

    #[test]
    fn test_array_order_preserved() {
        assert_ne!(encode(&json!([1, 2])), encode(&json!([2, 1])));
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(encode(&json!("a\"b\n")), r#""a\"b\n""#);
    }

    #[test]
    fn test_canonicalize_is_a_fixed_point_of_encoding() {
        let value = json!({"weights": [0.30000000000000004, 2.0], "title": "t", "a": {"c": 1, "b": -0.0}});
        let canon = canonicalize(&value);
        assert_eq!(encode(&value), encode(&canon));
        assert_eq!(canonicalize(&canon), canon);
    }
}
