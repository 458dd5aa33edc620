//! Canonical JSON encoding for deterministic hashing.
//!
//! This module implements the JSON Canonicalization Scheme (RFC 8785):
//! - Object members sorted by the UTF-16 code units of their keys
//! - No insignificant whitespace
//! - Minimal string escaping
//! - Floating point numbers serialized exactly as ECMAScript serializes a double
//!
//! Array order is preserved. Two structurally equal values always encode to
//! identical bytes regardless of how their maps were built, which is what makes
//! the SHA-256 of the encoding usable as a document identity.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::CanonicalizationError;

/// Maximum nesting of arrays and objects.
pub const MAX_DEPTH: usize = 128;

/// Encode a JSON value to canonical bytes.
pub fn canonicalize(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value, 0)?;
    Ok(buf)
}

/// Encode a JSON value to a canonical string.
pub fn canonicalize_to_string(value: &Value) -> Result<String, CanonicalizationError> {
    let bytes = canonicalize(value)?;
    String::from_utf8(bytes).map_err(|e| CanonicalizationError::Unrepresentable(e.to_string()))
}

/// Encode any serializable value to canonical bytes.
///
/// Fails if the value has no JSON form, e.g. a map with non-string keys.
pub fn canonicalize_serialize<T>(value: &T) -> Result<Vec<u8>, CanonicalizationError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)
        .map_err(|e| CanonicalizationError::Unrepresentable(e.to_string()))?;
    canonicalize(&value)
}

/// Order two object keys by their UTF-16 code units.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Recursively encode a JSON value.
fn encode_value_to(
    buf: &mut Vec<u8>,
    value: &Value,
    depth: usize,
) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(buf, n)?,
        Value::String(s) => encode_string(buf, s),
        Value::Array(items) => {
            let depth = descend(depth)?;
            encode_array(buf, items, depth)?;
        }
        Value::Object(map) => {
            let depth = descend(depth)?;
            encode_object(buf, map, depth)?;
        }
    }
    Ok(())
}

fn descend(depth: usize) -> Result<usize, CanonicalizationError> {
    let next = depth + 1;
    if next > MAX_DEPTH {
        return Err(CanonicalizationError::DepthExceeded(MAX_DEPTH));
    }
    Ok(next)
}

/// Encode an array, preserving element order.
fn encode_array(
    buf: &mut Vec<u8>,
    items: &[Value],
    depth: usize,
) -> Result<(), CanonicalizationError> {
    buf.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_value_to(buf, item, depth)?;
    }
    buf.push(b']');
    Ok(())
}

/// Encode an object canonically.
///
/// Members are sorted by UTF-16 key comparison, never by insertion order.
fn encode_object(
    buf: &mut Vec<u8>,
    map: &Map<String, Value>,
    depth: usize,
) -> Result<(), CanonicalizationError> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| compare_keys(a.0, b.0));

    buf.push(b'{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_string(buf, key);
        buf.push(b':');
        encode_value_to(buf, value, depth)?;
    }
    buf.push(b'}');
    Ok(())
}

/// Encode a string with the minimal escape set.
fn encode_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{08}' => buf.extend_from_slice(b"\\b"),
            '\u{0c}' => buf.extend_from_slice(b"\\f"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Encode a number.
///
/// Integers that fit in 64 bits are written exactly; everything else goes
/// through the ECMAScript double formatting.
fn encode_number(buf: &mut Vec<u8>, n: &Number) -> Result<(), CanonicalizationError> {
    if let Some(u) = n.as_u64() {
        buf.extend_from_slice(u.to_string().as_bytes());
    } else if let Some(i) = n.as_i64() {
        buf.extend_from_slice(i.to_string().as_bytes());
    } else if let Some(f) = n.as_f64() {
        buf.extend_from_slice(format_f64(f)?.as_bytes());
    } else {
        return Err(CanonicalizationError::Unrepresentable(n.to_string()));
    }
    Ok(())
}

/// Format a double the way ECMAScript `Number.prototype.toString` does.
///
/// The shortest round-trip digits come from Rust's `{:e}` formatting, which
/// are then laid out in plain or exponent notation according to the decimal
/// exponent.
pub fn format_f64(value: f64) -> Result<String, CanonicalizationError> {
    if !value.is_finite() {
        return Err(CanonicalizationError::NonFiniteNumber(value.to_string()));
    }
    if value == 0.0 {
        // Covers -0 as well.
        return Ok("0".to_string());
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .ok_or_else(|| CanonicalizationError::Unrepresentable(scientific.clone()))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| CanonicalizationError::Unrepresentable(scientific.clone()))?;
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let k = digits.len() as i32;
    let n = exponent + 1;

    let mut out = String::with_capacity(k as usize + 8);
    if value.is_sign_negative() {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let e = n - 1;
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        out.push_str(&e.abs().to_string());
    }

    Ok(out)
}
