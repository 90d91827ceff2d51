//! CBOR output: encode a projected document as CBOR and render CBOR as
//! diagnostic notation.
//!
//! Mapping:
//!   - Value::Null    -> CBOR null (simple value 22)
//!   - Value::Bool    -> CBOR bool (simple values 20/21)
//!   - Value::Integer -> CBOR integer (smallest encoding that fits)
//!   - Value::Float   -> CBOR float64 (never downgraded)
//!   - Value::String  -> CBOR text string
//!   - Value::Array   -> CBOR array
//!   - Value::Object  -> CBOR map with text keys, in source order
//!
//! Integers outside -2^64 ..= 2^64-1 are an error rather than bignum tags.

use std::fmt::Write as _;

use ciborium::value::Value as CborValue;
use libminyaml::Value;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

const SIMPLE_FALSE: u8 = 0xf4;
const SIMPLE_TRUE: u8 = 0xf5;
const SIMPLE_NULL: u8 = 0xf6;
const FLOAT64: u8 = 0xfb;

/// Encode a projected value as CBOR bytes.
///
/// Written by hand rather than through ciborium, which shrinks floats to
/// half or single precision whenever the value allows it.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), String> {
    match value {
        Value::Null => buf.push(SIMPLE_NULL),
        Value::Bool(b) => buf.push(if *b { SIMPLE_TRUE } else { SIMPLE_FALSE }),
        Value::Integer(n) => write_integer(buf, n)?,
        Value::Float(f) => {
            buf.push(FLOAT64);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => write_text(buf, s),
        Value::Array(items) => {
            write_head(buf, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Object(entries) => {
            write_head(buf, MAJOR_MAP, entries.len() as u64);
            for (key, item) in entries {
                write_text(buf, key);
                write_value(buf, item)?;
            }
        }
    }
    Ok(())
}

fn write_text(buf: &mut Vec<u8>, text: &str) {
    write_head(buf, MAJOR_TEXT, text.len() as u64);
    buf.extend_from_slice(text.as_bytes());
}

/// Major type in the high three bits, argument inline or in 1, 2, 4 or 8
/// trailing bytes.
fn write_head(buf: &mut Vec<u8>, major: u8, arg: u64) {
    let high = major << 5;
    if arg < 24 {
        buf.push(high | arg as u8);
    } else if let Ok(byte) = u8::try_from(arg) {
        buf.extend_from_slice(&[high | 24, byte]);
    } else if let Ok(short) = u16::try_from(arg) {
        buf.push(high | 25);
        buf.extend_from_slice(&short.to_be_bytes());
    } else if let Ok(word) = u32::try_from(arg) {
        buf.push(high | 26);
        buf.extend_from_slice(&word.to_be_bytes());
    } else {
        buf.push(high | 27);
        buf.extend_from_slice(&arg.to_be_bytes());
    }
}

/// Negative `n` is stored as `-1 - n`.
fn write_integer(buf: &mut Vec<u8>, n: &BigInt) -> Result<(), String> {
    let (major, arg) = if n.sign() == Sign::Minus {
        (MAJOR_NEGATIVE, (-n - 1u32).to_u64())
    } else {
        (MAJOR_UNSIGNED, n.to_u64())
    };
    let arg = arg.ok_or_else(|| {
        format!(
            "integer {} exceeds CBOR's native integer range (-2^64 to 2^64-1)",
            n
        )
    })?;
    write_head(buf, major, arg);
    Ok(())
}

/// Render CBOR bytes as diagnostic notation (RFC 8949 §8).
///
/// Works from the encoded bytes so the text reflects the wire encoding.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &value, 0);
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, value: &CborValue, indent: usize) {
    match value {
        CborValue::Null => out.push_str("null"),
        CborValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        CborValue::Integer(i) => {
            let _ = write!(out, "{}", i128::from(*i));
        }
        CborValue::Float(f) => diag_float(out, *f),
        CborValue::Text(s) => diag_text(out, s),
        CborValue::Bytes(bytes) => {
            out.push_str("h'");
            for byte in bytes {
                let _ = write!(out, "{:02x}", byte);
            }
            out.push('\'');
        }
        CborValue::Array(items) if items.is_empty() => out.push_str("[]"),
        CborValue::Array(items) if items.len() <= 5 && items.iter().all(is_scalar) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                diag_value(out, item, indent);
            }
            out.push(']');
        }
        CborValue::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                pad(out, indent + 2);
                diag_value(out, item, indent + 2);
                close_item(out, i + 1 == items.len());
            }
            pad(out, indent);
            out.push(']');
        }
        CborValue::Map(pairs) if pairs.is_empty() => out.push_str("{}"),
        CborValue::Map(pairs) => {
            out.push_str("{\n");
            for (i, (key, item)) in pairs.iter().enumerate() {
                pad(out, indent + 2);
                diag_value(out, key, indent + 2);
                out.push_str(": ");
                diag_value(out, item, indent + 2);
                close_item(out, i + 1 == pairs.len());
            }
            pad(out, indent);
            out.push('}');
        }
        CborValue::Tag(tag, inner) => {
            let _ = write!(out, "{}(", tag);
            diag_value(out, inner, indent);
            out.push(')');
        }
        other => {
            let _ = write!(out, "<?unknown {:?}>", other);
        }
    }
}

fn diag_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else if f == 0.0 && f.is_sign_negative() {
        out.push_str("-0.0");
    } else if f.fract() == 0.0 && f.abs() < 1e18 {
        let _ = write!(out, "{:.1}", f);
    } else {
        let text = f.to_string();
        out.push_str(&text);
        if !text.contains(['.', 'e', 'E']) {
            out.push_str(".0");
        }
    }
}

fn diag_text(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn close_item(out: &mut String, last: bool) {
    if !last {
        out.push(',');
    }
    out.push('\n');
}

fn is_scalar(value: &CborValue) -> bool {
    !matches!(
        value,
        CborValue::Array(_) | CborValue::Map(_) | CborValue::Tag(..)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use libminyaml::parse;

    fn project(text: &str) -> Value {
        let doc = parse(text).unwrap();
        Value::from_node(&doc, doc.root().unwrap()).unwrap()
    }

    #[test]
    fn test_integer_heads() {
        assert_eq!(encode(&Value::from(0)).unwrap(), [0x00]);
        assert_eq!(encode(&Value::from(23)).unwrap(), [0x17]);
        assert_eq!(encode(&Value::from(24)).unwrap(), [0x18, 0x18]);
        assert_eq!(encode(&Value::from(256)).unwrap(), [0x19, 0x01, 0x00]);
        assert_eq!(encode(&Value::from(-1)).unwrap(), [0x20]);
        assert_eq!(encode(&Value::from(-500)).unwrap(), [0x39, 0x01, 0xf3]);
    }

    #[test]
    fn test_float_stays_double() {
        let bytes = encode(&Value::Float(1.5)).unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], FLOAT64);
    }

    #[test]
    fn test_integer_out_of_range() {
        let value = project("big : 0x1FFFFFFFFFFFFFFFF\n");
        assert!(encode(&value).unwrap_err().contains("exceeds CBOR"));
    }

    #[test]
    fn test_map_keeps_source_order() {
        let value = project("b : 1\na : yes\n");
        assert_eq!(
            encode(&value).unwrap(),
            [0xa2, 0x61, b'b', 0x01, 0x61, b'a', SIMPLE_TRUE]
        );
    }

    #[test]
    fn test_diagnostic() {
        let value = project("name : k\nsizes : [8, 16]\nempty :\n");
        let bytes = encode(&value).unwrap();
        assert_eq!(
            diagnostic(&bytes).unwrap(),
            "{\n  \"name\": \"k\",\n  \"sizes\": [8, 16],\n  \"empty\": null\n}\n"
        );
    }
}
