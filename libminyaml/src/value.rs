//! Typed scalar decoding and generic value projection.

use std::fmt;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use thiserror::Error;

use crate::document::{unquote, Document};
use crate::scanner::{Token, TokenKind};
use crate::tree::Node;

/// Strict decoding of a single value token.
pub trait FromScalar: Sized {
    fn from_scalar(token: &Token<'_>) -> Option<Self>;
}

/// Parse a numeric literal: optional sign, then decimal digits or `0x` hex.
fn parse_integer(token: &Token<'_>) -> Option<BigInt> {
    if token.kind != TokenKind::LiteralNumber {
        return None;
    }
    let text = token.text;
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

macro_rules! impl_from_scalar_int {
    ($($ty:ty => $to:ident),* $(,)?) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(token: &Token<'_>) -> Option<Self> {
                    parse_integer(token)?.$to()
                }
            }
        )*
    };
}

impl_from_scalar_int!(
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
);

impl FromScalar for BigInt {
    fn from_scalar(token: &Token<'_>) -> Option<Self> {
        parse_integer(token)
    }
}

impl FromScalar for f64 {
    fn from_scalar(token: &Token<'_>) -> Option<Self> {
        if token.kind != TokenKind::LiteralNumber {
            return None;
        }
        if let Some(n) = parse_integer(token) {
            return n.to_f64();
        }
        token.text.parse().ok()
    }
}

impl FromScalar for bool {
    fn from_scalar(token: &Token<'_>) -> Option<Self> {
        match token.kind {
            TokenKind::Identifier | TokenKind::LiteralString => parse_bool(token.text),
            _ => None,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["y", "yes", "true", "on"];
    const FALSE: [&str; 4] = ["n", "no", "false", "off"];
    if TRUE.iter().any(|t| text.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|f| text.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// Error projecting a subtree into a [`Value`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Children of one node mix `key: value` entries and `- value` items.
    #[error("Mixed keyed and list entries under \"{0}\"")]
    MixedEntries(String),

    /// Two sibling entries share a key. Lookups only ever see the first.
    #[error("Duplicate key \"{0}\"")]
    DuplicateKey(String),
}

/// A document subtree as generic data.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// A key with an empty value.
    Null,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Entries in source order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Project the subtree at `node`.
    ///
    /// Numbers become integers or floats, yes/no style words become
    /// booleans, quoted text loses its quotes, and everything else is a
    /// string. A node's children become an array when none has a key and
    /// an object when all have one. Sibling keys must be unique.
    pub fn from_node(doc: &Document<'_>, node: &Node) -> Result<Value, ValueError> {
        if let Some(token) = doc.value_token(node) {
            return Ok(scalar(token));
        }
        if !node.has_children() {
            return Ok(Value::Null);
        }

        let keyed = doc.children(node).filter(|c| c.key.is_some()).count();
        if keyed == 0 {
            let items = doc
                .children(node)
                .map(|child| Value::from_node(doc, child))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        } else if keyed == node.num_children {
            let mut entries: Vec<(String, Value)> = Vec::with_capacity(keyed);
            for child in doc.children(node) {
                let key = doc.read_key(child);
                if entries.iter().any(|(seen, _)| seen == key) {
                    return Err(ValueError::DuplicateKey(key.to_string()));
                }
                entries.push((key.to_string(), Value::from_node(doc, child)?));
            }
            Ok(Value::Object(entries))
        } else {
            Err(ValueError::MixedEntries(doc.read_key(node).to_string()))
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up the first entry named `key` in an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

fn scalar(token: &Token<'_>) -> Value {
    match token.kind {
        TokenKind::LiteralNumber => {
            if let Some(n) = BigInt::from_scalar(token) {
                Value::Integer(n)
            } else if let Some(f) = f64::from_scalar(token) {
                Value::Float(f)
            } else {
                Value::String(token.text.to_string())
            }
        }
        TokenKind::LiteralString if unquote(token.text).len() != token.text.len() => {
            Value::String(unescape(unquote(token.text)))
        }
        _ => match bool::from_scalar(token) {
            Some(b) => Value::Bool(b),
            None => Value::String(token.text.to_string()),
        },
    }
}

/// Resolve `\'` and `\"`, the only escapes quoted text recognizes.
fn unescape(text: &str) -> String {
    text.replace("\\\"", "\"").replace("\\'", "'")
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
