//! Character classes used by the tokenizer.
//!
//! Every syntactically meaningful character is ASCII, so the tokenizer walks
//! bytes and classifies them here. Bytes of multi-byte UTF-8 sequences never
//! match any class.

pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

pub fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

pub fn is_alphanumeric(c: u8) -> bool {
    is_letter(c) || is_digit(c)
}

/// Characters that may start a name identifier.
pub fn is_name_start(c: u8) -> bool {
    is_letter(c) || c == b'_'
}

/// Characters that may continue a name identifier.
pub fn is_name_continuation(c: u8) -> bool {
    is_alphanumeric(c) || matches!(c, b'_' | b'-' | b'.')
}

pub fn is_sign(c: u8) -> bool {
    c == b'+' || c == b'-'
}

pub fn is_quote(c: u8) -> bool {
    c == b'\'' || c == b'"'
}

/// Spaces and tabs that separate tokens within a line.
pub fn is_separator(c: u8) -> bool {
    c == b' ' || c == b'\t'
}
