//! Phase 1: Scanner
//!
//! The scanner walks the source once and produces two parallel arrays:
//! - Tokens, each borrowing its text from the source
//! - Lines, each owning a contiguous, inclusive range of tokens and
//!   classified by the token that opens it
//!
//! Every line ends with a newline token. When the source does not end with
//! a newline one is synthesized at the end of input.

use std::ops::RangeInclusive;

use crate::chars::{
    is_digit, is_name_continuation, is_name_start, is_quote, is_separator, is_sign,
    is_whitespace,
};
use crate::error::{ErrorKind, ParseError, Result, Warning, Warnings};

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Punctuation: `-`, `:`, `#`, `[`, `]`, `,`, `.` and the line terminator.
    SingleCharacter,
    Identifier,
    /// Quoted text (delimiters included) or an unquoted value after `:`.
    LiteralString,
    LiteralNumber,
    /// Comment body after `#`, without the newline.
    Comment,
    FileSectionBegin,
    FileSectionEnd,
}

/// A lexical unit borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offset into the source.
    pub pos: usize,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    /// Byte length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True for the single-character token `c`.
    pub fn is_char(&self, c: char) -> bool {
        self.kind == TokenKind::SingleCharacter
            && self.text.len() == c.len_utf8()
            && self.text.starts_with(c)
    }

    /// True for the line terminator or a comment marker, either of which ends a value region.
    pub(crate) fn ends_value(&self) -> bool {
        self.is_char('\n') || self.is_char('#')
    }
}

/// Classification of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    Comment,
    FileSection,
    DictionaryEntry,
    ListEntry,
}

impl LineKind {
    /// Lines of this kind never produce tree nodes.
    pub fn is_unused(self) -> bool {
        matches!(self, LineKind::Empty | LineKind::Comment | LineKind::FileSection)
    }
}

/// Facts noticed about a line while tokenizing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTraits {
    pub has_dictionary_entry: bool,
    pub has_inline_collection: bool,
}

/// One physical source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Count of leading spaces and tabs.
    pub indent: usize,
    pub first_token: usize,
    /// Inclusive; always the line's newline token.
    pub last_token: usize,
    pub kind: LineKind,
    pub traits: LineTraits,
}

impl Line {
    pub fn token_range(&self) -> RangeInclusive<usize> {
        self.first_token..=self.last_token
    }
}

/// Tokens and lines of one source text.
#[derive(Debug, Clone)]
pub struct ScanResult<'a> {
    pub source: &'a str,
    pub tokens: Vec<Token<'a>>,
    pub lines: Vec<Line>,
}

/// Tokenize source text into tokens and classified lines.
///
/// A NUL character ends the text. Warnings are appended to `warnings` and
/// are kept even when an error is returned.
pub fn tokenize<'a>(source: &'a str, warnings: &mut Warnings) -> Result<ScanResult<'a>> {
    if source.is_empty() {
        warnings.push(Warning::EmptyInput);
        return Ok(ScanResult {
            source,
            tokens: Vec::new(),
            lines: Vec::new(),
        });
    }

    let mut scanner = Scanner::new(source, warnings);
    let result = scanner.run();
    if let Err(err) = &result {
        tracing::debug!(%err, "tokenize failed");
    }
    result?;

    if scanner.tokens.is_empty() {
        scanner.warnings.push(Warning::NoTokens);
    }
    tracing::debug!(
        tokens = scanner.tokens.len(),
        lines = scanner.lines.len(),
        "tokenized"
    );

    Ok(ScanResult {
        source,
        tokens: scanner.tokens,
        lines: scanner.lines,
    })
}

struct Scanner<'a, 'w> {
    source: &'a str,
    bytes: &'a [u8],
    /// End of text: the first NUL or the source length.
    end: usize,
    pos: usize,
    tokens: Vec<Token<'a>>,
    lines: Vec<Line>,
    line_start: usize,
    line_first_token: usize,
    indent: usize,
    traits: LineTraits,
    in_collection: bool,
    warnings: &'w mut Warnings,
}

impl<'a, 'w> Scanner<'a, 'w> {
    fn new(source: &'a str, warnings: &'w mut Warnings) -> Self {
        let bytes = source.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Self {
            source,
            bytes,
            end,
            pos: 0,
            tokens: Vec::new(),
            lines: Vec::new(),
            line_start: 0,
            line_first_token: 0,
            indent: 0,
            traits: LineTraits::default(),
            in_collection: false,
            warnings,
        }
    }

    fn run(&mut self) -> Result<()> {
        self.begin_line();
        while self.pos < self.end {
            let c = self.bytes[self.pos];
            match c {
                b'\n' => {
                    self.push(self.pos, 1, TokenKind::SingleCharacter);
                    self.pos += 1;
                    self.finish_line()?;
                    self.begin_line();
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'#' => self.consume_comment(),
                b'\'' | b'"' => self.consume_quoted()?,
                b'{' | b'}' => return Err(self.error_here(ErrorKind::InlineDictionary)),
                b'[' => {
                    if !self.is_valid_inline_collection() {
                        return Err(self.error_here(ErrorKind::InvalidInlineCollection));
                    }
                    self.traits.has_inline_collection = true;
                    self.in_collection = true;
                    self.push_single();
                }
                b']' | b',' => {
                    if !self.in_collection {
                        return Err(self.error_here(ErrorKind::InvalidInlineCollection));
                    }
                    if c == b']' {
                        self.in_collection = false;
                    }
                    self.push_single();
                }
                b'-' if self.at_line_start() => self.consume_dash()?,
                b'.' if self.at_line_start() && self.marker_at(b"...") => {
                    self.push(self.pos, 3, TokenKind::FileSectionEnd);
                    self.pos += 3;
                }
                b':' => {
                    self.traits.has_dictionary_entry = true;
                    self.push_single();
                }
                b'.' => self.push_single(),
                c if is_name_start(c) => {
                    if self.follows_colon() {
                        self.consume_unquoted_value();
                    } else {
                        self.consume_identifier();
                    }
                }
                _ => self.consume_number()?,
            }
        }

        if self.tokens.len() > self.line_first_token {
            self.warnings.push(Warning::MissingTrailingNewline);
            self.tokens.push(Token {
                text: "\n",
                pos: self.end,
                kind: TokenKind::SingleCharacter,
            });
            self.finish_line()?;
        }
        Ok(())
    }

    /// Start a new line: measure its indent.
    fn begin_line(&mut self) {
        self.line_start = self.pos;
        self.line_first_token = self.tokens.len();
        self.traits = LineTraits::default();
        self.in_collection = false;
        self.indent = 0;

        let mut tabs = false;
        while self.pos < self.end {
            match self.bytes[self.pos] {
                b' ' => self.indent += 1,
                b'\t' => {
                    self.indent += 1;
                    tabs = true;
                }
                b'\r' => {}
                _ => break,
            }
            self.pos += 1;
        }
        if tabs {
            self.warnings.push(Warning::TabsUsedAsIndent {
                line: self.lines.len(),
            });
        }
    }

    /// Classify the line just terminated by a newline token.
    fn finish_line(&mut self) -> Result<()> {
        let first = self.line_first_token;
        let last = self.tokens.len() - 1;
        let head = self.tokens[first];
        let newline_pos = self.tokens[last].pos;

        let kind = match head.kind {
            TokenKind::SingleCharacter => match head.text.as_bytes().first() {
                Some(b'\n') => LineKind::Empty,
                Some(b'#') => LineKind::Comment,
                Some(b'-') => LineKind::ListEntry,
                _ => {
                    let c = head.text.chars().next().unwrap_or('\0');
                    let kind = ErrorKind::UnhandledKeywordCharacter(c);
                    return Err(self.error_span(kind, newline_pos));
                }
            },
            TokenKind::FileSectionBegin | TokenKind::FileSectionEnd => LineKind::FileSection,
            TokenKind::Identifier => LineKind::DictionaryEntry,
            _ => return Err(self.error_span(ErrorKind::UndefinedLineType, newline_pos)),
        };

        tracing::trace!(line = self.lines.len(), ?kind, indent = self.indent, "line");
        self.lines.push(Line {
            indent: self.indent,
            first_token: first,
            last_token: last,
            kind,
            traits: self.traits,
        });
        Ok(())
    }

    fn consume_comment(&mut self) {
        self.push_single();
        let start = self.pos;
        while self.pos < self.end && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        let mut stop = self.pos;
        if stop > start && self.bytes[stop - 1] == b'\r' {
            stop -= 1;
        }
        if stop > start {
            self.push(start, stop - start, TokenKind::Comment);
        }
    }

    fn consume_quoted(&mut self) -> Result<()> {
        let start = self.pos;
        let quote = self.bytes[start];
        let mut i = start + 1;
        while i < self.end {
            match self.bytes[i] {
                b'\\' if i + 1 < self.end && is_quote(self.bytes[i + 1]) => i += 2,
                b'\n' => break,
                c if c == quote => {
                    self.push(start, i + 1 - start, TokenKind::LiteralString);
                    self.pos = i + 1;
                    return Ok(());
                }
                _ => i += 1,
            }
        }
        Err(self.error_here(ErrorKind::UnterminatedString))
    }

    /// A `-` opening a line: section marker, list marker, or a signed number.
    fn consume_dash(&mut self) -> Result<()> {
        if self.marker_at(b"---") {
            self.push(self.pos, 3, TokenKind::FileSectionBegin);
            self.pos += 3;
        } else if self.boundary_at(self.pos + 1) {
            self.push_single();
        } else {
            self.consume_number()?;
        }
        Ok(())
    }

    fn consume_identifier(&mut self) {
        let start = self.pos;
        let mut i = start + 1;
        while i < self.end && (is_name_continuation(self.bytes[i]) || is_separator(self.bytes[i])) {
            i += 1;
        }
        while i > start + 1 && is_separator(self.bytes[i - 1]) {
            i -= 1;
        }
        self.push(start, i - start, TokenKind::Identifier);
        self.pos = i;
    }

    /// An unquoted scalar after `:` runs to a comment or the end of the line.
    fn consume_unquoted_value(&mut self) {
        let start = self.pos;
        let mut i = start;
        while i < self.end && self.bytes[i] != b'#' && self.bytes[i] != b'\n' {
            i += 1;
        }
        while i > start + 1 && is_whitespace(self.bytes[i - 1]) {
            i -= 1;
        }
        self.push(start, i - start, TokenKind::LiteralString);
        self.pos = i;
    }

    fn consume_number(&mut self) -> Result<()> {
        let stop = consume_number_or_sign(self.bytes, self.pos, self.end);
        if stop == self.pos {
            return Err(self.error_here(ErrorKind::InvalidNumericLiteral));
        }
        self.push(self.pos, stop - self.pos, TokenKind::LiteralNumber);
        self.pos = stop;
        Ok(())
    }

    /// Check the rest of the line against `[ elem, elem, ... ]` followed only
    /// by whitespace. Elements are runs of name or sign characters.
    fn is_valid_inline_collection(&self) -> bool {
        let (bytes, end) = (self.bytes, self.end);
        let skip_separators = |mut i: usize| {
            while i < end && is_separator(bytes[i]) {
                i += 1;
            }
            i
        };

        let mut i = self.pos + 1;
        loop {
            i = skip_separators(i);
            if i >= end {
                return false;
            }
            if bytes[i] == b']' {
                i += 1;
                break;
            }
            let element = i;
            while i < end && (is_name_continuation(bytes[i]) || is_sign(bytes[i])) {
                i += 1;
            }
            if i == element {
                return false;
            }
            i = skip_separators(i);
            if i >= end {
                return false;
            }
            match bytes[i] {
                b',' => i += 1,
                b']' => {
                    i += 1;
                    break;
                }
                _ => return false,
            }
        }

        while i < end && matches!(bytes[i], b' ' | b'\t' | b'\r') {
            i += 1;
        }
        i >= end || bytes[i] == b'\n'
    }

    fn at_line_start(&self) -> bool {
        self.tokens.len() == self.line_first_token
    }

    fn follows_colon(&self) -> bool {
        self.tokens.len() > self.line_first_token
            && self.tokens.last().is_some_and(|t| t.is_char(':'))
    }

    /// `marker` at the current position, followed by whitespace or end of text.
    fn marker_at(&self, marker: &[u8]) -> bool {
        self.bytes[self.pos..self.end].starts_with(marker)
            && self.boundary_at(self.pos + marker.len())
    }

    fn boundary_at(&self, i: usize) -> bool {
        i >= self.end || is_whitespace(self.bytes[i])
    }

    fn push(&mut self, pos: usize, len: usize, kind: TokenKind) {
        let source = self.source;
        self.tokens.push(Token {
            text: &source[pos..pos + len],
            pos,
            kind,
        });
    }

    fn push_single(&mut self) {
        self.push(self.pos, 1, TokenKind::SingleCharacter);
        self.pos += 1;
    }

    fn error_here(&self, kind: ErrorKind) -> ParseError {
        self.error_span(kind, self.pos)
    }

    fn error_span(&self, kind: ErrorKind, pos: usize) -> ParseError {
        ParseError::at(kind, self.lines.len(), self.source, self.line_start, pos)
    }
}

/// Consume a number or a lone sign starting at `pos`.
///
/// Returns the end of the literal, or `pos` when no valid literal starts
/// there. A name character directly after the digits invalidates it.
pub(crate) fn consume_number_or_sign(bytes: &[u8], pos: usize, end: usize) -> usize {
    let bytes = &bytes[..end];
    let mut i = pos;
    if i < end && is_sign(bytes[i]) {
        i += 1;
    }

    let hex = bytes.get(i) == Some(&b'0')
        && matches!(bytes.get(i + 1), Some(b'x' | b'X'))
        && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
    if hex {
        i += 2;
        while i < end && bytes[i].is_ascii_hexdigit() {
            i += 1;
        }
    } else {
        let mut seen_dot = false;
        while i < end {
            if is_digit(bytes[i]) {
                i += 1;
            } else if bytes[i] == b'.' && !seen_dot {
                seen_dot = true;
                i += 1;
            } else {
                break;
            }
        }
    }

    if i == pos || (i < end && is_name_continuation(bytes[i])) {
        return pos;
    }
    i
}
