//! Error and warning types for minyaml parsing.

use thiserror::Error;

/// Result type for minyaml parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Namespace prefixed to rendered diagnostics when none is configured.
pub const DEFAULT_NAMESPACE: &str = "minyaml";

/// Parse context carrying the diagnostic namespace.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub namespace: String,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.unwrap_or(DEFAULT_NAMESPACE).to_string(),
        }
    }

    /// Render an error as a single namespaced diagnostic line.
    ///
    /// Inline dictionary and inline collection reasons carry the namespace
    /// a second time, matching existing consumers of these diagnostics.
    pub fn render_error(&self, err: &ParseError) -> String {
        if err.kind.repeats_namespace() {
            format!(
                "{ns} : Could not parse line : [{}] : [{}] <-- parser position on error. \
                 Reason : {ns} : {}\n",
                err.line,
                err.context,
                err.kind,
                ns = self.namespace,
            )
        } else {
            format!("{} : {}\n", self.namespace, err)
        }
    }

    /// Render warnings in emission order, one namespaced line each.
    pub fn render_warnings(&self, warnings: &Warnings) -> String {
        warnings
            .iter()
            .map(|w| format!("{} : {}\n", self.namespace, w))
            .collect()
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Reason a document was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Unterminated string")]
    UnterminatedString,

    #[error("Unhandled keyword character : {0}")]
    UnhandledKeywordCharacter(char),

    #[error("Inline dictionaries are not supported")]
    InlineDictionary,

    #[error(r"Inline collection is not in valid regex format - ^\[(\s*(\d|\w)+,?)*\s*\]\s*\n")]
    InvalidInlineCollection,

    #[error("Invalid numeric literal")]
    InvalidNumericLiteral,

    /// A line starts with a token that cannot begin any line shape.
    #[error("Internal error - undefined line type")]
    UndefinedLineType,

    #[error("Invalid indentation")]
    InvalidIndentation,

    /// Something other than a comment follows a line's value.
    #[error("Unexpected token after value")]
    UnexpectedToken,
}

impl ErrorKind {
    fn repeats_namespace(&self) -> bool {
        matches!(
            self,
            ErrorKind::InlineDictionary | ErrorKind::InvalidInlineCollection
        )
    }
}

/// Fatal parse error.
///
/// `line` is zero based. `context` is the slice of source from the anchor
/// of the failing line up to and including the character at fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not parse line : [{line}] : [{context}] <-- parser position on error. Reason : {kind}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub line: usize,
    pub context: String,
}

impl ParseError {
    /// Build an error whose context spans `source[start..=pos]`.
    pub(crate) fn at(kind: ErrorKind, line: usize, source: &str, start: usize, pos: usize) -> Self {
        Self {
            kind,
            line,
            context: snippet(source, start, pos),
        }
    }
}

/// Source text from `start` through the character at `pos`, clamped to the input.
fn snippet(source: &str, start: usize, pos: usize) -> String {
    let len = source.len();
    let end = match source.get(pos..).and_then(|rest| rest.chars().next()) {
        Some(c) => pos + c.len_utf8(),
        None => (pos + 1).min(len),
    };
    let start = start.min(end);
    match source.get(start..end) {
        Some(text) => text.to_string(),
        None => String::from_utf8_lossy(&source.as_bytes()[start..end]).into_owned(),
    }
}

/// Non-fatal condition noticed while parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("input text is empty")]
    EmptyInput,

    #[error("text tokenized to 0 tokens")]
    NoTokens,

    #[error("Tabs used as indent at line : {line}")]
    TabsUsedAsIndent { line: usize },

    #[error("text does not end with newline")]
    MissingTrailingNewline,

    #[error("Text has no data")]
    NoData,
}

/// Warnings accumulated across the phases of one parse.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, warning: Warning) {
        tracing::debug!(%warning, "minyaml warning");
        self.0.push(warning);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.0
    }

    /// Copy of the warnings from index `from` on.
    pub(crate) fn tail(&self, from: usize) -> Warnings {
        Warnings(self.0[from.min(self.0.len())..].to_vec())
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
