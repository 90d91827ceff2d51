//! Minimal YAML parser for metadata blocks embedded in compiled binaries.
//!
//! The accepted dialect is line oriented: `key : value` entries, `- value`
//! list items, single-line `[a, b]` collections, quoted strings, decimal and
//! hexadecimal numbers, comments, and `---`/`...` section markers. Nesting is
//! expressed by indentation only.
//!
//! # Parsing Pipeline
//!
//! Parsing runs in two phases and a third layer answers queries:
//!
//! 1. **Scanner**: Splits source text into tokens that borrow the source and
//!    classifies each line by its leading token.
//!
//! 2. **Tree Builder**: Uses line indentation to link lines into a node arena
//!    under a synthetic root.
//!
//! 3. **Document**: Read-only lookups, iteration, and strict typed reads over
//!    the arena.
//!
//! Errors abort the parse at the first problem. Warnings accumulate and never
//! abort.

pub mod chars;
mod debug;
mod document;
mod error;
mod scanner;
mod tree;
mod value;

pub use debug::DebugNode;
pub use document::{Children, Document};
pub use error::{
    ErrorKind, ParseContext, ParseError, Result, Warning, Warnings, DEFAULT_NAMESPACE,
};
pub use scanner::{tokenize, Line, LineKind, LineTraits, ScanResult, Token, TokenKind};
pub use tree::{build_tree, Node, NodeId, TokenId, ROOT};
pub use value::{FromScalar, Value, ValueError};

/// Parse a document from a string.
///
/// # Example
///
/// ```
/// use libminyaml::parse;
///
/// let doc = parse("simd : 16\n").unwrap();
/// let simd = doc.find_by_key_dfs("simd").unwrap();
/// assert_eq!(doc.read_value_checked::<u8>(simd), Some(16));
/// ```
pub fn parse(input: &str) -> Result<Document<'_>> {
    let mut warnings = Warnings::new();
    parse_collecting(input, &mut warnings)
}

/// Parse a document, appending warnings to `warnings`.
///
/// Warnings raised before an error are kept. On success the document also
/// carries a copy of them.
pub fn parse_collecting<'a>(input: &'a str, warnings: &mut Warnings) -> Result<Document<'a>> {
    let before = warnings.len();

    // Phase 1: Split source into tokens and lines
    let scan = scanner::tokenize(input, warnings)?;

    // Phase 2: Link lines into the node arena
    let nodes = tree::build_tree(&scan, warnings)?;

    Ok(Document::new(scan, nodes, warnings.tail(before)))
}

impl ParseContext {
    /// Parse and report diagnostics as namespaced text.
    ///
    /// The rendered error, if any, is appended to `errors` and rendered
    /// warnings to `warnings`. Returns the document on success.
    pub fn parse_reporting<'a>(
        &self,
        input: &'a str,
        errors: &mut String,
        warnings: &mut String,
    ) -> Option<Document<'a>> {
        let mut collected = Warnings::new();
        let result = parse_collecting(input, &mut collected);
        warnings.push_str(&self.render_warnings(&collected));
        match result {
            Ok(doc) => Some(doc),
            Err(err) => {
                errors.push_str(&self.render_error(&err));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reporting_success() {
        let ctx = ParseContext::new(Some("NEO::Yaml"));
        let (mut errors, mut warnings) = (String::new(), String::new());
        let doc = ctx
            .parse_reporting("a : 1", &mut errors, &mut warnings)
            .unwrap();
        assert_eq!(doc.nodes().len(), 2);
        assert!(errors.is_empty());
        assert_eq!(warnings, "NEO::Yaml : text does not end with newline\n");
    }

    #[test]
    fn test_parse_reporting_tokenizer_failure() {
        let ctx = ParseContext::new(Some("NEO::Yaml"));
        let (mut errors, mut warnings) = (String::new(), String::new());
        assert!(ctx
            .parse_reporting("\"aaaa", &mut errors, &mut warnings)
            .is_none());
        assert_eq!(
            errors,
            "NEO::Yaml : Could not parse line : [0] : [\"] <-- parser position on error. Reason : Unterminated string\n"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_reporting_tree_failure() {
        let ctx = ParseContext::default();
        let (mut errors, mut warnings) = (String::new(), String::new());
        let doc = ctx.parse_reporting(
            "\n    - red\n   - green\n  - blue\n",
            &mut errors,
            &mut warnings,
        );
        assert!(doc.is_none());
        assert_eq!(
            errors,
            "minyaml : Could not parse line : [2] : [- ] <-- parser position on error. Reason : Invalid indentation\n"
        );
    }

    #[test]
    fn test_warnings_survive_errors() {
        let mut warnings = Warnings::new();
        let err = parse_collecting("\tkey : {", &mut warnings).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InlineDictionary);
        assert_eq!(warnings.as_slice(), &[Warning::TabsUsedAsIndent { line: 0 }]);
    }

    #[test]
    fn test_document_carries_warnings() {
        let doc = parse("").unwrap();
        assert_eq!(doc.warnings().as_slice(), &[Warning::EmptyInput, Warning::NoData]);
    }
}
