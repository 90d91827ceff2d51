//! Property tests for the scanner and tree builder.

use libminyaml::{parse, tokenize, LineKind, Warnings};
use proptest::prelude::*;

/// Lines drawn from the accepted dialect, plus a few hostile characters.
fn metadata_line() -> impl Strategy<Value = String> {
    prop_oneof![
        ("[ ]{0,6}", "[a-z_][a-z0-9_]{0,8}", "[a-z0-9_ ]{0,8}")
            .prop_map(|(indent, key, value)| format!("{}{} : {}", indent, key, value.trim())),
        ("[ ]{0,6}", "-?[0-9]{1,4}").prop_map(|(indent, n)| format!("{}- {}", indent, n)),
        ("[ ]{0,6}", "[a-z]{1,5}").prop_map(|(indent, v)| format!("{}- '{}'", indent, v)),
        "[ ]{0,4}# [ -~]{0,12}",
        Just(String::new()),
        Just("---".to_string()),
        "[ -~\t]{0,16}",
    ]
}

fn metadata_text() -> impl Strategy<Value = String> {
    (prop::collection::vec(metadata_line(), 0..12), any::<bool>()).prop_map(|(lines, newline)| {
        let mut text = lines.join("\n");
        if newline {
            text.push('\n');
        }
        text
    })
}

proptest! {
    #[test]
    fn tokenize_never_panics(text in "\\PC{0,64}") {
        let mut warnings = Warnings::new();
        let _ = tokenize(&text, &mut warnings);
    }

    #[test]
    fn parse_never_panics(text in metadata_text()) {
        let _ = parse(&text);
    }

    #[test]
    fn line_ranges_are_contiguous(text in metadata_text()) {
        let mut warnings = Warnings::new();
        if let Ok(scan) = tokenize(&text, &mut warnings) {
            let mut next = 0;
            for line in &scan.lines {
                prop_assert_eq!(line.first_token, next);
                prop_assert!(line.first_token <= line.last_token);
                next = line.last_token + 1;
            }
            prop_assert_eq!(next, scan.tokens.len());
        }
    }

    #[test]
    fn every_line_ends_with_newline(text in metadata_text()) {
        let mut warnings = Warnings::new();
        if let Ok(scan) = tokenize(&text, &mut warnings) {
            for line in &scan.lines {
                prop_assert_eq!(scan.tokens[line.last_token].text, "\n");
            }
        }
    }

    #[test]
    fn tokens_borrow_their_source(text in metadata_text()) {
        let mut warnings = Warnings::new();
        if let Ok(scan) = tokenize(&text, &mut warnings) {
            for token in &scan.tokens {
                if token.pos < text.len() {
                    prop_assert_eq!(&text[token.pos..token.pos + token.len()], token.text);
                }
            }
        }
    }

    #[test]
    fn children_are_deeper_than_parents(text in metadata_text()) {
        if let Ok(doc) = parse(&text) {
            for node in doc.nodes().iter().skip(1) {
                let parent = doc.node(node.parent.unwrap()).unwrap();
                if parent.parent.is_some() {
                    prop_assert!(node.indent > parent.indent);
                }
            }
        }
    }

    #[test]
    fn one_node_per_used_line(text in metadata_text()) {
        if let Ok(doc) = parse(&text) {
            let has_collections = doc.lines().iter().any(|l| l.traits.has_inline_collection);
            let compact = doc
                .lines()
                .iter()
                .any(|l| l.kind == LineKind::ListEntry && l.traits.has_dictionary_entry);
            if !doc.is_empty() && !has_collections && !compact {
                let used = doc.lines().iter().filter(|l| !l.kind.is_unused()).count();
                prop_assert_eq!(doc.nodes().len(), used + 1);
            }
        }
    }
}
