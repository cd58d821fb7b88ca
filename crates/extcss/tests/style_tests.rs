//! Tests for declaration block parsing.

use extcss::style::find_delimiter;
use extcss::{StyleDeclaration, StyleError, parse_style_block};

/// Helper to parse a block and flatten it into pairs.
fn pairs(block: &str) -> Vec<(String, String)> {
    parse_style_block(block, false)
        .unwrap()
        .into_iter()
        .map(|StyleDeclaration { property, value }| (property, value))
        .collect()
}

#[test]
fn test_declarations_in_source_order() {
    assert_eq!(
        pairs(" display: none; top: 0 !important "),
        [
            ("display".to_string(), "none".to_string()),
            ("top".to_string(), "0 !important".to_string()),
        ]
    );
}

#[test]
fn test_property_names_are_lowercased() {
    assert_eq!(pairs("COLOR: Red"), [("color".to_string(), "Red".to_string())]);
}

#[test]
fn test_empty_declarations_are_skipped() {
    assert_eq!(pairs(";; a: b;;; c: d;"), [
        ("a".to_string(), "b".to_string()),
        ("c".to_string(), "d".to_string()),
    ]);
}

#[test]
fn test_values_keep_quoted_and_parenthesized_delimiters() {
    assert_eq!(
        pairs("content: \"a;b:c\"; background: url(data:image/png;base64,AA)"),
        [
            ("content".to_string(), "\"a;b:c\"".to_string()),
            ("background".to_string(), "url(data:image/png;base64,AA)".to_string()),
        ]
    );
}

#[test]
fn test_missing_value() {
    assert_eq!(
        parse_style_block(" display: ", false),
        Err(StyleError::MissingValue {
            property: "display".to_string()
        })
    );
    assert!(matches!(
        parse_style_block("a: b; color: ; c: d", false),
        Err(StyleError::MissingValue { property }) if property == "color"
    ));
}

#[test]
fn test_missing_property() {
    assert!(matches!(
        parse_style_block(": red", false),
        Err(StyleError::MissingProperty { .. })
    ));
}

#[test]
fn test_unclosed_declaration() {
    assert_eq!(
        parse_style_block("a: b; color", false),
        Err(StyleError::UnclosedDeclaration {
            declaration: "color".to_string()
        })
    );
}

#[test]
fn test_empty_block_needs_remove() {
    assert_eq!(parse_style_block("  ; ", false), Err(StyleError::EmptyDeclarationBlock));
    assert_eq!(parse_style_block("", true), Ok(Vec::new()));
}

#[test]
fn test_find_delimiter() {
    assert_eq!(find_delimiter(r"a\;b;c", &[';']), Some((4, ';')));
    assert_eq!(find_delimiter("(a;b)", &[';']), None);
}
