//! Tests for the XPath subset the reference host evaluates.

use extcss::HostError;
use extcss::host::xpath::{XPath, evaluate};
use extcss_dom::{DomTree, NodeId};

const LIST: &str = r#"{"tag": "html", "children": [
    {"tag": "body", "children": [
        {"tag": "ul", "attrs": {"id": "feed"}, "children": [
            {"tag": "li", "attrs": {"class": "item"}, "children": ["First"]},
            {"tag": "li", "attrs": {"class": "item promoted"}, "children": ["Sponsored post"]},
            {"tag": "li", "attrs": {"class": "item"}, "children": ["Third"]}
        ]},
        {"tag": "div", "attrs": {"id": "footer"}, "children": ["Footer"]}
    ]}
]}"#;

/// Helper to evaluate from the document and describe the results.
fn select(tree: &DomTree, expression: &str) -> Vec<String> {
    select_from(tree, expression, NodeId::ROOT)
}

/// Helper to evaluate from `context` and describe the results.
fn select_from(tree: &DomTree, expression: &str, context: NodeId) -> Vec<String> {
    evaluate(tree, expression, context)
        .unwrap()
        .into_iter()
        .map(|id| tree.describe(id))
        .collect()
}

fn tree() -> DomTree {
    DomTree::from_json(LIST).unwrap()
}

#[test]
fn test_absolute_paths() {
    let tree = tree();
    assert_eq!(select(&tree, "/html/body/div"), ["div#footer"]);
    assert_eq!(select(&tree, "//li").len(), 3);
    assert_eq!(select(&tree, "/"), ["#document"]);
}

#[test]
fn test_attribute_predicates() {
    let tree = tree();
    assert_eq!(select(&tree, "//*[@id='feed']"), ["ul#feed"]);
    assert_eq!(select(&tree, "//li[@class!=\"item\"]"), ["li.item.promoted"]);
    assert_eq!(select(&tree, "//div[@id]"), ["div#footer"]);
}

#[test]
fn test_string_functions() {
    let tree = tree();
    assert_eq!(select(&tree, "//li[contains(., 'Sponsored')]"), ["li.item.promoted"]);
    assert_eq!(select(&tree, "//li[starts-with(text(), 'Th')]"), ["li.item"]);
    assert_eq!(select(&tree, "//li[contains(@class, 'promo') or text() = 'First']").len(), 2);
    assert_eq!(
        select(&tree, "//li[not(contains(@class, 'promoted')) and text() = 'Third']").len(),
        1
    );
}

#[test]
fn test_positional_predicates() {
    let tree = tree();
    let first = evaluate(&tree, "//ul/li[1]", NodeId::ROOT).unwrap();
    let last = evaluate(&tree, "//ul/li[last()]", NodeId::ROOT).unwrap();
    let after_first = evaluate(&tree, "//ul/li[position() > 1]", NodeId::ROOT).unwrap();
    assert_eq!(tree.text_content(first[0]), "First");
    assert_eq!(tree.text_content(last[0]), "Third");
    assert_eq!(after_first.len(), 2);
}

#[test]
fn test_relative_axes() {
    let tree = tree();
    let promoted = evaluate(&tree, "//li[contains(@class, 'promoted')]", NodeId::ROOT).unwrap()[0];

    assert_eq!(select_from(&tree, "..", promoted), ["ul#feed"]);
    assert_eq!(select_from(&tree, "../..", promoted), ["body"]);
    assert_eq!(select_from(&tree, "ancestor::*", promoted), ["html", "body", "ul#feed"]);
    assert_eq!(select_from(&tree, "following-sibling::li", promoted), ["li.item"]);
    assert_eq!(select_from(&tree, "preceding-sibling::*[1]", promoted), ["li.item"]);
    assert_eq!(select_from(&tree, "self::li", promoted), ["li.item.promoted"]);
    assert_eq!(select_from(&tree, "text()", promoted), ["#text"]);
}

#[test]
fn test_union_is_in_document_order() {
    let tree = tree();
    assert_eq!(select(&tree, "//div | //ul"), ["ul#feed", "div#footer"]);
}

#[test]
fn test_unsupported_syntax_is_rejected() {
    for expression in ["//div/@id", "following::div", "//li[count(a) > 1]", "//li[", "li)"] {
        assert!(
            matches!(XPath::parse(expression), Err(HostError::InvalidXPath { .. })),
            "{expression:?}"
        );
    }
}
