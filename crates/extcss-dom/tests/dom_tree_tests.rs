//! Tests for DOM tree construction, traversal and JSON fixtures.

use extcss_dom::{DomTree, ElementData, NodeId, NodeType};
use serde_json::json;

/// Helper to create an element node, attach it and return its `NodeId`.
fn append(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(tag))
}

// ========== traversal ==========

#[test]
fn test_append_links_siblings() {
    let mut tree = DomTree::new();
    let parent = append(&mut tree, NodeId::ROOT, "div");
    let a = append(&mut tree, parent, "a");
    let b = append(&mut tree, parent, "b");
    let c = append(&mut tree, parent, "c");

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.following_siblings(a).collect::<Vec<_>>(), vec![b, c]);
    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
}

#[test]
fn test_descendants_are_in_document_order() {
    let mut tree = DomTree::new();
    let html = append(&mut tree, NodeId::ROOT, "html");
    let body = append(&mut tree, html, "body");
    let first = append(&mut tree, body, "div");
    let inner = append(&mut tree, first, "span");
    let second = append(&mut tree, body, "p");

    let order: Vec<NodeId> = tree.descendants(html).collect();
    assert_eq!(order, vec![body, first, inner, second]);
    assert!(tree.is_descendant_of(inner, html));
    assert!(!tree.is_descendant_of(second, first));
}

#[test]
fn test_parent_element_stops_at_document() {
    let mut tree = DomTree::new();
    let html = append(&mut tree, NodeId::ROOT, "html");
    let body = append(&mut tree, html, "body");

    assert_eq!(tree.parent_element(body), Some(html));
    assert_eq!(tree.parent(html), Some(NodeId::ROOT));
    assert_eq!(tree.parent_element(html), None);
    assert_eq!(tree.document_element(), Some(html));
}

#[test]
fn test_text_content_concatenates_descendant_text() {
    let mut tree = DomTree::new();
    let div = append(&mut tree, NodeId::ROOT, "div");
    let _ = tree.append_text(div, "Hello ");
    let span = append(&mut tree, div, "span");
    let _ = tree.append_text(span, "world");
    let _ = tree.append(div, NodeType::Comment("ignored".to_string()));

    assert_eq!(tree.text_content(div), "Hello world");
    assert_eq!(tree.text_content(span), "world");
}

#[test]
fn test_classes_split_on_any_whitespace() {
    let element = ElementData::new("div").with_attr("class", "a  b\tc");
    let classes = element.classes();
    assert_eq!(classes.len(), 3);
    assert!(classes.contains("b"));
    assert!(classes.contains("c"));
}

#[test]
fn test_describe_path() {
    let mut tree = DomTree::new();
    let html = append(&mut tree, NodeId::ROOT, "html");
    let div = tree.append_element(
        html,
        ElementData::new("DIV")
            .with_attr("id", "ad")
            .with_attr("class", "b a"),
    );
    assert_eq!(tree.describe(div), "div#ad.a.b");
    assert_eq!(tree.describe_path(div), "html > div#ad.a.b");
}

// ========== fixtures ==========

#[test]
fn test_from_json_builds_tree() {
    let tree = DomTree::from_json(
        r#"{"tag": "html", "children": [
            {"tag": "body", "children": [
                {"tag": "div", "attrs": {"id": "ad"}, "properties": {"a": {"b": null}},
                 "children": ["text", {"comment": "c"}, {"tag": "span"}]}
            ]}
        ]}"#,
    )
    .unwrap();

    let html = tree.document_element().unwrap();
    let body = tree.element_children(html).next().unwrap();
    let div = tree.element_children(body).next().unwrap();
    let element = tree.as_element(div).unwrap();
    assert_eq!(element.id().map(String::as_str), Some("ad"));
    assert_eq!(element.properties.get("a"), Some(&json!({"b": null})));
    assert_eq!(tree.children(div).len(), 3);
    assert_eq!(tree.text_content(div), "text");
}

#[test]
fn test_from_json_rejects_malformed_fixture() {
    assert!(DomTree::from_json(r#"{"children": []}"#).is_err());
    assert!(DomTree::from_json("not json").is_err());
}
