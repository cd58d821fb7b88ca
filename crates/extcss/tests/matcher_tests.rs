//! Tests for the absolute pseudo-class matchers, directly and through the
//! reference host.

use extcss::matcher::{AbsoluteMatcher, AttrMatcher, CssMatcher, PropertyMatcher, TextMatcher};
use extcss::{DomHost, PseudoClassName, PseudoElement, query};
use extcss_dom::{DomTree, ElementData, NodeId};
use serde_json::{Map, Value, json};

/// Helper to create an element node, attach it and return its `NodeId`.
fn append(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
    tree.append_element(parent, data)
}

/// Helper to turn a `json!` object into a property map.
fn properties(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

/// Helper to build `(name, value)` attribute pairs.
fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

// ========== :contains() ==========

#[test]
fn test_text_literal_is_substring() {
    let matcher = TextMatcher::parse("ad").unwrap();
    assert!(matcher.matches("Read this ad now"));
    assert!(!matcher.matches("AD"));
}

#[test]
fn test_text_literal_unescapes_parens() {
    let matcher = TextMatcher::parse("\\(sponsored\\)").unwrap();
    assert!(matcher.matches("post (sponsored)"));
}

#[test]
fn test_text_regex_flags() {
    let matcher = TextMatcher::parse("/^promo/i").unwrap();
    assert!(matcher.matches("PROMOTED"));
    assert!(!matcher.matches("not promoted"));

    let multi = TextMatcher::parse("/^b$/m").unwrap();
    assert!(multi.matches("a\nb\nc"));
}

#[test]
fn test_text_regex_escaped_slash() {
    let matcher = TextMatcher::parse("/a\\/b/").unwrap();
    assert!(matcher.matches("xa/by"));
}

#[test]
fn test_text_invalid() {
    assert!(TextMatcher::parse("").is_err());
    assert!(TextMatcher::parse("/(/").is_err());
}

// ========== :matches-css() ==========

#[test]
fn test_css_parse_plain_and_prefixed() {
    let plain = CssMatcher::parse(PseudoClassName::MatchesCss, "Display: none").unwrap();
    assert_eq!(plain.pseudo, None);
    assert_eq!(plain.property, "display");
    assert!(plain.matches_value("none"));
    assert!(!plain.matches_value("block"));

    let before = CssMatcher::parse(PseudoClassName::MatchesCss, "before, content: \"ad\"").unwrap();
    assert_eq!(before.pseudo, Some(PseudoElement::Before));

    let after = CssMatcher::parse(PseudoClassName::MatchesCssAfter, "content: *").unwrap();
    assert_eq!(after.pseudo, Some(PseudoElement::After));
}

#[test]
fn test_css_prefix_twice_is_invalid() {
    assert!(CssMatcher::parse(PseudoClassName::MatchesCssBefore, "after, content: x").is_err());
}

#[test]
fn test_css_wildcard_is_whole_value() {
    let matcher = CssMatcher::parse(PseudoClassName::MatchesCss, "width: 3*px").unwrap();
    assert!(matcher.matches_value("300px"));
    assert!(!matcher.matches_value("max 300px"));
}

#[test]
fn test_css_url_value_with_or_without_quotes() {
    let matcher = CssMatcher::parse(PseudoClassName::MatchesCss, "background-image: url(ad*.png)").unwrap();
    assert!(matcher.matches_value("url(\"ad-1.png\")"));
    assert!(matcher.matches_value("url(ad-2.png)"));
    assert!(!matcher.matches_value("url(logo.png)"));
}

#[test]
fn test_css_regex_value() {
    let matcher = CssMatcher::parse(PseudoClassName::MatchesCss, "height: /^(1|2)px$/").unwrap();
    assert!(matcher.matches_value("1px"));
    assert!(!matcher.matches_value("10px"));
}

#[test]
fn test_css_opacity_is_rounded() {
    let matcher = CssMatcher::parse(PseudoClassName::MatchesCss, "opacity: 0.9").unwrap();
    assert!(matcher.matches_value("0.8999999761581421"));
}

// ========== :matches-attr() ==========

#[test]
fn test_attr_name_only() {
    let matcher = AttrMatcher::parse("data-ad").unwrap();
    assert!(matcher.matches(&attrs(&[("data-ad", "")])));
    assert!(!matcher.matches(&attrs(&[("data-add", "")])));
}

#[test]
fn test_attr_wildcard_and_regex() {
    let matcher = AttrMatcher::parse("\"data-*\"=\"ad*\"").unwrap();
    assert!(matcher.matches(&attrs(&[("id", "x"), ("data-slot", "ad-top")])));
    assert!(!matcher.matches(&attrs(&[("data-slot", "news")])));

    let regex = AttrMatcher::parse("/^aria-/=/hidden/i").unwrap();
    assert!(regex.matches(&attrs(&[("aria-label", "HIDDEN ad")])));
}

#[test]
fn test_attr_invalid() {
    assert!(AttrMatcher::parse("").is_err());
    assert!(AttrMatcher::parse("a=").is_err());
}

// ========== :matches-property() ==========

#[test]
fn test_property_chain() {
    let props = properties(json!({"dataset": {"adId": "42", "slot": null}, "hidden": true}));

    assert!(PropertyMatcher::parse("dataset.adId").unwrap().matches(&props));
    assert!(PropertyMatcher::parse("dataset.adId=/^\\d+$/").unwrap().matches(&props));
    assert!(PropertyMatcher::parse("hidden=true").unwrap().matches(&props));
    assert!(PropertyMatcher::parse("dataset.slot=null").unwrap().matches(&props));
    assert!(!PropertyMatcher::parse("dataset.missing").unwrap().matches(&props));
    assert!(!PropertyMatcher::parse("hidden.deeper").unwrap().matches(&props));
}

#[test]
fn test_property_chain_stops_at_null() {
    let props = properties(json!({"dataset": {"slot": null}}));

    assert!(PropertyMatcher::parse("dataset.slot").unwrap().matches(&props));
    assert!(!PropertyMatcher::parse("dataset.slot.x").unwrap().matches(&props));
    assert!(!PropertyMatcher::parse("dataset.slot.x=null").unwrap().matches(&props));
    assert!(!PropertyMatcher::parse("dataset.slot.*").unwrap().matches(&props));
}

#[test]
fn test_property_regex_segment() {
    let props = properties(json!({"__ad_config_7": {"enabled": 1}}));
    assert!(PropertyMatcher::parse("/^__ad_config/.enabled=1").unwrap().matches(&props));
}

#[test]
fn test_property_array_index() {
    let props = properties(json!({"slots": ["top", "side"]}));
    assert!(PropertyMatcher::parse("slots.1=side").unwrap().matches(&props));
    assert!(!PropertyMatcher::parse("slots=side").unwrap().matches(&props));
}

// ========== compile ==========

#[test]
fn test_compile_rejects_relative_names() {
    assert!(AbsoluteMatcher::compile(PseudoClassName::Has, "a").is_err());
    assert!(AbsoluteMatcher::compile(PseudoClassName::Not, "a").is_err());
}

#[test]
fn test_compile_ancestor_and_remove() {
    assert!(matches!(
        AbsoluteMatcher::compile(PseudoClassName::NthAncestor, " 3 "),
        Ok(AbsoluteMatcher::Ancestor(3))
    ));
    assert!(matches!(
        AbsoluteMatcher::compile(PseudoClassName::Remove, ""),
        Ok(AbsoluteMatcher::Remove)
    ));
    assert!(AbsoluteMatcher::compile(PseudoClassName::Xpath, "  ").is_err());
}

// ========== through the host ==========

#[test]
fn test_matches_css_uses_host_styles() {
    let mut tree = DomTree::new();
    let body = append(&mut tree, NodeId::ROOT, ElementData::new("body"));
    let hidden = append(&mut tree, body, ElementData::new("div").with_attr("id", "hidden"));
    let inline = append(
        &mut tree,
        body,
        ElementData::new("div")
            .with_attr("id", "inline")
            .with_attr("style", "display: block; display: none"),
    );
    let _ = append(&mut tree, body, ElementData::new("div").with_attr("id", "plain"));

    let host = DomHost::new(&tree).with_style(hidden, None, "display", "none");
    let found = query("div:matches-css(display: none)", &host).unwrap();
    assert_eq!(found, vec![hidden, inline]);
}

#[test]
fn test_matches_css_pseudo_elements() {
    let mut tree = DomTree::new();
    let body = append(&mut tree, NodeId::ROOT, ElementData::new("body"));
    let before = append(&mut tree, body, ElementData::new("p"));
    let after = append(&mut tree, body, ElementData::new("p"));

    let host = DomHost::new(&tree)
        .with_style(before, Some(PseudoElement::Before), "content", "\"Ad\"")
        .with_style(after, Some(PseudoElement::After), "content", "\"Ad\"");

    assert_eq!(query("p:matches-css-before(content: \"Ad\")", &host).unwrap(), vec![before]);
    assert_eq!(query("p:matches-css-after(content: *Ad*)", &host).unwrap(), vec![after]);
    assert_eq!(query("p:matches-css(after, content: /Ad/)", &host).unwrap(), vec![after]);
    // The element's own style does not answer for its pseudo-elements.
    assert!(query("p:matches-css(content: *)", &host).unwrap().is_empty());
}

#[test]
fn test_matches_attr_through_host() {
    let tree = DomTree::from_json(
        r#"{"tag": "body", "children": [
            {"tag": "div", "attrs": {"data-ad-slot": "top"}},
            {"tag": "div", "attrs": {"data-news": "top"}}
        ]}"#,
    )
    .unwrap();
    let host = DomHost::new(&tree);
    let found = query("div:matches-attr(\"data-ad-*\")", &host).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(tree.as_element(found[0]).unwrap().attrs["data-ad-slot"], "top");
}

#[test]
fn test_matches_property_through_host() {
    let mut tree = DomTree::new();
    let body = append(&mut tree, NodeId::ROOT, ElementData::new("body"));
    let ad = append(
        &mut tree,
        body,
        ElementData::new("div").with_property("adConfig", json!({"provider": "net"})),
    );
    let _ = append(&mut tree, body, ElementData::new("div"));

    let host = DomHost::new(&tree);
    assert_eq!(
        query("div:matches-property(adConfig.provider=net)", &host).unwrap(),
        vec![ad]
    );
}
