//! Tests for selector evaluation against the in-memory reference host.

use extcss::{DomHost, MatchError, QueryError, match_element, parse_selector, query};
use extcss_dom::{DomTree, NodeId};

/// The shared page: an ad banner, a text paragraph and a news post inside
/// `#main`, plus a sponsored link in an aside.
const PAGE: &str = r#"{"tag": "html", "children": [
    {"tag": "body", "children": [
        {"tag": "div", "attrs": {"id": "main", "class": "container"}, "children": [
            {"tag": "div", "attrs": {"class": "banner", "data-ad": "1"}, "children": [
                {"tag": "span", "attrs": {"class": "label"}, "children": ["Sponsored"]},
                {"tag": "img", "attrs": {"src": "ad.png"}}
            ]},
            {"tag": "p", "attrs": {"class": "text"}, "children": ["Hello world"]},
            {"tag": "div", "attrs": {"class": "post"}, "children": [
                {"tag": "p", "children": ["News"]},
                {"tag": "a", "attrs": {"href": "/story"}, "children": ["Read more"]}
            ]}
        ]},
        {"tag": "aside", "children": [
            {"tag": "span", "children": ["Sponsored link"]}
        ]}
    ]}
]}"#;

/// Helper to load the shared page.
fn page() -> DomTree {
    DomTree::from_json(PAGE).unwrap()
}

/// Helper to run a query and describe every match.
fn select(tree: &DomTree, selector: &str) -> Vec<String> {
    let host = DomHost::new(tree);
    query(selector, &host)
        .unwrap()
        .into_iter()
        .map(|id| tree.describe(id))
        .collect()
}

/// Helper to find the single element matching a native selector.
fn find(tree: &DomTree, selector: &str) -> NodeId {
    let host = DomHost::new(tree);
    let found = query(selector, &host).unwrap();
    assert_eq!(found.len(), 1, "`{selector}` should match exactly once");
    found[0]
}

// ========== native ==========

#[test]
fn test_native_selector_in_document_order() {
    let tree = page();
    assert_eq!(
        select(&tree, "div"),
        ["div#main.container", "div.banner", "div.post"]
    );
    assert_eq!(select(&tree, "#main > p"), ["p.text"]);
}

#[test]
fn test_branches_are_deduplicated() {
    let tree = page();
    assert_eq!(
        select(&tree, "div, .banner"),
        ["div#main.container", "div.banner", "div.post"]
    );
}

// ========== :has() ==========

#[test]
fn test_has_child_combinator() {
    let tree = page();
    assert_eq!(select(&tree, "div:has(> span.label)"), ["div.banner"]);
}

#[test]
fn test_has_descendant() {
    let tree = page();
    assert_eq!(
        select(&tree, "div:has(span)"),
        ["div#main.container", "div.banner"]
    );
}

#[test]
fn test_has_fragment_is_scoped_to_candidate() {
    let tree = page();
    // `#main span` would match from anywhere; inside :has() the whole
    // fragment must lie within the candidate.
    assert!(select(&tree, "div.banner:has(#main span)").is_empty());
    assert_eq!(select(&tree, "div.container:has(div span)"), ["div#main.container"]);
}

#[test]
fn test_has_sibling_combinators() {
    let tree = page();
    assert_eq!(select(&tree, "div:has(+ p)"), ["div.banner"]);
    assert_eq!(select(&tree, "div:has(~ div.post)"), ["div.banner"]);
}

#[test]
fn test_has_without_subject_matches_any_element() {
    let tree = page();
    assert_eq!(select(&tree, ":has(> img)"), ["div.banner"]);
}

#[test]
fn test_has_selector_list_is_or() {
    let tree = page();
    assert_eq!(
        select(&tree, "div:has(> img, > a)"),
        ["div.banner", "div.post"]
    );
}

#[test]
fn test_has_aliases() {
    let tree = page();
    let expected = ["div#main.container", "div.banner"];
    assert_eq!(select(&tree, "div:-abp-has(img)"), expected);
    assert_eq!(select(&tree, "div:if(img)"), expected);
}

#[test]
fn test_has_with_absolute_pseudo_class_inside() {
    let tree = page();
    assert_eq!(
        select(&tree, "div:has(> span:contains(Sponsored))"),
        ["div.banner"]
    );
}

#[test]
fn test_if_not() {
    let tree = page();
    assert_eq!(select(&tree, "div:if-not(img)"), ["div.post"]);
}

// ========== :is() / :not() ==========

#[test]
fn test_is_and_where() {
    let tree = page();
    assert_eq!(select(&tree, "p:is(.text, div.post > p)"), ["p.text", "p"]);
    assert_eq!(select(&tree, "p:where(.text)"), ["p.text"]);
}

#[test]
fn test_is_may_contain_has() {
    let tree = page();
    assert_eq!(select(&tree, "div:is(:has(> img))"), ["div.banner"]);
}

#[test]
fn test_not() {
    let tree = page();
    assert_eq!(select(&tree, "div:not(.banner, .post)"), ["div#main.container"]);
    assert_eq!(select(&tree, "p:not(:contains(News))"), ["p.text"]);
}

// ========== absolute pseudo-classes ==========

#[test]
fn test_contains_literal_and_regex() {
    let tree = page();
    assert_eq!(select(&tree, "span:contains(Sponsored)"), ["span.label", "span"]);
    assert_eq!(select(&tree, "span:contains(/^Sponsored$/)"), ["span.label"]);
    assert_eq!(select(&tree, "span:has-text(/link/i)"), ["span"]);
    assert_eq!(select(&tree, "span:-abp-contains(Sponsored link)"), ["span"]);
}

#[test]
fn test_nth_ancestor_and_numeric_upward() {
    let tree = page();
    assert_eq!(select(&tree, "span.label:nth-ancestor(1)"), ["div.banner"]);
    assert_eq!(select(&tree, "span.label:upward(2)"), ["div#main.container"]);
}

#[test]
fn test_nth_ancestor_past_root_fails_the_query() {
    let tree = page();
    let host = DomHost::new(&tree);
    let error = query("span.label:nth-ancestor(10)", &host).unwrap_err();
    assert!(matches!(
        error,
        QueryError::Match(MatchError::AncestorOutOfRange { depth: 10, .. })
    ));
}

#[test]
fn test_error_inside_relative_argument_is_no_match() {
    let tree = page();
    assert!(select(&tree, "div:has(span:nth-ancestor(10))").is_empty());
    assert_eq!(
        select(&tree, "div:not(span:nth-ancestor(10))"),
        ["div#main.container", "div.banner", "div.post"]
    );
}

#[test]
fn test_upward_selector() {
    let tree = page();
    assert_eq!(select(&tree, "span:upward(.container)"), ["div#main.container"]);
    // The candidate itself is never its own match.
    assert!(select(&tree, "div.banner:upward(.banner)").is_empty());
}

#[test]
fn test_upward_extended_selector() {
    let tree = page();
    assert_eq!(select(&tree, "img:upward(div:has(p))"), ["div#main.container"]);
}

#[test]
fn test_xpath_from_document() {
    let tree = page();
    assert_eq!(select(&tree, ":xpath(//div[@data-ad])"), ["div.banner"]);
    assert_eq!(
        select(&tree, ":xpath(//span[contains(text(), 'link')])"),
        ["span"]
    );
}

#[test]
fn test_xpath_from_candidates() {
    let tree = page();
    assert_eq!(select(&tree, "span.label:xpath(../..)"), ["div#main.container"]);
    assert_eq!(
        select(&tree, "div.banner:xpath(following-sibling::*[1])"),
        ["p.text"]
    );
}

#[test]
fn test_invalid_xpath_fails_the_query() {
    let tree = page();
    let host = DomHost::new(&tree);
    assert!(matches!(
        query("div:xpath(following::p)", &host),
        Err(QueryError::Match(MatchError::Host(_)))
    ));
}

#[test]
fn test_remove_keeps_candidates() {
    let tree = page();
    assert_eq!(select(&tree, "div.banner:remove()"), ["div.banner"]);
}

// ========== continuations ==========

#[test]
fn test_continuation_child() {
    let tree = page();
    assert_eq!(select(&tree, "div:has(img) > p"), ["p.text"]);
}

#[test]
fn test_continuation_descendant() {
    let tree = page();
    assert_eq!(select(&tree, "div:has(> img) span"), ["span.label"]);
}

#[test]
fn test_continuation_compound_filters() {
    let tree = page();
    assert_eq!(select(&tree, "div:has(img).container"), ["div#main.container"]);
    assert_eq!(select(&tree, "div:has(img).container > div.post a"), ["a"]);
}

#[test]
fn test_continuation_sibling() {
    let tree = page();
    assert_eq!(select(&tree, "div:contains(Sponsored) + p"), ["p.text"]);
}

// ========== match_element ==========

#[test]
fn test_match_element_native_and_extended() {
    let tree = page();
    let host = DomHost::new(&tree);
    let banner = find(&tree, ".banner");
    let post = find(&tree, ".post");

    let native = parse_selector("div.banner").unwrap();
    assert!(match_element(&native, banner, &host).unwrap());
    assert!(!match_element(&native, post, &host).unwrap());

    let extended = parse_selector("div:has(> img)").unwrap();
    assert!(match_element(&extended, banner, &host).unwrap());
    assert!(!match_element(&extended, post, &host).unwrap());
}

#[test]
fn test_query_reports_parse_errors() {
    let tree = page();
    let host = DomHost::new(&tree);
    assert!(matches!(query("div:foo", &host), Err(QueryError::Selector(_))));
}
