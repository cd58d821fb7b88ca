//! Tests for stylesheet splitting, compilation and merging.

use extcss::{
    DebugMode, PseudoClassName, ScopeRule, SelectorError, SelectorNode, StyleError, StylesheetError,
    StylesheetOptions, StylesheetParser, parse_rules, parse_single_rule, parse_stylesheet,
};
use indexmap::IndexMap;

/// Helper to build an expected style map.
fn style(pairs: &[(&str, &str)]) -> Option<IndexMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    )
}

/// Options that keep warnings off stderr.
fn quiet() -> StylesheetOptions {
    StylesheetOptions {
        report_warnings: false,
        ..StylesheetOptions::default()
    }
}

// ========== single rules ==========

#[test]
fn test_remove_marker_rule() {
    let rule = parse_single_rule(".banner:remove() { remove: true; }").unwrap();
    assert_eq!(rule.selector, ".banner");
    assert_eq!(rule.style, style(&[("remove", "true")]));
    assert_eq!(rule.debug, None);
}

#[test]
fn test_remove_without_block() {
    let rule = parse_single_rule("div:contains(ad):remove()").unwrap();
    assert_eq!(rule.selector, "div:contains(ad)");
    assert_eq!(rule.style, style(&[("remove", "true")]));
}

#[test]
fn test_remove_property() {
    let rule = parse_single_rule("#ad { remove: true; color: red }").unwrap();
    assert_eq!(rule.style, style(&[("remove", "true")]));
}

#[test]
fn test_missing_value_rule() {
    assert_eq!(
        parse_single_rule("div { display: }"),
        Err(StylesheetError::Style(StyleError::MissingValue {
            property: "display".to_string()
        }))
    );
}

#[test]
fn test_selector_is_normalized() {
    let rule = parse_single_rule("  div   >   p:contains(a  b)  { top: 0 }").unwrap();
    assert_eq!(rule.selector, "div > p:contains(a  b)");
    assert_eq!(rule.ast.selectors[0].nodes.len(), 2);
}

#[test]
fn test_brace_inside_selector_argument() {
    let rule = parse_single_rule("div:contains({) { display: none }").unwrap();
    assert_eq!(rule.selector, "div:contains({)");
    assert_eq!(rule.style, style(&[("display", "none")]));

    let rule = parse_single_rule("p:contains(/a{2}/) { top: 0 }").unwrap();
    assert_eq!(rule.selector, "p:contains(/a{2}/)");
}

#[test]
fn test_style_or_remove_required() {
    assert!(matches!(
        parse_single_rule("div.ad"),
        Err(StylesheetError::StyleOrRemoveRequired { selector }) if selector == "div.ad"
    ));
}

#[test]
fn test_structural_errors() {
    assert!(matches!(
        parse_single_rule("{ color: red }"),
        Err(StylesheetError::NoSelectorBeforeStyle { .. })
    ));
    assert!(matches!(
        parse_single_rule("@import url(ads.css);"),
        Err(StylesheetError::UnsupportedAtRule { .. })
    ));
    assert!(matches!(
        parse_single_rule("div /* ad */ { top: 0 }"),
        Err(StylesheetError::UnsupportedComment { .. })
    ));
    assert!(matches!(
        parse_single_rule("div { top: 0"),
        Err(StylesheetError::UnclosedStyleBlock { .. })
    ));
}

#[test]
fn test_remove_marker_errors() {
    assert!(matches!(
        parse_single_rule("div:remove():remove() { top: 0 }"),
        Err(StylesheetError::MultipleRemoveMarkers { .. })
    ));
    assert!(matches!(
        parse_single_rule("div:remove() span { top: 0 }"),
        Err(StylesheetError::RemoveNotLast { .. })
    ));
}

#[test]
fn test_remove_marker_inside_argument() {
    let rule = parse_single_rule("div:contains(:remove()) { color: red }").unwrap();
    assert_eq!(rule.selector, "div:contains(:remove())");
    assert_eq!(rule.style, style(&[("color", "red")]));

    let rule = parse_single_rule(r#"a[title=":remove()"]:remove()"#).unwrap();
    assert_eq!(rule.selector, r#"a[title=":remove()"]"#);
    assert_eq!(rule.style, style(&[("remove", "true")]));

    assert!(matches!(
        parse_single_rule("div:has(> a:remove()) { top: 0 }"),
        Err(StylesheetError::Selector(SelectorError::ScopeViolation {
            rule: ScopeRule::RemoveInsideArgument,
            ..
        }))
    ));
}

#[test]
fn test_block_at_rule_and_comment_in_single_rule() {
    assert!(matches!(
        parse_single_rule("@media x { div { a: b } }"),
        Err(StylesheetError::UnsupportedAtRule { .. })
    ));
    assert!(matches!(
        parse_single_rule("  @media screen { .ad { display: none } }"),
        Err(StylesheetError::UnsupportedAtRule { .. })
    ));
    assert!(matches!(
        parse_single_rule("div { top: 0 } /* p { left: 0 } */"),
        Err(StylesheetError::UnsupportedComment { .. })
    ));
    assert!(matches!(
        parse_single_rule("/* banner */ .banner { display: none }"),
        Err(StylesheetError::UnsupportedComment { .. })
    ));
}

#[test]
fn test_selector_errors_pass_through() {
    assert!(matches!(
        parse_single_rule("div:has(> div:has(> img)) { top: 0 }"),
        Err(StylesheetError::Selector(SelectorError::ScopeViolation { .. }))
    ));
    assert!(matches!(
        parse_single_rule("div:unknown { top: 0 }"),
        Err(StylesheetError::Selector(SelectorError::UnknownPseudoClass { .. }))
    ));
}

#[test]
fn test_single_rule_count() {
    assert_eq!(parse_single_rule("   "), Err(StylesheetError::EmptyStylesheet));
    assert!(matches!(
        parse_single_rule("a { top: 0 } b { top: 0 }"),
        Err(StylesheetError::MultipleRules { .. })
    ));
}

#[test]
fn test_debug_property() {
    let rule = parse_single_rule("div { debug: true; top: 0 }").unwrap();
    assert_eq!(rule.debug, Some(DebugMode::True));
    assert_eq!(rule.style, style(&[("top", "0")]));

    let rule = parse_single_rule("div { debug: global }").unwrap();
    assert_eq!(rule.debug, Some(DebugMode::Global));
    assert_eq!(rule.style, None);

    let rule = parse_single_rule("div { debug: maybe; top: 0 }").unwrap();
    assert_eq!(rule.debug, None);
}

// ========== stylesheets ==========

#[test]
fn test_rules_merge_by_selector() {
    let parsed = parse_stylesheet("#ad { top: 0 !important; } #ad { margin: 0; }");
    assert_eq!(parsed.rules.len(), 1);
    assert_eq!(parsed.rules[0].selector, "#ad");
    assert_eq!(
        parsed.rules[0].style,
        style(&[("top", "0 !important"), ("margin", "0")])
    );
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_later_declarations_win() {
    let parsed = parse_stylesheet("a { color: red; top: 0 } b { top: 1 } a { color: blue }");
    assert_eq!(parsed.rules.len(), 2);
    assert_eq!(parsed.rules[0].selector, "a");
    assert_eq!(parsed.rules[0].style, style(&[("color", "blue"), ("top", "0")]));
    assert_eq!(parsed.rules[1].selector, "b");
}

#[test]
fn test_merge_matches_normalized_selectors() {
    let parsed = parse_stylesheet("div  >  p { top: 0 } div > p { left: 0 }");
    assert_eq!(parsed.rules.len(), 1);
    assert_eq!(parsed.rules[0].style, style(&[("top", "0"), ("left", "0")]));
}

#[test]
fn test_merging_is_idempotent() {
    let text = ".a { top: 0 } .b:remove()";
    let once = parse_stylesheet(text);
    let twice = parse_rules(&[text, text]);
    assert_eq!(once.rules, twice.rules);
}

#[test]
fn test_remove_dominates_merged_rule() {
    let parsed = parse_stylesheet(".a { color: red; content: \"x\" } .a:remove()");
    assert_eq!(parsed.rules[0].style, style(&[("remove", "true")]));
}

#[test]
fn test_keep_content_on_remove() {
    let mut parser = StylesheetParser::with_options(StylesheetOptions {
        keep_content_on_remove: true,
        ..quiet()
    });
    let parsed = parser.parse_stylesheet(".a { color: red; content: \"x\" } .a:remove()");
    assert_eq!(
        parsed.rules[0].style,
        style(&[("remove", "true"), ("content", "\"x\"")])
    );
}

#[test]
fn test_global_debug() {
    let parsed = parse_stylesheet("a { top: 0 } b { debug: global; top: 1 }");
    assert!(parsed.global_debug);
    assert!(!parse_stylesheet("a { debug: true; top: 0 }").global_debug);
}

#[test]
fn test_invalid_rules_become_warnings() {
    let mut parser = StylesheetParser::with_options(quiet());
    let parsed = parser.parse_rules(&[
        "div[..banner] { display: none; }",
        "div:contains(text) { display: none; }",
    ]);
    assert_eq!(parsed.rules.len(), 1);
    assert_eq!(parsed.rules[0].selector, "div:contains(text)");
    assert_eq!(parsed.warnings.len(), 1);
    assert!(parsed.warnings[0].starts_with("div[..banner] { display: none; }: "));
}

#[test]
fn test_one_entry_may_hold_several_rules() {
    let mut parser = StylesheetParser::with_options(quiet());
    let parsed = parser.parse_rules(&["a { top: 0 } b:remove()", "c { left: 0 }"]);
    let selectors: Vec<&str> = parsed.rules.iter().map(|r| r.selector.as_str()).collect();
    assert_eq!(selectors, ["a", "b", "c"]);
}

#[test]
fn test_parser_caches_selectors() {
    let mut parser = StylesheetParser::with_options(quiet());
    let _ = parser.parse_stylesheet("div:has(a) { top: 0 } div:has(a) { left: 0 } div:has(a)  { right: 0 }");
    assert_eq!(parser.cache().len(), 1);
}

#[test]
fn test_ast_matches_selector() {
    let rule = parse_single_rule("div:matches-css(display: block) { top: 0 }").unwrap();
    let nodes = &rule.ast.selectors[0].nodes;
    assert!(matches!(
        &nodes[1],
        SelectorNode::Extended(extended) if extended.name() == PseudoClassName::MatchesCss
    ));
}

#[test]
fn test_stylesheet_serializes() {
    let parsed = parse_stylesheet(".a { top: 0 } .b { debug: true; left: 0 }");
    let value = serde_json::to_value(&parsed).unwrap();
    assert_eq!(value["rules"][0]["selector"], ".a");
    assert_eq!(value["rules"][0]["style"]["top"], "0");
    assert_eq!(value["rules"][1]["debug"], "true");
    assert_eq!(value["global_debug"], false);
}
