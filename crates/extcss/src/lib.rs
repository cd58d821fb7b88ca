//! Extended CSS selectors: tokenizer, AST builder, matchers, evaluator and
//! stylesheet compiler.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector tokenizer** splitting selectors into marks and words, with
//!   pseudo-class arguments kept whole
//!
//! - **Selector AST** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!   extended with filter-list pseudo-classes)
//!   - Regular fragments validated against a native selector grammar
//!   - Absolute pseudo-classes: `:contains()`, `:matches-css()`,
//!     `:matches-attr()`, `:matches-property()`, `:nth-ancestor()`,
//!     `:upward(n)`, `:xpath()`, `:remove()`
//!   - Relative pseudo-classes: `:has()`, `:is()`, `:where()`, `:not()`,
//!     `:if-not()`, `:upward(selector)` and the `:-abp-has()`/`:if()` aliases
//!   - Legacy `[-ext-name="arg"]` attribute syntax
//!   - Placement rules (`:has()` inside `:has()`, `:xpath()` last, ...)
//!
//! - **Evaluator** running a selector list against any [`HostBindings`]
//!   implementation, with [`DomHost`] as the in-memory reference host
//!
//! - **Stylesheet compiler** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing),
//!   strict variant)
//!   - Selector/style boundary resolution when selectors contain `{`
//!   - Declaration blocks, `remove` and `debug` properties
//!   - Merging of rules by selector
//!
//! # Not Implemented
//!
//! - Applying styles to a live document and re-applying on mutation
//! - At-rules and comments in stylesheets

/// Error types for every layer.
pub mod error;
/// The host capability interface and the reference host.
pub mod host;
/// Absolute pseudo-class matchers.
pub mod matcher;
/// Native selector grammar per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod native;
/// Selector evaluation.
pub mod query;
/// Selector AST, builder and cache.
pub mod selector;
/// Declaration blocks per [§ 5.4.5](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations).
pub mod style;
/// Stylesheet splitting, compilation and merging.
pub mod stylesheet;
/// Selector tokenizer.
pub mod tokenizer;

use serde::Serialize;

pub use error::{HostError, MatchError, QueryError, ScopeRule, SelectorError, StyleError, StylesheetError};
pub use host::{DomHost, HostBindings, PseudoElement};
pub use query::{match_element, query_all};
pub use selector::{
    AbsolutePseudoClass, ExtendedSelector, PseudoClassName, RegularSelector, RelativePseudoClass, Selector,
    SelectorList, SelectorNode, parse_selector,
};
pub use style::{StyleDeclaration, parse_style_block};
pub use stylesheet::{DebugMode, ParsedStylesheet, RuleData, StylesheetOptions, StylesheetParser};

/// Outcome of [`validate_selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorValidation {
    /// The selector parsed.
    pub ok: bool,
    /// Why it did not.
    pub error: Option<String>,
}

/// Check a selector without keeping its AST.
#[must_use]
pub fn validate_selector(text: &str) -> SelectorValidation {
    match parse_selector(text) {
        Ok(_) => SelectorValidation { ok: true, error: None },
        Err(error) => SelectorValidation {
            ok: false,
            error: Some(error.to_string()),
        },
    }
}

/// Compile a stylesheet with default options. See
/// [`StylesheetParser::parse_stylesheet`].
#[must_use]
pub fn parse_stylesheet(text: &str) -> ParsedStylesheet {
    StylesheetParser::new().parse_stylesheet(text)
}

/// Compile a list of rules with default options. See
/// [`StylesheetParser::parse_rules`].
#[must_use]
pub fn parse_rules(rules: &[&str]) -> ParsedStylesheet {
    StylesheetParser::new().parse_rules(rules)
}

/// Compile exactly one rule with default options.
///
/// # Errors
///
/// See [`StylesheetParser::parse_single_rule`].
pub fn parse_single_rule(text: &str) -> Result<RuleData, StylesheetError> {
    StylesheetParser::new().parse_single_rule(text)
}

/// Parse `text` and return every matching element.
///
/// # Errors
///
/// Returns [`QueryError::Selector`] if the selector does not parse, or
/// [`QueryError::Match`] if matching fails on a top-level node.
///
/// # Example
/// ```
/// use extcss::{DomHost, query};
/// use extcss_dom::DomTree;
///
/// let tree = DomTree::from_json(
///     r#"{"tag": "html", "children": [{"tag": "body", "children": [
///         {"tag": "div", "attrs": {"class": "ad"}, "children": ["Sponsored"]},
///         {"tag": "div", "children": ["News"]}
///     ]}]}"#,
/// ).unwrap();
/// let host = DomHost::new(&tree);
/// let found = query("div:contains(Sponsored)", &host).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(tree.describe(found[0]), "div.ad");
/// ```
pub fn query<H: HostBindings>(text: &str, host: &H) -> Result<Vec<H::Element>, QueryError> {
    let list = parse_selector(text)?;
    Ok(query_all(&list, host)?)
}
