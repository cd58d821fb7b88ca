//! Extended selectors: names, AST, builder and parse cache.

mod ast;
mod builder;
mod cache;
mod pseudo;

pub use ast::{
    AbsolutePseudoClass, ExtendedSelector, RegularSelector, RelativePseudoClass, Selector, SelectorList,
    SelectorNode,
};
pub use cache::{AstCache, normalize_selector_text};
pub use pseudo::{ArgumentKind, PseudoClassName, RelativeOp};

use crate::error::SelectorError;

/// Parse selector text into a [`SelectorList`].
///
/// # Errors
///
/// Returns the first [`SelectorError`] found: lexing, structure, placement
/// rules, native fragment validity, then matcher argument validity, in
/// source order.
///
/// # Example
/// ```
/// use extcss::selector::{parse_selector, SelectorNode};
///
/// let list = parse_selector("div:has(> span, p)").unwrap();
/// assert_eq!(list.selectors[0].nodes.len(), 2);
/// assert!(matches!(list.selectors[0].nodes[0], SelectorNode::Regular(_)));
/// assert_eq!(list.to_string(), "div:has(> span, p)");
/// ```
pub fn parse_selector(text: &str) -> Result<SelectorList, SelectorError> {
    builder::build(text)
}
