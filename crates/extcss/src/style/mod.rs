//! Declaration blocks of extended stylesheet rules.
//!
//! [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
//!
//! Unlike a browser's error-recovering parser, a malformed declaration here
//! rejects the whole rule: a filter list rule is either applied as written
//! or reported.

mod block;

use serde::Serialize;

pub use block::{find_delimiter, parse_style_block};

/// One `property: value` pair of a declaration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDeclaration {
    /// The property name, lowercased.
    pub property: String,
    /// The trimmed value, including any `!important`.
    pub value: String,
}

impl StyleDeclaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}
