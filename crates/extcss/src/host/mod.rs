//! The capability interface between the engine and a document.
//!
//! The engine never touches a document directly. Everything it needs, from
//! native selector queries to computed styles and XPath, goes through
//! [`HostBindings`]. [`DomHost`] implements it over an
//! [`extcss_dom::DomTree`].

mod dom;
pub mod xpath;

use core::fmt;
use core::fmt::Debug;
use core::hash::Hash;

use serde_json::{Map, Value};

use crate::error::HostError;

pub use dom::DomHost;

/// The pseudo-elements `:matches-css()` can inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// `::before`
    Before,
    /// `::after`
    After,
}

impl fmt::Display for PseudoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("::before"),
            Self::After => f.write_str("::after"),
        }
    }
}

/// What the engine needs from its environment.
///
/// A browser binding would forward these to `querySelectorAll`,
/// `getComputedStyle`, `document.evaluate` and friends; [`DomHost`] answers
/// them from an in-memory tree.
pub trait HostBindings {
    /// An element handle. Cheap to copy and usable as a set key.
    type Element: Copy + Eq + Hash + Debug;

    /// The root all top-level queries start from (the document).
    fn document_root(&self) -> Self::Element;

    /// Elements matching the native `selector`, in document order, with
    /// `:scope` bound to `root`.
    ///
    /// A selector that starts with a combinator is relative to `root`
    /// (`> a` children, `+ a` the next sibling, `~ a` later siblings);
    /// otherwise candidates are the descendants of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidSelector`] if the host cannot evaluate
    /// the selector.
    fn query_native(&self, selector: &str, root: Self::Element) -> Result<Vec<Self::Element>, HostError>;

    /// The computed value of `property` on `element`, or on one of its
    /// pseudo-elements. `None` if the property has no value.
    fn computed_style_value(
        &self,
        element: Self::Element,
        pseudo: Option<PseudoElement>,
        property: &str,
    ) -> Option<String>;

    /// Elements selected by the XPath `expression` with `context` as the
    /// context node.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidXPath`] if the expression cannot be
    /// evaluated.
    fn evaluate_xpath(&self, expression: &str, context: Self::Element) -> Result<Vec<Self::Element>, HostError>;

    /// The element's text content (all descendant text, not rendered text).
    fn text_content(&self, element: Self::Element) -> String;

    /// The nearest inclusive ancestor of `element` matching the native
    /// `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidSelector`] if the host cannot evaluate
    /// the selector.
    fn closest_by_selector(&self, element: Self::Element, selector: &str) -> Result<Option<Self::Element>, HostError>;

    /// The parent of `element` if it is an element.
    fn parent_element(&self, element: Self::Element) -> Option<Self::Element>;

    /// The element's attributes as `(name, value)` pairs.
    fn attributes(&self, element: Self::Element) -> Vec<(String, String)>;

    /// Script-visible properties of the element object, as a JSON object.
    fn properties(&self, element: Self::Element) -> Map<String, Value>;
}
