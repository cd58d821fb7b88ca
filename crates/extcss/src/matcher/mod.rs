//! Absolute pseudo-class matchers.
//!
//! Each pseudo-class owns a small argument grammar. [`AbsoluteMatcher::compile`]
//! parses the raw argument into a typed matcher once, when the AST builder
//! creates the node; the evaluator runs the matcher stored on the node.

pub mod ancestor;
pub mod attr;
pub mod css;
pub mod pattern;
pub mod property;
pub mod text;

use crate::error::MatchError;
use crate::host::HostBindings;
use crate::selector::PseudoClassName;

pub use attr::AttrMatcher;
pub use css::CssMatcher;
pub use property::PropertyMatcher;
pub use text::TextMatcher;

/// A compiled absolute pseudo-class.
#[derive(Debug, Clone)]
pub enum AbsoluteMatcher {
    /// `:contains()` and aliases.
    Text(TextMatcher),
    /// `:matches-css()` and the `-before`/`-after` forms.
    Css(CssMatcher),
    /// `:matches-attr()`.
    Attr(AttrMatcher),
    /// `:matches-property()`.
    Property(PropertyMatcher),
    /// `:nth-ancestor(n)` and `:upward(n)`.
    Ancestor(u8),
    /// `:xpath(expression)`.
    XPath(String),
    /// `:remove()`: keeps every candidate.
    Remove,
}

impl AbsoluteMatcher {
    /// Compile the raw argument of an absolute pseudo-class.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidArgument`] carrying the pseudo-class, the
    /// raw argument and the reason, or if `name` takes a selector argument.
    pub fn compile(name: PseudoClassName, raw_arg: &str) -> Result<Self, MatchError> {
        let invalid = |reason: String| MatchError::InvalidArgument {
            pseudo: name,
            arg: raw_arg.to_string(),
            reason,
        };

        match name {
            PseudoClassName::Contains | PseudoClassName::AbpContains | PseudoClassName::HasText => {
                TextMatcher::parse(raw_arg).map(Self::Text).map_err(invalid)
            }
            PseudoClassName::MatchesCss
            | PseudoClassName::MatchesCssBefore
            | PseudoClassName::MatchesCssAfter => {
                CssMatcher::parse(name, raw_arg).map(Self::Css).map_err(invalid)
            }
            PseudoClassName::MatchesAttr => AttrMatcher::parse(raw_arg).map(Self::Attr).map_err(invalid),
            PseudoClassName::MatchesProperty => {
                PropertyMatcher::parse(raw_arg).map(Self::Property).map_err(invalid)
            }
            PseudoClassName::NthAncestor | PseudoClassName::Upward => {
                ancestor::parse_depth(raw_arg).map(Self::Ancestor).map_err(invalid)
            }
            PseudoClassName::Xpath => {
                let expression = raw_arg.trim();
                if expression.is_empty() {
                    Err(invalid("empty xpath expression".to_string()))
                } else {
                    Ok(Self::XPath(expression.to_string()))
                }
            }
            PseudoClassName::Remove => {
                if raw_arg.trim().is_empty() {
                    Ok(Self::Remove)
                } else {
                    Err(invalid(":remove() takes no argument".to_string()))
                }
            }
            PseudoClassName::Has
            | PseudoClassName::AbpHas
            | PseudoClassName::If
            | PseudoClassName::IfNot
            | PseudoClassName::Is
            | PseudoClassName::Where
            | PseudoClassName::Not => Err(invalid("expected a selector argument".to_string())),
        }
    }

    /// Apply the matcher to a candidate set, returning the new set.
    ///
    /// Filters keep the candidates that match; `:nth-ancestor()` and
    /// `:xpath()` map each candidate to other elements.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::AncestorOutOfRange`] or a host error.
    pub fn apply<H: HostBindings>(
        &self,
        name: PseudoClassName,
        host: &H,
        candidates: Vec<H::Element>,
    ) -> Result<Vec<H::Element>, MatchError> {
        match self {
            Self::Remove => Ok(candidates),
            Self::Ancestor(depth) => candidates
                .into_iter()
                .map(|e| ancestor::nth_ancestor(host, e, *depth, name))
                .collect(),
            Self::XPath(expression) => {
                let mut found = Vec::new();
                for element in candidates {
                    found.extend(host.evaluate_xpath(expression, element)?);
                }
                Ok(found)
            }
            Self::Text(_) | Self::Css(_) | Self::Attr(_) | Self::Property(_) => Ok(candidates
                .into_iter()
                .filter(|&e| self.matches(host, e))
                .collect()),
        }
    }

    /// Test one element against a filtering matcher. Navigating matchers
    /// (`:nth-ancestor()`, `:xpath()`) and `:remove()` always return `true`.
    #[must_use]
    pub fn matches<H: HostBindings>(&self, host: &H, element: H::Element) -> bool {
        match self {
            Self::Text(matcher) => matcher.matches(&host.text_content(element)),
            Self::Css(matcher) => host
                .computed_style_value(element, matcher.pseudo, &matcher.property)
                .is_some_and(|value| matcher.matches_value(&value)),
            Self::Attr(matcher) => matcher.matches(&host.attributes(element)),
            Self::Property(matcher) => matcher.matches(&host.properties(element)),
            Self::Ancestor(_) | Self::XPath(_) | Self::Remove => true,
        }
    }
}
