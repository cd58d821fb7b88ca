//! Selector AST.
//!
//! A [`SelectorList`] owns its [`Selector`] branches, each branch owns its
//! nodes, and relative pseudo-classes own their nested list by value. Every
//! type renders back to normalized selector text through `Display`, and
//! parsing that text again yields an equal tree.

use core::fmt;

use serde::Serialize;

use super::pseudo::PseudoClassName;
use crate::error::MatchError;
use crate::matcher::AbsoluteMatcher;

/// A comma-separated list of selectors. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorList {
    /// The branches, in source order.
    pub selectors: Vec<Selector>,
}

/// One branch of a [`SelectorList`]. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    /// Regular and extended nodes, in source order. The first node is
    /// always regular.
    pub nodes: Vec<SelectorNode>,
}

/// A node of a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SelectorNode {
    /// A fragment the host's native selector engine can evaluate.
    Regular(RegularSelector),
    /// An extended pseudo-class.
    Extended(ExtendedSelector),
}

/// A native selector fragment.
///
/// The first fragment of a branch is queried from the root; it starts with
/// a combinator only inside a `:has()` argument. A fragment that follows an
/// extended node is a continuation: a leading `>`, `+` or `~` selects
/// relatives of the previous result, a leading space selects descendants,
/// and no prefix filters the previous result itself (`.foo` in
/// `div:has(a).foo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegularSelector {
    /// Normalized fragment text.
    pub text: String,
}

impl RegularSelector {
    /// Create a regular fragment from already-normalized text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The leading combinator, if the fragment starts with one.
    #[must_use]
    pub fn leading_combinator(&self) -> Option<char> {
        self.text
            .trim_start()
            .chars()
            .next()
            .filter(|c| matches!(c, '>' | '+' | '~'))
    }
}

/// An extended pseudo-class node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExtendedSelector {
    /// Self-contained pseudo-class with an opaque argument.
    Absolute(AbsolutePseudoClass),
    /// Pseudo-class whose argument is a nested selector list.
    Relative(RelativePseudoClass),
}

impl ExtendedSelector {
    /// The pseudo-class name.
    #[must_use]
    pub const fn name(&self) -> PseudoClassName {
        match self {
            Self::Absolute(pc) => pc.name,
            Self::Relative(pc) => pc.name,
        }
    }
}

/// A pseudo-class such as `:contains(text)`, with its argument compiled.
///
/// Two nodes are equal when name and raw argument are; the matcher is a
/// function of both.
#[derive(Debug, Clone, Serialize)]
pub struct AbsolutePseudoClass {
    name: PseudoClassName,
    raw_arg: String,
    #[serde(skip)]
    matcher: AbsoluteMatcher,
}

impl AbsolutePseudoClass {
    /// Compile `raw_arg` for `name`.
    ///
    /// # Errors
    ///
    /// See [`AbsoluteMatcher::compile`].
    pub fn new(name: PseudoClassName, raw_arg: impl Into<String>) -> Result<Self, MatchError> {
        let raw_arg = raw_arg.into();
        let matcher = AbsoluteMatcher::compile(name, &raw_arg)?;
        Ok(Self { name, raw_arg, matcher })
    }

    /// The pseudo-class.
    #[must_use]
    pub const fn name(&self) -> PseudoClassName {
        self.name
    }

    /// The raw argument text between the parentheses.
    #[must_use]
    pub fn raw_arg(&self) -> &str {
        &self.raw_arg
    }

    /// The compiled argument.
    #[must_use]
    pub const fn matcher(&self) -> &AbsoluteMatcher {
        &self.matcher
    }
}

impl PartialEq for AbsolutePseudoClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.raw_arg == other.raw_arg
    }
}

impl Eq for AbsolutePseudoClass {}

/// A pseudo-class such as `:has(> a)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativePseudoClass {
    /// The pseudo-class.
    pub name: PseudoClassName,
    /// The nested selector list.
    pub argument: SelectorList,
}

impl SelectorList {
    /// Returns `true` if no branch contains an extended node, so the whole
    /// list can be handed to the host's native selector engine.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.selectors.iter().all(Selector::is_native)
    }

    /// Returns `true` if any branch ends with `:remove()`.
    #[must_use]
    pub fn has_remove(&self) -> bool {
        self.selectors.iter().any(|selector| {
            matches!(
                selector.nodes.last(),
                Some(SelectorNode::Extended(ExtendedSelector::Absolute(pc)))
                    if pc.name == PseudoClassName::Remove
            )
        })
    }
}

impl Selector {
    /// Returns `true` if this branch is a single regular fragment.
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self.nodes.as_slice(), [SelectorNode::Regular(_)])
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular(regular) => f.write_str(&regular.text),
            Self::Extended(ExtendedSelector::Absolute(pc)) => {
                write!(f, ":{}({})", pc.name, pc.raw_arg)
            }
            Self::Extended(ExtendedSelector::Relative(pc)) => {
                write!(f, ":{}({})", pc.name, pc.argument)
            }
        }
    }
}
