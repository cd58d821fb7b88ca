//! Native CSS selector parsing and matching
//!
//! This module implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) that regular
//! selector fragments are written in. The AST builder uses it to reject
//! malformed fragments at parse time, and the reference host uses it to
//! answer native queries against a [`DomTree`].
//!
//! Matching is scope-aware: a fragment that starts with a combinator
//! (`> span`) is anchored at the `:scope` element, the way a browser
//! evaluates `element.querySelectorAll(":scope > span")`.

mod parse;

use std::borrow::Cow;

use extcss_dom::{DomTree, ElementData, NodeId, NodeType};

pub use parse::{parse_selector_list, split_selector_list};

/// Errors produced while parsing a native selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeSelectorError {
    /// The selector, or a comma-separated part of it, is empty.
    #[error("empty selector")]
    Empty,

    /// A character that cannot start or continue a simple selector.
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),

    /// A combinator with nothing on one side.
    #[error("dangling combinator `{0}`")]
    DanglingCombinator(char),

    /// A `.`, `#`, `[` or `:` without the name that must follow it.
    #[error("expected {0}")]
    MissingName(&'static str),

    /// A pseudo-class this engine does not know.
    #[error("unknown pseudo-class `:{0}`")]
    UnknownPseudoClass(String),

    /// A pseudo-element this engine does not know.
    #[error("unknown pseudo-element `::{0}`")]
    UnknownPseudoElement(String),

    /// A functional pseudo-class with a malformed (or missing) argument.
    #[error("invalid argument for `:{pseudo}`: `{arg}`")]
    InvalidArgument {
        /// The pseudo-class name.
        pseudo: String,
        /// The argument text.
        arg: String,
    },

    /// A bracket, parenthesis or quote that is never closed.
    #[error("unterminated `{0}`")]
    Unterminated(char),
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `p`, `span`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.banner`, `.ad-slot`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#ad`, `#sidebar`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// Pseudo-class or pseudo-element that never matches an element in a
    /// static tree: interactive states (`:hover`, `:focus`) and every
    /// pseudo-element (`::before`), which is not an element at all.
    NeverMatch,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
}

/// `An+B` notation per
/// [§ 6.1 An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax).
///
/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// The step.
    pub a: i32,
    /// The offset.
    pub b: i32,
}

impl Nth {
    /// Returns `true` if the 1-based `index` is `a*n + b` for some `n >= 0`.
    ///
    /// Computed in `i64` so that offsets near `i32::MIN`/`i32::MAX` cannot
    /// overflow.
    #[must_use]
    pub fn matches(self, index: i32) -> bool {
        let (a, b, index) = (i64::from(self.a), i64::from(self.b), i64::from(index));
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// Structural pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 4.4 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,

    /// [§ 4.5 :scope](https://www.w3.org/TR/selectors-4/#the-scope-pseudo)
    /// "The :scope pseudo-class represents any element that is a :scope element."
    ///
    /// Also inserted implicitly in front of a leading combinator.
    Scope,

    /// [§ 4.12 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,

    /// [§ 4.12 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,

    /// [§ 4.12 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,

    /// [§ 4.11 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,

    /// [§ 4.11 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,

    /// [§ 4.11 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,

    /// [§ 4.12 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(Nth),

    /// [§ 4.12 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(Nth),

    /// [§ 4.11 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),

    /// [§ 4.11 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),

    /// [§ 4.5 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// "The :empty pseudo-class represents an element that has no children at all."
    Empty,

    /// [§ 4.6 :link](https://www.w3.org/TR/selectors-4/#the-link-pseudo)
    /// All links are treated as unvisited; `:any-link` is the same test.
    Link,

    /// :disabled: form element with disabled attribute
    Disabled,

    /// :enabled: form element without disabled attribute
    Enabled,

    /// :checked: element with the checked attribute
    Checked,

    /// :required: element with the required attribute
    Required,

    /// :optional: element without the required attribute
    Optional,

    /// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
    /// Matches the nearest `lang` attribute on the element or an ancestor.
    Lang(String),
}

/// How an attribute selector compares the attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [§ 6.4] `[attr]`
    Exists,
    /// [§ 6.4] `[attr=value]`
    Equals(String),
    /// [§ 6.4] `[attr~=value]`: whitespace-separated word match
    Includes(String),
    /// [§ 6.4] `[attr|=value]`: exact or prefix followed by `-`
    DashMatch(String),
    /// [§ 6.4] `[attr^=value]`
    PrefixMatch(String),
    /// [§ 6.4] `[attr$=value]`
    SuffixMatch(String),
    /// [§ 6.4] `[attr*=value]`
    SubstringMatch(String),
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// The attribute name, lowercased.
    pub name: String,
    /// The comparison.
    pub operator: AttributeOperator,
    /// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// The `i` flag: compare values ASCII case-insensitively.
    pub ignore_case: bool,
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators) `A B`
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators) `A > B`
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `A + B`
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `A ~ B`
    SubsequentSibling,
}

impl Combinator {
    /// Map a combinator character to its combinator.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul li`
/// ```text
/// [div.container] --(Child)--> [ul] --(Descendant)--> [li]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    pub subject: CompoundSelector,

    /// Chain of (combinator, compound) pairs going left from the subject.
    /// For `A > B C` this is `[(Descendant, B), (Child, A)]`.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// A comma-separated list of complex selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSelectorList {
    /// The complex selectors, in source order.
    pub selectors: Vec<ComplexSelector>,
}

/// What `:scope` refers to while matching.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// The tree being matched.
    pub tree: &'a DomTree,
    /// The scoping root. `None` means the document element, per
    /// "If there is no scoping root, :scope represents the root of the document".
    pub scope: Option<NodeId>,
}

impl<'a> MatchContext<'a> {
    /// Context without a scoping root.
    #[must_use]
    pub const fn new(tree: &'a DomTree) -> Self {
        Self { tree, scope: None }
    }

    /// Context with `scope` as the scoping root.
    #[must_use]
    pub const fn scoped(tree: &'a DomTree, scope: NodeId) -> Self {
        Self {
            tree,
            scope: Some(scope),
        }
    }

    fn is_scope(&self, node: NodeId) -> bool {
        match self.scope {
            Some(scope) => scope == node,
            None => self.tree.document_element() == Some(node),
        }
    }
}

impl NativeSelectorList {
    /// Returns `true` if any selector in the list matches `node`.
    #[must_use]
    pub fn matches(&self, ctx: &MatchContext<'_>, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(ctx, node))
    }

    /// Returns `true` if any selector refers to `:scope`, explicitly or
    /// through a leading combinator. Such selectors can match elements
    /// outside the scoping root's subtree (`+ div`).
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.selectors.iter().any(ComplexSelector::is_anchored)
    }
}

impl ComplexSelector {
    fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        std::iter::once(&self.subject).chain(self.combinators.iter().map(|(_, c)| c))
    }

    fn is_anchored(&self) -> bool {
        self.compounds().any(|compound| {
            compound
                .simple_selectors
                .contains(&SimpleSelector::PseudoClass(PseudoClass::Scope))
        })
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match this selector against `node` with full tree context.
    #[must_use]
    pub fn matches(&self, ctx: &MatchContext<'_>, node: NodeId) -> bool {
        if ctx.tree.as_element(node).is_none() {
            return false;
        }
        compound_matches(&self.subject, ctx, node) && self.matches_combinators(ctx, node)
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    ///
    /// Walk the chain right-to-left. Descendant and subsequent-sibling
    /// steps try every candidate so that `a b > c` finds a `b` parent whose
    /// own ancestor is an `a`, not just the nearest `b`.
    fn matches_combinators(&self, ctx: &MatchContext<'_>, subject: NodeId) -> bool {
        fn walk(chain: &[(Combinator, CompoundSelector)], ctx: &MatchContext<'_>, current: NodeId) -> bool {
            let Some(((combinator, compound), rest)) = chain.split_first() else {
                return true;
            };
            let tree = ctx.tree;
            match combinator {
                // "A selector of the form 'A B' represents an element B that is an
                // arbitrary descendant of some ancestor element A."
                Combinator::Descendant => tree
                    .ancestors(current)
                    .any(|a| compound_matches(compound, ctx, a) && walk(rest, ctx, a)),

                // "A selector of the form 'A > B' represents an element B that is
                // a direct child of element A."
                Combinator::Child => tree
                    .parent(current)
                    .is_some_and(|p| compound_matches(compound, ctx, p) && walk(rest, ctx, p)),

                // "A selector of the form 'A + B' represents an element B that
                // immediately follows element A, where A and B share the same parent."
                Combinator::NextSibling => previous_element_sibling(tree, current)
                    .is_some_and(|p| compound_matches(compound, ctx, p) && walk(rest, ctx, p)),

                // "A selector of the form 'A ~ B' represents an element B that
                // follows element A (not necessarily immediately)."
                Combinator::SubsequentSibling => tree.preceding_siblings(current).any(|s| {
                    tree.as_element(s).is_some()
                        && compound_matches(compound, ctx, s)
                        && walk(rest, ctx, s)
                }),
            }
        }

        walk(&self.combinators, ctx, subject)
    }
}

/// Check if a compound selector matches a node. Only `:scope` can match a
/// non-element node (a document used as scoping root).
fn compound_matches(compound: &CompoundSelector, ctx: &MatchContext<'_>, node: NodeId) -> bool {
    let element = ctx.tree.as_element(node);
    compound.simple_selectors.iter().all(|simple| match simple {
        SimpleSelector::PseudoClass(PseudoClass::Scope) => ctx.is_scope(node),
        SimpleSelector::PseudoClass(pc) => {
            element.is_some_and(|e| pseudo_class_matches(pc, ctx.tree, node, e))
        }
        _ => element.is_some_and(|e| simple.matches(e)),
    })
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Match a structural pseudo-class against an element with full DOM tree context.
fn pseudo_class_matches(pc: &PseudoClass, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
    let same_type = |c: NodeId| {
        tree.as_element(c)
            .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(&element.tag_name))
    };
    let is_element = |c: NodeId| tree.as_element(c).is_some();

    match pc {
        PseudoClass::Root => tree.document_element() == Some(node),
        PseudoClass::Scope => false,
        PseudoClass::FirstChild => sibling_index(tree, node, is_element, false) == 1,
        PseudoClass::LastChild => sibling_index(tree, node, is_element, true) == 1,
        PseudoClass::OnlyChild => {
            sibling_index(tree, node, is_element, false) == 1
                && sibling_index(tree, node, is_element, true) == 1
        }
        PseudoClass::FirstOfType => sibling_index(tree, node, same_type, false) == 1,
        PseudoClass::LastOfType => sibling_index(tree, node, same_type, true) == 1,
        PseudoClass::OnlyOfType => {
            sibling_index(tree, node, same_type, false) == 1
                && sibling_index(tree, node, same_type, true) == 1
        }
        PseudoClass::NthChild(nth) => nth.matches(sibling_index(tree, node, is_element, false)),
        PseudoClass::NthLastChild(nth) => nth.matches(sibling_index(tree, node, is_element, true)),
        PseudoClass::NthOfType(nth) => nth.matches(sibling_index(tree, node, same_type, false)),
        PseudoClass::NthLastOfType(nth) => nth.matches(sibling_index(tree, node, same_type, true)),

        // "In terms of the document tree, only element nodes and content nodes...
        // must be considered."
        PseudoClass::Empty => tree
            .children(node)
            .iter()
            .all(|&c| match tree.get(c).map(|n| &n.node_type) {
                Some(NodeType::Text(t)) => t.is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }),

        PseudoClass::Link => {
            (element.tag_name.eq_ignore_ascii_case("a")
                || element.tag_name.eq_ignore_ascii_case("area"))
                && element.attrs.contains_key("href")
        }
        PseudoClass::Disabled => element.attrs.contains_key("disabled"),
        PseudoClass::Enabled => !element.attrs.contains_key("disabled"),
        PseudoClass::Checked => element.attrs.contains_key("checked"),
        PseudoClass::Required => element.attrs.contains_key("required"),
        PseudoClass::Optional => !element.attrs.contains_key("required"),

        // "The :lang(C) pseudo-class represents an element that is in one of the
        // languages listed in its argument."
        PseudoClass::Lang(lang) => std::iter::once(node)
            .chain(tree.ancestors(node))
            .find_map(|a| tree.as_element(a).and_then(|e| e.attrs.get("lang")))
            .is_some_and(|value| {
                value.eq_ignore_ascii_case(lang)
                    || value
                        .to_ascii_lowercase()
                        .starts_with(&format!("{}-", lang.to_ascii_lowercase()))
            }),
    }
}

/// 1-based position of `node` among its siblings that satisfy `include`,
/// counted from the start or (with `from_end`) from the end.
fn sibling_index(tree: &DomTree, node: NodeId, include: impl Fn(NodeId) -> bool, from_end: bool) -> i32 {
    let before = if from_end {
        tree.following_siblings(node).filter(|&s| include(s)).count()
    } else {
        tree.preceding_siblings(node).filter(|&s| include(s)).count()
    };
    i32::try_from(before).map_or(i32::MAX, |n| n.saturating_add(1))
}

/// Find the immediately preceding element sibling (skipping text/comment nodes).
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&sibling| tree.as_element(sibling).is_some())
}

impl SimpleSelector {
    /// Check if this simple selector matches the given element without tree
    /// context. Pseudo-classes need the tree and never match here.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Class(class_name) => element.classes().contains(class_name.as_str()),
            Self::Id(id) => element.id().is_some_and(|el_id| el_id == id),
            Self::Universal => true,
            Self::NeverMatch | Self::PseudoClass(_) => false,
            Self::Attribute(attr) => attr.matches(element),
        }
    }
}

impl AttributeSelector {
    /// Check the attribute condition against an element.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let Some(value) = element
            .attrs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.name))
            .map(|(_, value)| value)
        else {
            return false;
        };

        let actual = fold_case(value, self.ignore_case);
        let actual = actual.as_ref();
        let compare = |expected: &str| fold_case(expected, self.ignore_case).into_owned();

        match &self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals(val) => actual == compare(val),
            AttributeOperator::Includes(val) => {
                let val = compare(val);
                actual.split_ascii_whitespace().any(|w| w == val)
            }
            AttributeOperator::DashMatch(val) => {
                let val = compare(val);
                actual == val || actual.starts_with(&format!("{val}-"))
            }
            // "If 'val' is the empty string then the selector does not represent anything."
            AttributeOperator::PrefixMatch(val) => !val.is_empty() && actual.starts_with(&compare(val)),
            AttributeOperator::SuffixMatch(val) => !val.is_empty() && actual.ends_with(&compare(val)),
            AttributeOperator::SubstringMatch(val) => !val.is_empty() && actual.contains(&compare(val)),
        }
    }
}

fn fold_case(s: &str, ignore_case: bool) -> Cow<'_, str> {
    if ignore_case {
        Cow::Owned(s.to_ascii_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

/// Native pseudo-classes this engine evaluates.
const STRUCTURAL_PSEUDO_CLASSES: &[&str] = &[
    "root",
    "scope",
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "nth-last-of-type",
    "empty",
    "link",
    "any-link",
    "enabled",
    "disabled",
    "checked",
    "required",
    "optional",
    "lang",
];

/// Native pseudo-classes that are valid but never match in a static tree.
const STATE_PSEUDO_CLASSES: &[&str] = &[
    "active",
    "autofill",
    "default",
    "defined",
    "dir",
    "focus",
    "focus-visible",
    "focus-within",
    "fullscreen",
    "hover",
    "in-range",
    "indeterminate",
    "invalid",
    "out-of-range",
    "paused",
    "placeholder-shown",
    "playing",
    "read-only",
    "read-write",
    "target",
    "valid",
    "visited",
];

/// Pseudo-elements that CSS2 allowed with a single colon (`:before`).
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Pseudo-elements accepted after `::`.
const PSEUDO_ELEMENTS: &[&str] = &[
    "after",
    "backdrop",
    "before",
    "cue",
    "file-selector-button",
    "first-letter",
    "first-line",
    "marker",
    "part",
    "placeholder",
    "selection",
    "slotted",
];

/// Returns `true` if `name` (without the colon) is a native pseudo-class,
/// including the legacy single-colon pseudo-elements.
#[must_use]
pub fn is_pseudo_class(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    [STRUCTURAL_PSEUDO_CLASSES, STATE_PSEUDO_CLASSES, LEGACY_PSEUDO_ELEMENTS]
        .iter()
        .any(|list| list.contains(&name.as_str()))
}

/// Returns `true` if `name` is a pseudo-element that CSS2 wrote with one colon.
#[must_use]
pub fn is_legacy_pseudo_element(name: &str) -> bool {
    LEGACY_PSEUDO_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

/// Returns `true` if `name` (without the colons) is a known pseudo-element.
#[must_use]
pub fn is_pseudo_element(name: &str) -> bool {
    PSEUDO_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}
