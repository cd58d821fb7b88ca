//! Error types for every layer of the engine.
//!
//! Errors are plain data: the AST builder and `parse_single_rule` propagate
//! them unchanged, the batch stylesheet parser turns them into warnings, and
//! the query evaluator decides per nesting level whether a matcher error
//! aborts the query or just fails a branch.

use strum_macros::Display;

use crate::selector::PseudoClassName;

/// Which placement rule a selector broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScopeRule {
    /// `:has()` (or an alias) inside another `:has()`-family argument.
    #[strum(to_string = ":has() is not allowed inside :has()")]
    HasInsideHas,
    /// `:is()`/`:where()` inside a `:has()`-family argument.
    #[strum(to_string = ":is() and :where() are not allowed inside :has()")]
    IsOrWhereInsideHas,
    /// `:has()`/`:is()`/`:where()` inside a native pseudo-element argument.
    #[strum(to_string = "extended pseudo-class inside a pseudo-element argument")]
    InsidePseudoElementArgument,
    /// `:has()`/`:is()`/`:where()` after a native pseudo-element.
    #[strum(to_string = "extended pseudo-class after a pseudo-element")]
    AfterPseudoElement,
    /// Something other than `:remove()` follows `:xpath()`.
    #[strum(to_string = ":xpath() must be the last pseudo-class")]
    XpathNotLast,
    /// Something follows `:remove()`, or it appears twice.
    #[strum(to_string = ":remove() must appear once, at the end of the selector")]
    RemoveNotLast,
    /// `:remove()` inside a nested selector argument.
    #[strum(to_string = ":remove() is not allowed inside a pseudo-class argument")]
    RemoveInsideArgument,
}

/// Errors raised while turning selector text into a [`crate::SelectorList`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// A quote opened in the selector is never closed.
    #[error("unterminated {quote} quote in `{selector}`")]
    Lex {
        /// The selector being parsed.
        selector: String,
        /// The unbalanced quote character.
        quote: char,
    },

    /// The selector, or one of its comma-separated branches, is empty.
    #[error("empty selector in `{selector}`")]
    EmptySelector {
        /// The selector being parsed.
        selector: String,
    },

    /// A pseudo-class that requires an argument was given none.
    #[error("missing argument for :{pseudo}() in `{selector}`")]
    MissingArgument {
        /// The pseudo-class missing its argument.
        pseudo: PseudoClassName,
        /// The selector being parsed.
        selector: String,
    },

    /// A pseudo-class is neither extended nor a known native one.
    #[error("unknown pseudo-class :{name} in `{selector}`")]
    UnknownPseudoClass {
        /// The unrecognized name, as written.
        name: String,
        /// The selector being parsed.
        selector: String,
    },

    /// A placement rule was broken.
    #[error("{rule} in `{selector}`")]
    ScopeViolation {
        /// The broken rule.
        rule: ScopeRule,
        /// The selector being parsed.
        selector: String,
    },

    /// Parentheses or square brackets do not balance.
    #[error("unbalanced brackets in `{selector}`")]
    UnbalancedBrackets {
        /// The selector being parsed.
        selector: String,
    },

    /// A combinator with nothing on its left outside a `:has()` argument.
    #[error("`{selector}` may not start with a combinator")]
    DanglingCombinator {
        /// The selector being parsed.
        selector: String,
    },

    /// A regular fragment is not a valid native selector.
    #[error("invalid selector `{fragment}`: {reason}")]
    InvalidRegularSelector {
        /// The offending regular fragment.
        fragment: String,
        /// Why the native grammar rejected it.
        reason: String,
    },

    /// An absolute pseudo-class argument failed its matcher's validation.
    #[error(transparent)]
    InvalidMatcherArgument(#[from] MatchError),
}

/// Errors reported by a [`crate::HostBindings`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host cannot evaluate this native selector fragment.
    #[error("host rejected selector `{selector}`: {reason}")]
    InvalidSelector {
        /// The fragment handed to the host.
        selector: String,
        /// The host's explanation.
        reason: String,
    },

    /// The host cannot evaluate this XPath expression.
    #[error("host rejected xpath `{expression}`: {reason}")]
    InvalidXPath {
        /// The expression handed to the host.
        expression: String,
        /// The host's explanation.
        reason: String,
    },
}

/// Errors raised by pseudo-class matchers, at parse time (argument
/// validation) or at query time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The raw argument does not fit the pseudo-class's micro-grammar.
    #[error("invalid argument `{arg}` for :{pseudo}(): {reason}")]
    InvalidArgument {
        /// The pseudo-class.
        pseudo: PseudoClassName,
        /// The raw argument text.
        arg: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `:nth-ancestor()`/`:upward()` walked past the document root.
    #[error(":{pseudo}({depth}) walks past the document root")]
    AncestorOutOfRange {
        /// The pseudo-class.
        pseudo: PseudoClassName,
        /// The requested depth.
        depth: u8,
    },

    /// The host failed to answer a query.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors raised while parsing a declaration block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// A declaration has a value but no property (`: red`).
    #[error("missing property in declaration `{declaration}`")]
    MissingProperty {
        /// The declaration text.
        declaration: String,
    },

    /// A declaration has a property but no value (`color: ;`).
    #[error("missing value for property `{property}`")]
    MissingValue {
        /// The property name.
        property: String,
    },

    /// The block contains no declarations and the selector has no `:remove()`.
    #[error("empty declaration block")]
    EmptyDeclarationBlock,

    /// Trailing text without a `:` separator (`color`).
    #[error("unclosed declaration `{declaration}`")]
    UnclosedDeclaration {
        /// The dangling text.
        declaration: String,
    },
}

/// Errors raised while splitting and compiling stylesheet rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StylesheetError {
    /// The input contains no rule at all.
    #[error("empty stylesheet")]
    EmptyStylesheet,

    /// A style block starts where a selector was expected.
    #[error("no selector before style block in `{rule}`")]
    NoSelectorBeforeStyle {
        /// The rule text.
        rule: String,
    },

    /// A selector has neither a style block nor a trailing `:remove()`.
    #[error("selector `{selector}` needs a style block or :remove()")]
    StyleOrRemoveRequired {
        /// The selector text.
        selector: String,
    },

    /// More than one `:remove()` in one selector.
    #[error("multiple :remove() markers in `{selector}`")]
    MultipleRemoveMarkers {
        /// The selector text.
        selector: String,
    },

    /// `:remove()` is followed by more selector text.
    #[error(":remove() must be the last pseudo-class in `{selector}`")]
    RemoveNotLast {
        /// The selector text.
        selector: String,
    },

    /// At-rules (`@media`, `@import`, ...) are not supported.
    #[error("at-rules are not supported: `{rule}`")]
    UnsupportedAtRule {
        /// The at-rule text.
        rule: String,
    },

    /// Comments are not supported.
    #[error("comments are not supported: `{rule}`")]
    UnsupportedComment {
        /// The rule text around the comment.
        rule: String,
    },

    /// A `{` without a closing `}`.
    #[error("unclosed style block in `{rule}`")]
    UnclosedStyleBlock {
        /// The rule text.
        rule: String,
    },

    /// Single-rule parsing was given more than one rule.
    #[error("expected exactly one rule, found more in `{text}`")]
    MultipleRules {
        /// The full input.
        text: String,
    },

    /// The selector part failed to parse.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// The style block failed to parse.
    #[error(transparent)]
    Style(#[from] StyleError),
}

/// Errors raised by the one-call [`crate::query`] helper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The selector text did not parse.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Matching failed on a top-level node.
    #[error(transparent)]
    Match(#[from] MatchError),
}
