//! The closed set of extended pseudo-classes.

use serde::{Serialize, Serializer};
use strum_macros::{Display, EnumIter, EnumString};

/// An extended pseudo-class name.
///
/// Parsing is ASCII case-insensitive (`:Contains` is `:contains`); `Display`
/// prints the canonical lowercase name. Aliases keep their own variant so a
/// selector round-trips through `Display` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum PseudoClassName {
    /// `:contains(text)`: element text content contains a string or regex.
    #[strum(serialize = "contains")]
    Contains,
    /// `:-abp-contains(text)`, alias of `:contains`.
    #[strum(serialize = "-abp-contains")]
    AbpContains,
    /// `:has-text(text)`, alias of `:contains`.
    #[strum(serialize = "has-text")]
    HasText,
    /// `:matches-css(property: value)`.
    #[strum(serialize = "matches-css")]
    MatchesCss,
    /// `:matches-css-before(property: value)`, against `::before`.
    #[strum(serialize = "matches-css-before")]
    MatchesCssBefore,
    /// `:matches-css-after(property: value)`, against `::after`.
    #[strum(serialize = "matches-css-after")]
    MatchesCssAfter,
    /// `:matches-attr(name[=value])`.
    #[strum(serialize = "matches-attr")]
    MatchesAttr,
    /// `:matches-property(chain[=value])`.
    #[strum(serialize = "matches-property")]
    MatchesProperty,
    /// `:nth-ancestor(n)`.
    #[strum(serialize = "nth-ancestor")]
    NthAncestor,
    /// `:upward(n)` or `:upward(selector)`.
    #[strum(serialize = "upward")]
    Upward,
    /// `:xpath(expression)`.
    #[strum(serialize = "xpath")]
    Xpath,
    /// `:remove()`: removal marker for the stylesheet layer.
    #[strum(serialize = "remove")]
    Remove,
    /// `:has(selector list)`.
    #[strum(serialize = "has")]
    Has,
    /// `:-abp-has(selector list)`, alias of `:has`.
    #[strum(serialize = "-abp-has")]
    AbpHas,
    /// `:if(selector list)`, alias of `:has`.
    #[strum(serialize = "if")]
    If,
    /// `:if-not(selector list)`: no relative match exists.
    #[strum(serialize = "if-not")]
    IfNot,
    /// `:is(selector list)`.
    #[strum(serialize = "is")]
    Is,
    /// `:where(selector list)`, same matching as `:is`.
    #[strum(serialize = "where")]
    Where,
    /// `:not(selector list)`.
    #[strum(serialize = "not")]
    Not,
}

/// How a pseudo-class's argument is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Opaque text handed to a matcher.
    Absolute,
    /// A nested selector list.
    Relative,
}

/// What a relative pseudo-class does with the elements its argument finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeOp {
    /// Keep candidates with a match relative to them (`:has()`, `:if()`,
    /// `:-abp-has()`).
    Has,
    /// Keep candidates without one (`:if-not()`).
    HasNot,
    /// Keep candidates the argument matches (`:is()`, `:where()`).
    Is,
    /// Keep candidates the argument does not match (`:not()`).
    Not,
    /// Move each candidate to its nearest matching ancestor (`:upward()`).
    Upward,
}

impl PseudoClassName {
    /// Look up a pseudo-class by name, case-insensitively.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// `:has()` and its aliases, plus `:if-not()`: the pseudo-classes whose
    /// arguments are matched relative to the candidate and may start with a
    /// combinator.
    #[must_use]
    pub const fn is_has_family(self) -> bool {
        matches!(self, Self::Has | Self::AbpHas | Self::If | Self::IfNot)
    }

    /// `:is()` and `:where()`.
    #[must_use]
    pub const fn is_is_family(self) -> bool {
        matches!(self, Self::Is | Self::Where)
    }

    /// The pseudo-classes that may not follow a pseudo-element or appear in
    /// its argument.
    #[must_use]
    pub const fn is_scoped(self) -> bool {
        self.is_has_family() || self.is_is_family()
    }

    /// `:contains()` and its aliases.
    #[must_use]
    pub const fn is_contains_family(self) -> bool {
        matches!(self, Self::Contains | Self::AbpContains | Self::HasText)
    }

    /// Whether an argument is mandatory. Only `:remove()` takes none.
    #[must_use]
    pub const fn requires_argument(self) -> bool {
        !matches!(self, Self::Remove)
    }

    /// The relative operation of a pseudo-class that can take a selector
    /// argument; `None` for the purely absolute ones.
    #[must_use]
    pub const fn relative_op(self) -> Option<RelativeOp> {
        match self {
            Self::Has | Self::AbpHas | Self::If => Some(RelativeOp::Has),
            Self::IfNot => Some(RelativeOp::HasNot),
            Self::Is | Self::Where => Some(RelativeOp::Is),
            Self::Not => Some(RelativeOp::Not),
            Self::Upward => Some(RelativeOp::Upward),
            Self::Contains
            | Self::AbpContains
            | Self::HasText
            | Self::MatchesCss
            | Self::MatchesCssBefore
            | Self::MatchesCssAfter
            | Self::MatchesAttr
            | Self::MatchesProperty
            | Self::NthAncestor
            | Self::Xpath
            | Self::Remove => None,
        }
    }

    /// Classify the argument. `:upward()` is absolute when its argument is
    /// a number and relative otherwise.
    #[must_use]
    pub fn argument_kind(self, raw_arg: &str) -> ArgumentKind {
        match self {
            Self::Has | Self::AbpHas | Self::If | Self::IfNot | Self::Is | Self::Where | Self::Not => {
                ArgumentKind::Relative
            }
            Self::Upward if raw_arg.trim().parse::<i64>().is_err() => ArgumentKind::Relative,
            _ => ArgumentKind::Absolute,
        }
    }
}

impl Serialize for PseudoClassName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
