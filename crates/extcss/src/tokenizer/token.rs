//! Selector token types.
//!
//! The selector tokenizer produces only two kinds of tokens: single-character
//! marks that carry structure (combinators, brackets, quotes, `:` and `,`)
//! and words that carry everything else.

use core::fmt;

/// Characters that are emitted as [`TokenKind::Mark`] when they appear
/// outside a bracket, parenthesis or quote. Whitespace is a mark as well.
///
/// NOTE: `-` is deliberately absent so `-abp-has` stays a single word.
pub const MARKS: &[char] = &[
    '>', '+', '~', '(', ')', '[', ']', '"', '\'', ':', ',', '*', '#', '.', '^', '$',
];

/// Returns `true` if `c` is emitted as a mark at the top nesting level.
#[must_use]
pub fn is_mark(c: char) -> bool {
    c.is_whitespace() || MARKS.contains(&c)
}

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of non-mark characters, or the whole content of a nested group.
    Word,
    /// A single structural character.
    Mark,
}

/// A selector token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Word or mark.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub value: String,
    /// Char offset of the token's first character in the trimmed input.
    pub position: usize,
}

impl Token {
    /// Create a word token.
    #[must_use]
    pub fn word(value: impl Into<String>, position: usize) -> Self {
        Self {
            kind: TokenKind::Word,
            value: value.into(),
            position,
        }
    }

    /// Create a mark token.
    #[must_use]
    pub fn mark(c: char, position: usize) -> Self {
        Self {
            kind: TokenKind::Mark,
            value: c.to_string(),
            position,
        }
    }

    /// Returns the mark character if this is a mark token.
    #[must_use]
    pub fn as_mark(&self) -> Option<char> {
        match self.kind {
            TokenKind::Mark => self.value.chars().next(),
            TokenKind::Word => None,
        }
    }

    /// Returns `true` if this is the mark `c`.
    #[must_use]
    pub fn is_mark(&self, c: char) -> bool {
        self.as_mark() == Some(c)
    }

    /// Returns `true` if this is a whitespace mark.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.as_mark().is_some_and(char::is_whitespace)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
