//! `:contains()`, `:-abp-contains()` and `:has-text()`.

use regex::Regex;

use super::pattern::{parse_regex_literal, unescape_literal};

/// Matches an element's text content.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Plain substring search.
    Literal(String),
    /// `/pattern/flags`.
    Regex(Regex),
}

impl TextMatcher {
    /// Parse the argument: a `/pattern/flags` regex or a literal string.
    ///
    /// # Errors
    ///
    /// Returns a description if the argument is empty or the regex does not
    /// compile.
    pub fn parse(arg: &str) -> Result<Self, String> {
        if arg.is_empty() {
            return Err("empty text pattern".to_string());
        }
        match parse_regex_literal(arg) {
            Some(literal) => literal.compile().map(Self::Regex),
            None => Ok(Self::Literal(unescape_literal(arg))),
        }
    }

    /// Test the element's text content.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Literal(needle) => text.contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(text),
        }
    }
}
