//! Memoized selector parsing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::ast::SelectorList;
use super::builder;
use crate::error::SelectorError;

/// Collapse whitespace runs that sit outside quotes, parentheses and
/// brackets into single spaces, and trim the ends.
///
/// Arguments are left alone, so `:contains(a  b)` keeps both spaces.
#[must_use]
pub fn normalize_selector_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escaped = false;
    let mut pending_space = false;

    for c in text.trim().chars() {
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        if quote.is_none() && depth == 0 && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Parse results keyed by normalized selector text.
///
/// One cache lives in each [`crate::StylesheetParser`], so repeated
/// selectors in a stylesheet and the splitter's backtracking attempts are
/// parsed once. Failures are cached too.
#[derive(Debug, Default)]
pub struct AstCache {
    entries: HashMap<String, Result<SelectorList, SelectorError>>,
}

impl AstCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, or return the cached result for its normalized form.
    ///
    /// # Errors
    ///
    /// Returns the [`SelectorError`] the text produced when first parsed.
    pub fn get_or_parse(&mut self, text: &str) -> Result<&SelectorList, SelectorError> {
        let result = match self.entries.entry(normalize_selector_text(text)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let parsed = builder::build(text);
                entry.insert(parsed)
            }
        };
        result.as_ref().map_err(Clone::clone)
    }

    /// Number of cached selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been parsed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
