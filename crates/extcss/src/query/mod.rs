//! Selector evaluation against a [`HostBindings`] host.
//!
//! A branch is evaluated left to right over a candidate set. The first
//! regular fragment seeds the set through [`HostBindings::query_native`];
//! every following node then filters it (`:contains()`, `:has()`, a
//! compound continuation such as `.foo`), moves it (`:upward()`,
//! `:nth-ancestor()`, `:xpath()`) or expands it (a continuation starting
//! with a combinator). Branches are OR-ed and results deduplicated in
//! discovery order.
//!
//! Enable the `match-trace` feature to print every step to stderr.

use core::hash::Hash;

use indexmap::IndexSet;

use crate::error::MatchError;
use crate::host::HostBindings;
use crate::matcher::AbsoluteMatcher;
use crate::selector::{ExtendedSelector, RegularSelector, Selector, SelectorList, SelectorNode};

/// Print a `[MATCH]` line when the `match-trace` feature is enabled.
macro_rules! trace {
    ($($arg:tt)*) => {
        if cfg!(feature = "match-trace") {
            eprintln!("[MATCH] {}", format_args!($($arg)*));
        }
    };
}

mod relative;

/// Where a branch's first fragment is queried from.
#[derive(Debug, Clone, Copy)]
enum Origin<E> {
    /// The document: top-level selectors and `:is()`/`:not()` arguments.
    Document,
    /// A `:has()` candidate: the fragment is relative to it.
    Relative(E),
}

/// Every element matching `list`, deduplicated, in discovery order.
///
/// # Errors
///
/// Returns a [`MatchError`] raised by a top-level node. Errors inside
/// relative arguments only make that argument branch fail to match.
pub fn query_all<H: HostBindings>(list: &SelectorList, host: &H) -> Result<Vec<H::Element>, MatchError> {
    let found = Evaluator { host }.eval_list(list, Origin::Document, false)?;
    Ok(found.into_iter().collect())
}

/// Returns `true` if `element` matches `list`.
///
/// Native lists are answered by the host directly; extended lists are
/// evaluated and checked for membership.
///
/// # Errors
///
/// Returns a [`MatchError`] raised by a top-level node.
pub fn match_element<H: HostBindings>(list: &SelectorList, element: H::Element, host: &H) -> Result<bool, MatchError> {
    if list.is_native() {
        return Ok(host.closest_by_selector(element, &list.to_string())? == Some(element));
    }
    Ok(query_all(list, host)?.contains(&element))
}

struct Evaluator<'h, H: HostBindings> {
    host: &'h H,
}

impl<H: HostBindings> Evaluator<'_, H> {
    /// Union of every branch. With `nested` set, a failing branch counts as
    /// matching nothing.
    fn eval_list(
        &self,
        list: &SelectorList,
        origin: Origin<H::Element>,
        nested: bool,
    ) -> Result<IndexSet<H::Element>, MatchError> {
        let mut found = IndexSet::new();
        for selector in &list.selectors {
            match self.eval_branch(selector, origin) {
                Ok(elements) => found.extend(elements),
                Err(error) if nested => {
                    trace!("`{selector}` failed, no match: {error}");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(found)
    }

    fn eval_branch(&self, selector: &Selector, origin: Origin<H::Element>) -> Result<Vec<H::Element>, MatchError> {
        let Some((SelectorNode::Regular(first), rest)) = selector.nodes.split_first() else {
            return Ok(Vec::new());
        };

        let (mut current, rest) = self.seed(first, rest, origin)?;
        trace!("{origin:?} `{}` -> {} candidates", first.text, current.len());

        for node in rest {
            if current.is_empty() {
                break;
            }
            current = match node {
                SelectorNode::Regular(fragment) => self.apply_continuation(fragment, current)?,
                SelectorNode::Extended(ExtendedSelector::Absolute(pc)) => {
                    pc.matcher().apply(pc.name(), self.host, current)?
                }
                SelectorNode::Extended(ExtendedSelector::Relative(pc)) => self.apply_relative(pc, current)?,
            };
            current = dedup(current);
            trace!("`{node}` -> {} candidates", current.len());
        }
        Ok(current)
    }

    /// The first candidate set, and the nodes left to apply.
    ///
    /// A top-level branch that is just `:xpath()` (`*` then the xpath node)
    /// evaluates the expression once from the document instead of once
    /// per element.
    fn seed<'s>(
        &self,
        first: &RegularSelector,
        rest: &'s [SelectorNode],
        origin: Origin<H::Element>,
    ) -> Result<(Vec<H::Element>, &'s [SelectorNode]), MatchError> {
        match origin {
            Origin::Document => {
                let root = self.host.document_root();
                if first.text == "*"
                    && let Some((SelectorNode::Extended(ExtendedSelector::Absolute(pc)), tail)) = rest.split_first()
                    && let AbsoluteMatcher::XPath(expression) = pc.matcher()
                {
                    return Ok((self.host.evaluate_xpath(expression, root)?, tail));
                }
                Ok((self.host.query_native(&first.text, root)?, rest))
            }
            Origin::Relative(scope) => Ok((self.scoped_query(&first.text, scope)?, rest)),
        }
    }

    /// Query `text` relative to `scope`: combinator-led text as is,
    /// anything else among the descendants of `scope`.
    fn scoped_query(&self, text: &str, scope: H::Element) -> Result<Vec<H::Element>, MatchError> {
        let text = text.trim();
        let found = if text.starts_with(['>', '+', '~']) {
            self.host.query_native(text, scope)?
        } else {
            self.host.query_native(&format!(":scope {text}"), scope)?
        };
        Ok(found)
    }

    /// Apply a regular fragment that follows an extended node.
    fn apply_continuation(
        &self,
        fragment: &RegularSelector,
        mut current: Vec<H::Element>,
    ) -> Result<Vec<H::Element>, MatchError> {
        let text = fragment.text.as_str();
        let relative = if text.starts_with(char::is_whitespace) || fragment.leading_combinator().is_some() {
            text
        } else {
            // `.foo` in `div:has(a).foo span` filters the candidates first.
            let (compound, tail) = split_compound(text);
            let mut kept = Vec::with_capacity(current.len());
            for element in current {
                if self.host.closest_by_selector(element, compound)? == Some(element) {
                    kept.push(element);
                }
            }
            if tail.trim().is_empty() {
                return Ok(kept);
            }
            current = kept;
            tail
        };

        let mut found = Vec::new();
        for element in current {
            found.extend(self.scoped_query(relative, element)?);
        }
        Ok(found)
    }
}

/// Split a continuation into its leading compound selector and the rest,
/// at the first top-level whitespace or combinator.
fn split_compound(text: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~')) => {
                return (&text[..i], &text[i..]);
            }
            _ => {}
        }
    }
    (text, "")
}

fn dedup<E: Hash + Eq>(elements: Vec<E>) -> Vec<E> {
    elements.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_compound() {
        assert_eq!(split_compound(".a.b > span"), (".a.b", " > span"));
        assert_eq!(split_compound(":nth-child(2n+1)+p"), (":nth-child(2n+1)", "+p"));
        assert_eq!(split_compound("[title=\"a b\"]"), ("[title=\"a b\"]", ""));
    }
}
