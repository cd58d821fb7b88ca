//! Rule splitting and the selector/style boundary.
//!
//! A rule's selector may itself contain `{` (`div:contains({)`), so the
//! boundary is found by trying every `{` from the right until the text in
//! front of it parses as a selector.

use crate::error::StylesheetError;
use crate::selector::{AstCache, SelectorList, normalize_selector_text};
use crate::style::{StyleDeclaration, parse_style_block};

/// The marker that turns a rule into a removal.
const REMOVE_MARKER: &str = ":remove()";

/// A rule whose selector and declarations parsed.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    /// Normalized selector text, without a trailing `:remove()`.
    pub selector: String,
    pub ast: SelectorList,
    pub declarations: Vec<StyleDeclaration>,
    /// The selector ended with `:remove()`.
    pub remove: bool,
}

/// Iterator over the rules of a stylesheet, as trimmed slices.
///
/// A rule ends at the first `}` outside quotes, parentheses and brackets,
/// falling back to the first `}` at all, or the end of input.
pub(crate) struct RuleSplitter<'a> {
    rest: &'a str,
}

impl<'a> RuleSplitter<'a> {
    pub(crate) const fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for RuleSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            self.rest = rest;
            return None;
        }
        let end = find_rule_end(rest).map_or(rest.len(), |i| i + 1);
        let (rule, tail) = rest.split_at(end);
        self.rest = tail;
        Some(rule.trim_end())
    }
}

fn find_rule_end(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
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
            (None, '}') if depth == 0 => return Some(i),
            _ => {}
        }
    }
    text.find('}')
}

/// Returns `true` if `/*` appears outside quotes.
fn has_comment(text: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    for c in text.chars() {
        match quote {
            Some(q) if c == q && prev != '\\' => quote = None,
            Some(_) => {}
            None if matches!(c, '"' | '\'') => quote = Some(c),
            None if c == '*' && prev == '/' => return true,
            None => {}
        }
        prev = c;
    }
    false
}

/// `{` candidates of a rule, right to left, as `(selector, block)` slices.
/// The block still carries the rule's closing `}`.
struct BraceCandidates<'a> {
    rule: &'a str,
    end: usize,
}

impl<'a> Iterator for BraceCandidates<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.rule[..self.end].rfind('{')?;
        self.end = i;
        Some((&self.rule[..i], &self.rule[i + 1..]))
    }
}

/// Byte offsets of every `:remove()` outside quotes, parentheses and
/// brackets. Markers inside pseudo-class arguments belong to that argument.
fn top_level_remove_markers(selector: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escaped = false;
    let mut skip_to = 0;

    for (i, c) in selector.char_indices() {
        if i < skip_to {
            continue;
        }
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
            (None, ':')
                if depth == 0
                    && selector
                        .get(i..i + REMOVE_MARKER.len())
                        .is_some_and(|s| s.eq_ignore_ascii_case(REMOVE_MARKER)) =>
            {
                found.push(i);
                skip_to = i + REMOVE_MARKER.len();
            }
            _ => {}
        }
    }
    found
}

/// Split a trailing `:remove()` off `selector`.
fn strip_remove(selector: &str) -> Result<(&str, bool), StylesheetError> {
    let selector = selector.trim();
    match top_level_remove_markers(selector).as_slice() {
        [] => Ok((selector, false)),
        [at] if at + REMOVE_MARKER.len() == selector.len() => Ok((selector[..*at].trim_end(), true)),
        [_] => Err(StylesheetError::RemoveNotLast {
            selector: selector.to_string(),
        }),
        _ => Err(StylesheetError::MultipleRemoveMarkers {
            selector: selector.to_string(),
        }),
    }
}

/// Reject rule text the compiler does not handle: at-rules and comments.
///
/// # Errors
///
/// Returns [`StylesheetError::UnsupportedAtRule`] or
/// [`StylesheetError::UnsupportedComment`].
pub(crate) fn check_supported(rule: &str) -> Result<(), StylesheetError> {
    if rule.starts_with('@') {
        return Err(StylesheetError::UnsupportedAtRule { rule: rule.to_string() });
    }
    if has_comment(rule) {
        return Err(StylesheetError::UnsupportedComment { rule: rule.to_string() });
    }
    Ok(())
}

/// Compile one rule.
///
/// # Errors
///
/// Returns the first structural error, or the error of the right-most `{`
/// candidate if no candidate's selector parses.
pub(crate) fn compile_rule(rule: &str, cache: &mut AstCache) -> Result<CompiledRule, StylesheetError> {
    let rule = rule.trim();
    if rule.is_empty() {
        return Err(StylesheetError::EmptyStylesheet);
    }
    if rule.starts_with('{') {
        return Err(StylesheetError::NoSelectorBeforeStyle { rule: rule.to_string() });
    }
    check_supported(rule)?;

    let candidates = BraceCandidates {
        rule,
        end: rule.len(),
    };
    let mut first_error = None;

    for (selector_part, block) in candidates {
        match compile_candidate(rule, selector_part, block, cache) {
            Ok(compiled) => return Ok(compiled),
            Err(error) => {
                let _ = first_error.get_or_insert(error);
            }
        }
    }

    if let Some(error) = first_error {
        return Err(error);
    }

    // No `{` at all: only a removal may stand alone.
    let (selector, remove) = strip_remove(rule)?;
    let ast = parse_cached(selector, cache)?;
    if !remove && !ast.has_remove() {
        return Err(StylesheetError::StyleOrRemoveRequired {
            selector: selector.to_string(),
        });
    }
    Ok(CompiledRule {
        selector: normalize_selector_text(selector),
        ast,
        declarations: Vec::new(),
        remove: true,
    })
}

fn compile_candidate(
    rule: &str,
    selector_part: &str,
    block: &str,
    cache: &mut AstCache,
) -> Result<CompiledRule, StylesheetError> {
    let (selector, remove) = strip_remove(selector_part)?;
    if selector.is_empty() {
        return Err(StylesheetError::NoSelectorBeforeStyle { rule: rule.to_string() });
    }
    let ast = parse_cached(selector, cache)?;
    let Some(block) = block.strip_suffix('}') else {
        return Err(StylesheetError::UnclosedStyleBlock { rule: rule.to_string() });
    };
    let remove = remove || ast.has_remove();
    let declarations = parse_style_block(block, remove)?;
    Ok(CompiledRule {
        selector: normalize_selector_text(selector),
        ast,
        declarations,
        remove,
    })
}

fn parse_cached(selector: &str, cache: &mut AstCache) -> Result<SelectorList, StylesheetError> {
    Ok(cache.get_or_parse(selector)?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_splitter_respects_groups() {
        let rules: Vec<&str> = RuleSplitter::new("a:contains(}) { x: y }  b { z: w }").collect();
        assert_eq!(rules, ["a:contains(}) { x: y }", "b { z: w }"]);
    }

    #[test]
    fn test_brace_candidates_run_right_to_left() {
        let rule = "a:contains({) { x: y }";
        let found: Vec<(&str, &str)> = BraceCandidates { rule, end: rule.len() }.collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "a:contains({) ");
        assert_eq!(found[1].0, "a:contains(");
    }

    #[test]
    fn test_strip_remove() {
        assert_eq!(strip_remove(".a:remove()").unwrap(), (".a", true));
        assert_eq!(strip_remove(".a").unwrap(), (".a", false));
        assert!(matches!(
            strip_remove(".a:remove():remove()"),
            Err(StylesheetError::MultipleRemoveMarkers { .. })
        ));
        assert!(matches!(
            strip_remove(".a:remove() .b"),
            Err(StylesheetError::RemoveNotLast { .. })
        ));
        assert_eq!(strip_remove(".a:REMOVE()").unwrap(), (".a", true));
        assert_eq!(
            strip_remove("div:contains(:remove())").unwrap(),
            ("div:contains(:remove())", false)
        );
        assert_eq!(
            strip_remove(r#"a[title=":remove()"]:remove()"#).unwrap(),
            (r#"a[title=":remove()"]"#, true)
        );
    }

    #[test]
    fn test_has_comment_ignores_quotes() {
        assert!(has_comment("a /* x */ { b: c }"));
        assert!(!has_comment("a[title=\"/*\"] { b: c }"));
    }
}
