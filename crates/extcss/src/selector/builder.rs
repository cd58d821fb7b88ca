//! Selector AST builder.
//!
//! Walks the token stream once. Native text accumulates in a buffer that is
//! cut into a [`RegularSelector`] whenever an extended pseudo-class starts;
//! absolute arguments are validated by their matcher, relative arguments are
//! tokenized and built recursively under a narrower [`Scope`].

use super::ast::{
    AbsolutePseudoClass, ExtendedSelector, RegularSelector, RelativePseudoClass, Selector, SelectorList,
    SelectorNode,
};
use super::pseudo::{ArgumentKind, PseudoClassName};
use crate::error::{ScopeRule, SelectorError};
use crate::matcher::pattern::strip_quotes;
use crate::native;
use crate::tokenizer::{Token, TokenKind, tokenize};

/// Extended pseudo-classes that may not appear inside a pseudo-element's
/// argument.
const SCOPED_IN_PSEUDO_ELEMENT: &[&str] = &[":has(", ":is(", ":where(", ":-abp-has(", ":if(", ":if-not("];

/// Attribute-form extended selectors: `[-ext-has="a"]`.
const LEGACY_PREFIX: &str = "-ext-";

/// Where a selector list is being built.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// Inside a `:has()`-family argument, at any depth.
    in_has: bool,
    /// Inside any pseudo-class argument.
    nested: bool,
    /// Branches may start with `>`, `+` or `~`.
    allow_leading_combinator: bool,
}

impl Scope {
    /// The scope of `name`'s argument when `name` appears in `self`.
    const fn for_argument(self, name: PseudoClassName) -> Self {
        if name.is_has_family() {
            Self {
                in_has: true,
                nested: true,
                allow_leading_combinator: true,
            }
        } else {
            Self {
                in_has: self.in_has,
                nested: true,
                allow_leading_combinator: false,
            }
        }
    }
}

/// Build the AST of a top-level selector.
pub(crate) fn build(text: &str) -> Result<SelectorList, SelectorError> {
    AstBuilder::new(text, text, Scope::default()).build()
}

struct AstBuilder<'a> {
    tokens: Vec<Token>,
    position: usize,
    /// The top-level selector, quoted in every error.
    source: &'a str,
    scope: Scope,

    selectors: Vec<Selector>,
    nodes: Vec<SelectorNode>,
    buffer: String,
    after_pseudo_element: bool,
    seen_xpath: bool,
    seen_remove: bool,
}

impl<'a> AstBuilder<'a> {
    fn new(text: &str, source: &'a str, scope: Scope) -> Self {
        Self {
            tokens: tokenize(text),
            position: 0,
            source,
            scope,
            selectors: Vec::new(),
            nodes: Vec::new(),
            buffer: String::new(),
            after_pseudo_element: false,
            seen_xpath: false,
            seen_remove: false,
        }
    }

    fn build(mut self) -> Result<SelectorList, SelectorError> {
        while let Some(token) = self.consume() {
            match token.as_mark() {
                None => self.buffer.push_str(&token.value),
                Some(c) => self.handle_mark(c)?,
            }
        }
        self.finish_branch()?;
        Ok(SelectorList {
            selectors: self.selectors,
        })
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next_is_mark(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_mark(c))
    }

    fn consume_word(&mut self) -> Option<String> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Word => {
                let value = token.value.clone();
                self.position += 1;
                Some(value)
            }
            _ => None,
        }
    }

    /// Consume the content of a group whose opening mark was just consumed,
    /// and its closing mark. `None` if the group is never closed.
    fn take_group(&mut self, close: char) -> Option<String> {
        let content = self.consume_word().unwrap_or_default();
        if self.next_is_mark(close) {
            self.position += 1;
            Some(content)
        } else {
            None
        }
    }

    fn unbalanced(&self) -> SelectorError {
        SelectorError::UnbalancedBrackets {
            selector: self.source.to_string(),
        }
    }

    fn scope_violation(&self, rule: ScopeRule) -> SelectorError {
        SelectorError::ScopeViolation {
            rule,
            selector: self.source.to_string(),
        }
    }

    fn handle_mark(&mut self, c: char) -> Result<(), SelectorError> {
        match c {
            ',' => self.finish_branch(),
            ':' => self.consume_colon(),
            '[' => self.consume_attribute(),
            '(' => {
                // Not after a pseudo-class name; left for native validation.
                let content = self.take_group(')').ok_or_else(|| self.unbalanced())?;
                self.buffer.push('(');
                self.buffer.push_str(&content);
                self.buffer.push(')');
                Ok(())
            }
            ')' | ']' => Err(self.unbalanced()),
            '"' | '\'' => {
                let content = self.take_group(c).ok_or_else(|| SelectorError::Lex {
                    selector: self.source.to_string(),
                    quote: c,
                })?;
                self.buffer.push(c);
                self.buffer.push_str(&content);
                self.buffer.push(c);
                Ok(())
            }
            _ if c.is_whitespace() => {
                self.push_whitespace();
                Ok(())
            }
            _ => {
                self.buffer.push(c);
                Ok(())
            }
        }
    }

    /// Collapse whitespace into one space. Leading whitespace of a branch is
    /// dropped; after an extended node it marks a descendant continuation.
    fn push_whitespace(&mut self) {
        if self.buffer.is_empty() && self.nodes.is_empty() {
            return;
        }
        if !self.buffer.ends_with(' ') {
            self.buffer.push(' ');
        }
    }

    fn consume_attribute(&mut self) -> Result<(), SelectorError> {
        let content = self.take_group(']').ok_or_else(|| self.unbalanced())?;
        let trimmed = content.trim();
        if let Some(body) = trimmed
            .get(..LEGACY_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(LEGACY_PREFIX))
            .and_then(|_| trimmed.get(LEGACY_PREFIX.len()..))
        {
            return self.consume_legacy(body);
        }
        self.buffer.push('[');
        self.buffer.push_str(&content);
        self.buffer.push(']');
        Ok(())
    }

    /// `[-ext-name="arg"]` is `:name(arg)`.
    fn consume_legacy(&mut self, body: &str) -> Result<(), SelectorError> {
        let (name, value) = body.split_once('=').unwrap_or((body, ""));
        let name = name.trim();
        let Some(pseudo) = PseudoClassName::lookup(name) else {
            return Err(SelectorError::UnknownPseudoClass {
                name: format!("{LEGACY_PREFIX}{name}"),
                selector: self.source.to_string(),
            });
        };

        let value = value.trim();
        let arg = match strip_quotes(value) {
            Some(inner) => {
                let quote = &value[..1];
                inner.replace(&format!("\\{quote}"), quote)
            }
            None => value.to_string(),
        };
        let arg = if pseudo == PseudoClassName::Remove { String::new() } else { arg };
        self.push_extended(pseudo, Some(arg))
    }

    fn consume_colon(&mut self) -> Result<(), SelectorError> {
        if self.next_is_mark(':') {
            self.position += 1;
            return self.consume_pseudo_element();
        }
        let Some(name) = self.consume_word() else {
            // `:` not followed by a name: native validation rejects it.
            self.buffer.push(':');
            return Ok(());
        };

        if let Some(pseudo) = PseudoClassName::lookup(&name) {
            let arg = if self.next_is_mark('(') {
                self.position += 1;
                Some(self.take_group(')').ok_or_else(|| self.unbalanced())?)
            } else {
                None
            };
            return self.push_extended(pseudo, arg);
        }

        if !native::is_pseudo_class(&name) {
            return Err(SelectorError::UnknownPseudoClass {
                name,
                selector: self.source.to_string(),
            });
        }
        if native::is_legacy_pseudo_element(&name) {
            self.after_pseudo_element = true;
        }
        self.buffer.push(':');
        self.buffer.push_str(&name);
        if self.next_is_mark('(') {
            self.position += 1;
            let content = self.take_group(')').ok_or_else(|| self.unbalanced())?;
            self.buffer.push('(');
            self.buffer.push_str(&content);
            self.buffer.push(')');
        }
        Ok(())
    }

    fn consume_pseudo_element(&mut self) -> Result<(), SelectorError> {
        self.buffer.push_str("::");
        let Some(name) = self.consume_word() else {
            return Ok(());
        };
        self.buffer.push_str(&name);
        self.after_pseudo_element = true;

        if self.next_is_mark('(') {
            self.position += 1;
            let content = self.take_group(')').ok_or_else(|| self.unbalanced())?;
            let lowered = content.to_ascii_lowercase();
            if SCOPED_IN_PSEUDO_ELEMENT.iter().any(|p| lowered.contains(p)) {
                return Err(self.scope_violation(ScopeRule::InsidePseudoElementArgument));
            }
            self.buffer.push('(');
            self.buffer.push_str(&content);
            self.buffer.push(')');
        }
        Ok(())
    }

    fn push_extended(&mut self, name: PseudoClassName, arg: Option<String>) -> Result<(), SelectorError> {
        if self.after_pseudo_element && name.is_scoped() {
            return Err(self.scope_violation(ScopeRule::AfterPseudoElement));
        }
        if self.seen_remove {
            return Err(self.scope_violation(ScopeRule::RemoveNotLast));
        }
        if self.seen_xpath && name != PseudoClassName::Remove {
            return Err(self.scope_violation(ScopeRule::XpathNotLast));
        }
        if name == PseudoClassName::Remove && self.scope.nested {
            return Err(self.scope_violation(ScopeRule::RemoveInsideArgument));
        }
        if self.scope.in_has {
            if name.is_has_family() {
                return Err(self.scope_violation(ScopeRule::HasInsideHas));
            }
            if name.is_is_family() {
                return Err(self.scope_violation(ScopeRule::IsOrWhereInsideHas));
            }
        }

        let arg = arg.unwrap_or_default();
        if name.requires_argument() && arg.trim().is_empty() {
            return Err(SelectorError::MissingArgument {
                pseudo: name,
                selector: self.source.to_string(),
            });
        }

        self.flush_regular(true)?;

        let node = match name.argument_kind(&arg) {
            ArgumentKind::Absolute => {
                ExtendedSelector::Absolute(AbsolutePseudoClass::new(name, arg)?)
            }
            ArgumentKind::Relative => {
                let argument = AstBuilder::new(&arg, self.source, self.scope.for_argument(name)).build()?;
                ExtendedSelector::Relative(RelativePseudoClass { name, argument })
            }
        };
        self.nodes.push(SelectorNode::Extended(node));

        match name {
            PseudoClassName::Xpath => self.seen_xpath = true,
            PseudoClassName::Remove => self.seen_remove = true,
            _ => {}
        }
        Ok(())
    }

    /// Cut the buffer into a regular node.
    ///
    /// Before an extended node a missing subject becomes `*`, so
    /// `:has(a)` is `*:has(a)` and `div > :has(a)` is `div > *:has(a)`.
    fn flush_regular(&mut self, before_extended: bool) -> Result<(), SelectorError> {
        let first = self.nodes.is_empty();
        let mut text = std::mem::take(&mut self.buffer);

        if before_extended {
            let open_ended = text.ends_with(|c: char| c == ' ' || matches!(c, '>' | '+' | '~'));
            if (first && text.is_empty()) || open_ended {
                text.push('*');
            } else if text.is_empty() {
                return Ok(());
            }
        } else {
            text.truncate(text.trim_end().len());
            if text.is_empty() {
                return Ok(());
            }
            if self.seen_remove {
                return Err(self.scope_violation(ScopeRule::RemoveNotLast));
            }
            if self.seen_xpath {
                return Err(self.scope_violation(ScopeRule::XpathNotLast));
            }
        }

        self.validate_regular(&text, first)?;
        self.nodes.push(SelectorNode::Regular(RegularSelector::new(text)));
        Ok(())
    }

    fn validate_regular(&self, text: &str, first: bool) -> Result<(), SelectorError> {
        let trimmed = text.trim();
        if first && !self.scope.allow_leading_combinator && trimmed.starts_with(['>', '+', '~']) {
            return Err(SelectorError::DanglingCombinator {
                selector: self.source.to_string(),
            });
        }
        native::parse_selector_list(trimmed)
            .map(|_| ())
            .map_err(|e| SelectorError::InvalidRegularSelector {
                fragment: trimmed.to_string(),
                reason: e.to_string(),
            })
    }

    fn finish_branch(&mut self) -> Result<(), SelectorError> {
        self.flush_regular(false)?;
        if self.nodes.is_empty() {
            return Err(SelectorError::EmptySelector {
                selector: self.source.to_string(),
            });
        }
        self.selectors.push(Selector {
            nodes: std::mem::take(&mut self.nodes),
        });
        self.after_pseudo_element = false;
        self.seen_xpath = false;
        self.seen_remove = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_subject_becomes_universal() {
        let list = build("div > :contains(ad)").unwrap();
        assert_eq!(
            list.selectors[0].nodes[0],
            SelectorNode::Regular(RegularSelector::new("div > *"))
        );
    }

    #[test]
    fn test_whitespace_after_extended_is_a_descendant_continuation() {
        let list = build("div:has(a)   span").unwrap();
        assert_eq!(
            list.selectors[0].nodes[2],
            SelectorNode::Regular(RegularSelector::new(" span"))
        );
    }
}
