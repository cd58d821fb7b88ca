//! Native selector parser.

use super::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NativeSelectorError, NativeSelectorList, Nth, PseudoClass, SimpleSelector,
    LEGACY_PSEUDO_ELEMENTS, STATE_PSEUDO_CLASSES, is_pseudo_element,
};

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// Split a selector list at top-level commas, respecting brackets,
/// parentheses and quotes. Parts are trimmed.
///
/// # Errors
///
/// Returns [`NativeSelectorError::Unterminated`] if a group is never closed.
pub fn split_selector_list(raw: &str) -> Result<Vec<&str>, NativeSelectorError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
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
            (None, ',') if depth == 0 => {
                parts.push(raw[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if let Some(q) = quote {
        return Err(NativeSelectorError::Unterminated(q));
    }
    if depth > 0 {
        return Err(NativeSelectorError::Unterminated('('));
    }
    parts.push(raw[start..].trim());
    Ok(parts)
}

/// Parse a native selector list.
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// Supports type, class, id, universal and attribute selectors, the four
/// combinators, the structural pseudo-classes listed in this module, state
/// pseudo-classes and pseudo-elements (which never match), and a leading
/// combinator relative to `:scope`.
///
/// # Errors
///
/// Returns a [`NativeSelectorError`] describing the first syntax problem.
pub fn parse_selector_list(raw: &str) -> Result<NativeSelectorList, NativeSelectorError> {
    let selectors = split_selector_list(raw)?
        .into_iter()
        .map(|part| ComplexParser::new(part).parse())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NativeSelectorList { selectors })
}

/// Parser for one complex selector.
struct ComplexParser {
    chars: Vec<char>,
    pos: usize,
}

impl ComplexParser {
    fn new(raw: &str) -> Self {
        Self {
            chars: raw.trim().chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Skip whitespace, returning `true` if any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
    ///
    /// Parse left-to-right, collecting compound selectors and the combinators
    /// between them, then build the right-to-left chain used for matching.
    fn parse(mut self) -> Result<ComplexSelector, NativeSelectorError> {
        if self.chars.is_empty() {
            return Err(NativeSelectorError::Empty);
        }

        let mut compounds: Vec<CompoundSelector> = Vec::new();
        let mut combinators_between: Vec<Combinator> = Vec::new();

        // A leading combinator is relative to the scoping root: `> a` is
        // `:scope > a`.
        if let Some(combinator) = self.peek().and_then(Combinator::from_char) {
            let _ = self.consume();
            let _ = self.skip_whitespace();
            compounds.push(CompoundSelector {
                simple_selectors: vec![SimpleSelector::PseudoClass(PseudoClass::Scope)],
            });
            combinators_between.push(combinator);
        }

        loop {
            compounds.push(self.parse_compound()?);

            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(c) if Combinator::from_char(c).is_some() => {
                    let _ = self.consume();
                    let _ = self.skip_whitespace();
                    if self.peek().is_none() {
                        return Err(NativeSelectorError::DanglingCombinator(c));
                    }
                    if let Some(combinator) = Combinator::from_char(c) {
                        combinators_between.push(combinator);
                    }
                }
                // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
                // "A descendant combinator is whitespace that separates two compound selectors."
                Some(_) if had_whitespace => combinators_between.push(Combinator::Descendant),
                Some(c) => return Err(NativeSelectorError::UnexpectedChar(c)),
            }
        }

        // "The elements represented by a complex selector are the elements matched
        // by the last compound selector in the complex selector."
        let Some(subject) = compounds.pop() else {
            return Err(NativeSelectorError::Empty);
        };
        let combinators = compounds
            .into_iter()
            .zip(combinators_between)
            .rev()
            .map(|(compound, combinator)| (combinator, compound))
            .collect();

        Ok(ComplexSelector {
            subject,
            combinators,
        })
    }

    /// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    fn parse_compound(&mut self) -> Result<CompoundSelector, NativeSelectorError> {
        let mut simple_selectors = Vec::new();

        while let Some(c) = self.peek() {
            let simple = match c {
                // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
                '*' if simple_selectors.is_empty() => {
                    let _ = self.consume();
                    SimpleSelector::Universal
                }

                // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
                // "The class selector is given as a full stop (. U+002E)
                // immediately followed by an identifier."
                '.' => {
                    let _ = self.consume();
                    SimpleSelector::Class(self.consume_name("a class name")?)
                }

                // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
                // "An ID selector is a hash (#, U+0023) immediately followed by the ID value"
                '#' => {
                    let _ = self.consume();
                    SimpleSelector::Id(self.consume_name("an id")?)
                }

                // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
                '[' => {
                    let _ = self.consume();
                    SimpleSelector::Attribute(self.consume_attribute()?)
                }

                // [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
                // [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
                ':' => {
                    let _ = self.consume();
                    self.consume_pseudo()?
                }

                // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
                _ if simple_selectors.is_empty() && self.starts_name() => {
                    SimpleSelector::Type(self.consume_name("a type name")?.to_ascii_lowercase())
                }

                _ if c.is_whitespace() || Combinator::from_char(c).is_some() => break,
                _ => return Err(NativeSelectorError::UnexpectedChar(c)),
            };
            simple_selectors.push(simple);
        }

        if simple_selectors.is_empty() {
            return Err(self
                .peek()
                .map_or(NativeSelectorError::Empty, NativeSelectorError::UnexpectedChar));
        }
        Ok(CompoundSelector { simple_selectors })
    }

    /// [§ 4.3.11 would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn starts_name(&self) -> bool {
        match self.peek() {
            Some('-') => self
                .peek_at(1)
                .is_some_and(|c| is_ident_start_char(c) || c == '-' || c == '\\'),
            Some('\\') => self.peek_at(1).is_some(),
            Some(c) => is_ident_start_char(c),
            None => false,
        }
    }

    /// [§ 4.3.12 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Also used after `#`, where digits may come first.
    fn consume_name(&mut self, what: &'static str) -> Result<String, NativeSelectorError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                let _ = self.consume();
                name.push(self.consume_escape());
            } else if is_ident_char(c) {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(NativeSelectorError::MissingName(what));
        }
        Ok(name)
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escape(&mut self) -> char {
        let mut hex = String::new();
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            if let Some(c) = self.consume() {
                hex.push(c);
            }
        }
        if hex.is_empty() {
            return self.consume().unwrap_or(char::REPLACEMENT_CHARACTER);
        }
        // "If the next input code point is whitespace, consume it as well."
        if self.peek().is_some_and(char::is_whitespace) {
            let _ = self.consume();
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// Parse an attribute selector after its `[`.
    fn consume_attribute(&mut self) -> Result<AttributeSelector, NativeSelectorError> {
        let _ = self.skip_whitespace();
        let name = self.consume_name("an attribute name")?.to_ascii_lowercase();
        let _ = self.skip_whitespace();

        let operator: fn(String) -> AttributeOperator = match self.consume() {
            Some(']') => {
                return Ok(AttributeSelector {
                    name,
                    operator: AttributeOperator::Exists,
                    ignore_case: false,
                });
            }
            Some('=') => AttributeOperator::Equals,
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.consume() != Some('=') {
                    return Err(NativeSelectorError::UnexpectedChar(op));
                }
                match op {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::PrefixMatch,
                    '$' => AttributeOperator::SuffixMatch,
                    _ => AttributeOperator::SubstringMatch,
                }
            }
            Some(c) => return Err(NativeSelectorError::UnexpectedChar(c)),
            None => return Err(NativeSelectorError::Unterminated('[')),
        };

        let _ = self.skip_whitespace();
        let value = self.consume_attribute_value()?;
        let _ = self.skip_whitespace();

        // [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
        let mut ignore_case = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            let _ = self.consume();
            ignore_case = flag.eq_ignore_ascii_case(&'i');
            let _ = self.skip_whitespace();
        }

        match self.consume() {
            Some(']') => Ok(AttributeSelector {
                name,
                operator: operator(value),
                ignore_case,
            }),
            Some(c) => Err(NativeSelectorError::UnexpectedChar(c)),
            None => Err(NativeSelectorError::Unterminated('[')),
        }
    }

    /// Attribute value: a quoted string or an identifier.
    fn consume_attribute_value(&mut self) -> Result<String, NativeSelectorError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                let _ = self.consume();
                let mut value = String::new();
                loop {
                    match self.consume() {
                        Some(c) if c == q => return Ok(value),
                        Some('\\') => value.push(self.consume_escape()),
                        Some(c) => value.push(c),
                        None => return Err(NativeSelectorError::Unterminated(q)),
                    }
                }
            }
            Some(_) if self.starts_name() || self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.consume_name("an attribute value")
            }
            Some(c) => Err(NativeSelectorError::UnexpectedChar(c)),
            None => Err(NativeSelectorError::Unterminated('[')),
        }
    }

    /// Parse a pseudo-class or pseudo-element after its first `:`.
    fn consume_pseudo(&mut self) -> Result<SimpleSelector, NativeSelectorError> {
        let double_colon = self.peek() == Some(':');
        if double_colon {
            let _ = self.consume();
        }

        let name = self
            .consume_name("a pseudo-class name")?
            .to_ascii_lowercase();
        let argument = if self.peek() == Some('(') {
            let _ = self.consume();
            Some(self.consume_parenthesized()?)
        } else {
            None
        };

        if double_colon {
            if !is_pseudo_element(&name) {
                return Err(NativeSelectorError::UnknownPseudoElement(name));
            }
            return Ok(SimpleSelector::NeverMatch);
        }

        let invalid = |arg: &str| NativeSelectorError::InvalidArgument {
            pseudo: name.clone(),
            arg: arg.to_string(),
        };
        let nth = |arg: Option<&String>| {
            arg.map(String::as_str)
                .and_then(parse_nth)
                .ok_or_else(|| invalid(arg.map_or("", String::as_str)))
        };

        let pseudo_class = match (name.as_str(), argument.as_ref()) {
            ("root", None) => PseudoClass::Root,
            ("scope", None) => PseudoClass::Scope,
            ("first-child", None) => PseudoClass::FirstChild,
            ("last-child", None) => PseudoClass::LastChild,
            ("only-child", None) => PseudoClass::OnlyChild,
            ("first-of-type", None) => PseudoClass::FirstOfType,
            ("last-of-type", None) => PseudoClass::LastOfType,
            ("only-of-type", None) => PseudoClass::OnlyOfType,
            ("empty", None) => PseudoClass::Empty,
            ("link" | "any-link", None) => PseudoClass::Link,
            ("enabled", None) => PseudoClass::Enabled,
            ("disabled", None) => PseudoClass::Disabled,
            ("checked", None) => PseudoClass::Checked,
            ("required", None) => PseudoClass::Required,
            ("optional", None) => PseudoClass::Optional,
            ("nth-child", arg) => PseudoClass::NthChild(nth(arg)?),
            ("nth-last-child", arg) => PseudoClass::NthLastChild(nth(arg)?),
            ("nth-of-type", arg) => PseudoClass::NthOfType(nth(arg)?),
            ("nth-last-of-type", arg) => PseudoClass::NthLastOfType(nth(arg)?),
            ("lang", Some(arg)) => {
                let lang = arg.trim().trim_matches(|c| c == '"' || c == '\'');
                if lang.is_empty() {
                    return Err(invalid(arg));
                }
                PseudoClass::Lang(lang.to_string())
            }
            ("dir", Some(_)) => return Ok(SimpleSelector::NeverMatch),
            (other, None)
                if STATE_PSEUDO_CLASSES.contains(&other) || LEGACY_PSEUDO_ELEMENTS.contains(&other) =>
            {
                return Ok(SimpleSelector::NeverMatch);
            }
            (other, Some(arg)) if super::is_pseudo_class(other) => return Err(invalid(arg)),
            (other, None) if super::is_pseudo_class(other) => return Err(invalid("")),
            (other, _) => return Err(NativeSelectorError::UnknownPseudoClass(other.to_string())),
        };
        Ok(SimpleSelector::PseudoClass(pseudo_class))
    }

    /// Consume up to the matching `)`, returning the content.
    fn consume_parenthesized(&mut self) -> Result<String, NativeSelectorError> {
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        let mut content = String::new();
        while let Some(c) = self.consume() {
            match (quote, c) {
                (_, '\\') => {
                    content.push(c);
                    if let Some(escaped) = self.consume() {
                        content.push(escaped);
                    }
                    continue;
                }
                (Some(q), _) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(content);
                    }
                }
                _ => {}
            }
            content.push(c);
        }
        Err(NativeSelectorError::Unterminated('('))
    }
}

/// Parse `An+B`, `odd` or `even`.
///
/// [§ 6.1 An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
fn parse_nth(raw: &str) -> Option<Nth> {
    let s: String = raw.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_lowercase();
    match s.as_str() {
        // "The value odd is equivalent to 2n+1"
        "odd" => return Some(Nth { a: 2, b: 1 }),
        // "The value even is equivalent to 2n"
        "even" => return Some(Nth { a: 2, b: 0 }),
        _ => {}
    }

    let Some(n_at) = s.find('n') else {
        return s.parse().ok().map(|b| Nth { a: 0, b });
    };

    let a = match &s[..n_at] {
        "" | "+" => 1,
        "-" => -1,
        digits => digits.parse().ok()?,
    };
    let rest = &s[n_at + 1..];
    let b = if rest.is_empty() {
        0
    } else if rest.starts_with('+') || rest.starts_with('-') {
        rest.parse().ok()?
    } else {
        return None;
    };
    Some(Nth { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nth_forms() {
        assert_eq!(parse_nth("odd"), Some(Nth { a: 2, b: 1 }));
        assert_eq!(parse_nth("even"), Some(Nth { a: 2, b: 0 }));
        assert_eq!(parse_nth("3"), Some(Nth { a: 0, b: 3 }));
        assert_eq!(parse_nth("-n + 3"), Some(Nth { a: -1, b: 3 }));
        assert_eq!(parse_nth("2n-1"), Some(Nth { a: 2, b: -1 }));
        assert_eq!(parse_nth("n"), Some(Nth { a: 1, b: 0 }));
        assert_eq!(parse_nth("2x"), None);
        assert_eq!(parse_nth("n3"), None);
    }

    #[test]
    fn test_split_selector_list_respects_groups() {
        assert_eq!(
            split_selector_list(r#"a, [title="x,y"], b:lang(en)"#).unwrap(),
            vec!["a", r#"[title="x,y"]"#, "b:lang(en)"]
        );
        assert!(split_selector_list("[title='x]").is_err());
    }
}
