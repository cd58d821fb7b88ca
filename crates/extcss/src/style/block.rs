//! Declaration block parser.

use super::StyleDeclaration;
use crate::error::StyleError;

/// Find the first of `delimiters` outside quotes and parentheses, returning
/// its byte offset and the character found.
///
/// Backslash escapes are skipped, so `content: "a\";b"` and
/// `url(data:a;b)` are scanned as single values.
#[must_use]
pub fn find_delimiter(text: &str, delimiters: &[char]) -> Option<(usize, char)> {
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
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && delimiters.contains(&c) => return Some((i, c)),
            _ => {}
        }
    }
    None
}

/// Parse the text between `{` and `}` into declarations, in source order.
///
/// Empty declarations (`;;`) are skipped. When `has_remove` is set the
/// selector ended with `:remove()`, and an empty block is allowed.
///
/// # Errors
///
/// - [`StyleError::MissingProperty`] for `: red`
/// - [`StyleError::MissingValue`] for `color: ;`
/// - [`StyleError::UnclosedDeclaration`] for text without a `:`
/// - [`StyleError::EmptyDeclarationBlock`] if nothing was declared
pub fn parse_style_block(text: &str, has_remove: bool) -> Result<Vec<StyleDeclaration>, StyleError> {
    let mut declarations = Vec::new();
    let mut rest = text;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if rest.is_empty() {
            break;
        }

        let Some((colon, ':')) = find_delimiter(rest, &[':', ';']) else {
            let end = find_delimiter(rest, &[';']).map_or(rest.len(), |(i, _)| i);
            return Err(StyleError::UnclosedDeclaration {
                declaration: rest[..end].trim().to_string(),
            });
        };

        let property = rest[..colon].trim();
        let after = &rest[colon + 1..];
        let end = find_delimiter(after, &[';']).map_or(after.len(), |(i, _)| i);
        let value = after[..end].trim();

        if property.is_empty() {
            return Err(StyleError::MissingProperty {
                declaration: rest[..colon + 1 + end].trim().to_string(),
            });
        }
        if value.is_empty() {
            return Err(StyleError::MissingValue {
                property: property.to_ascii_lowercase(),
            });
        }

        declarations.push(StyleDeclaration::new(property.to_ascii_lowercase(), value));
        rest = &after[end..];
    }

    if declarations.is_empty() && !has_remove {
        return Err(StyleError::EmptyDeclarationBlock);
    }
    Ok(declarations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_delimiter_skips_quotes_and_parens() {
        assert_eq!(find_delimiter("a: b", &[':']), Some((1, ':')));
        assert_eq!(find_delimiter("\"a;b\";", &[';']), Some((5, ';')));
        assert_eq!(find_delimiter("url(data:x;y);", &[';', ':']), Some((13, ';')));
        assert_eq!(find_delimiter("'a\\'b'", &[';']), None);
    }
}
