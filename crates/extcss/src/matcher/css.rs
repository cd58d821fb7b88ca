//! `:matches-css()`, `:matches-css-before()` and `:matches-css-after()`.

use regex::Regex;

use super::pattern::{parse_regex_literal, strip_quotes, wildcard_to_regex};
use crate::host::PseudoElement;
use crate::selector::PseudoClassName;

/// Matches one computed style property.
#[derive(Debug, Clone)]
pub struct CssMatcher {
    /// Which box to read the style from.
    pub pseudo: Option<PseudoElement>,
    /// The property name, lowercased.
    pub property: String,
    /// The value pattern.
    pub value: Regex,
}

impl CssMatcher {
    /// Parse `property: value`, optionally prefixed with `before,` or
    /// `after,` for plain `:matches-css()`.
    ///
    /// # Errors
    ///
    /// Returns a description if the property or value is missing, a prefix
    /// is combined with `-before`/`-after`, or a regex does not compile.
    pub fn parse(name: PseudoClassName, arg: &str) -> Result<Self, String> {
        let mut pseudo = match name {
            PseudoClassName::MatchesCssBefore => Some(PseudoElement::Before),
            PseudoClassName::MatchesCssAfter => Some(PseudoElement::After),
            _ => None,
        };

        let mut declaration = arg.trim();
        if let Some((prefix, rest)) = declaration.split_once(',') {
            let prefixed = match prefix.trim().to_ascii_lowercase().as_str() {
                "before" => Some(PseudoElement::Before),
                "after" => Some(PseudoElement::After),
                _ => None,
            };
            if let Some(prefixed) = prefixed {
                if pseudo.is_some() {
                    return Err(format!("pseudo-element `{prefixed}` given twice"));
                }
                pseudo = Some(prefixed);
                declaration = rest.trim();
            }
        }

        let Some((property, value)) = declaration.split_once(':') else {
            return Err("expected `property: value`".to_string());
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        if property.is_empty() {
            return Err("missing property name".to_string());
        }
        if value.is_empty() {
            return Err("missing property value".to_string());
        }

        Ok(Self {
            pseudo,
            property,
            value: value_regex(value)?,
        })
    }

    /// Test a computed value.
    #[must_use]
    pub fn matches_value(&self, computed: &str) -> bool {
        if self.property == "opacity" {
            return self.value.is_match(&round_opacity(computed));
        }
        self.value.is_match(computed)
    }
}

/// Compile a value pattern: `/regex/flags`, a `url(...)` value, or a
/// wildcard literal.
fn value_regex(value: &str) -> Result<Regex, String> {
    if let Some(literal) = parse_regex_literal(value) {
        return literal.compile();
    }

    let source = match url_argument(value) {
        // Computed styles may or may not quote the URL.
        Some(url) => {
            let inner = wildcard_to_regex(url);
            let inner = &inner[1..inner.len() - 1];
            format!(r#"^url\(\s*["']?{inner}["']?\s*\)$"#)
        }
        None => wildcard_to_regex(value),
    };
    Regex::new(&source).map_err(|e| format!("invalid value pattern: {e}"))
}

/// The unquoted argument of a `url(...)` value.
fn url_argument(value: &str) -> Option<&str> {
    let inner = value
        .strip_prefix("url(")
        .or_else(|| value.strip_prefix("URL("))?
        .strip_suffix(')')?
        .trim();
    Some(strip_quotes(inner).unwrap_or(inner))
}

/// Round an opacity value to two decimals so `0.8999999761581421` compares
/// equal to `0.9`.
fn round_opacity(computed: &str) -> String {
    computed.trim().parse::<f64>().map_or_else(
        |_| computed.to_string(),
        |value| ((value * 100.0).round() / 100.0).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_opacity() {
        assert_eq!(round_opacity("0.8999999761581421"), "0.9");
        assert_eq!(round_opacity("1"), "1");
        assert_eq!(round_opacity("auto"), "auto");
    }

    #[test]
    fn test_url_argument_strips_quotes() {
        assert_eq!(url_argument("url(\"a.png\")"), Some("a.png"));
        assert_eq!(url_argument("url(a.png)"), Some("a.png"));
        assert_eq!(url_argument("none"), None);
    }
}
