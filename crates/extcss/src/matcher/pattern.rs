//! Argument micro-grammar shared by the matchers: regex literals, wildcard
//! patterns and quoted strings.

use regex::{Regex, RegexBuilder};

/// Flags a `/pattern/flags` literal may carry. Only `i`, `m` and `s` change
/// matching; `g`, `u` and `y` are accepted and ignored.
const REGEX_FLAGS: &str = "gimsuy";

/// A `/pattern/flags` literal split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexLiteral<'a> {
    /// Text between the slashes.
    pub pattern: &'a str,
    /// Letters after the closing slash.
    pub flags: &'a str,
}

/// Recognize a `/pattern/flags` literal. Anything else, including `/` and
/// `//`, is not one.
#[must_use]
pub fn parse_regex_literal(raw: &str) -> Option<RegexLiteral<'_>> {
    let rest = raw.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (pattern, flags) = (&rest[..end], &rest[end + 1..]);
    if pattern.is_empty() || !flags.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(RegexLiteral { pattern, flags })
}

impl RegexLiteral<'_> {
    /// Compile the literal.
    ///
    /// # Errors
    ///
    /// Returns a description if a flag is unknown or the pattern does not
    /// compile.
    pub fn compile(self) -> Result<Regex, String> {
        if let Some(bad) = self.flags.chars().find(|&c| !REGEX_FLAGS.contains(c)) {
            return Err(format!("unsupported regular expression flag `{bad}`"));
        }
        // `\/` is how a slash is written inside a delimited literal.
        let pattern = self.pattern.replace("\\/", "/");
        RegexBuilder::new(&pattern)
            .case_insensitive(self.flags.contains('i'))
            .multi_line(self.flags.contains('m'))
            .dot_matches_new_line(self.flags.contains('s'))
            .build()
            .map_err(|e| format!("invalid regular expression: {e}"))
    }
}

/// Build an anchored regex source from a wildcard pattern: every `*` matches
/// any run of characters, everything else is literal.
#[must_use]
pub fn wildcard_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^{body}$")
}

/// Strip one pair of matching surrounding quotes, if present.
#[must_use]
pub fn strip_quotes(raw: &str) -> Option<&str> {
    let first = raw.chars().next()?;
    if !matches!(first, '"' | '\'') || raw.len() < 2 || !raw.ends_with(first) {
        return None;
    }
    Some(&raw[1..raw.len() - 1])
}

/// Undo the escapes a literal argument may carry: `\(`, `\)`, `\[`, `\]`,
/// `\\`, `\"` and `\'`. Other backslashes are kept.
#[must_use]
pub fn unescape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '(' | ')' | '[' | ']' | '\\' | '"' | '\'')
        {
            out.push(next);
            let _ = chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// A name or value pattern: a quoted literal, a `/regex/`, or a bare
/// wildcard pattern. Quoted and bare patterns must match the whole string
/// (`*` matching anything); regexes match anywhere.
#[derive(Debug, Clone)]
pub struct StringPattern {
    regex: Regex,
}

impl StringPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// Returns a description if the pattern is empty or a regex does not
    /// compile.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("empty pattern".to_string());
        }
        if let Some(literal) = parse_regex_literal(raw) {
            return Ok(Self {
                regex: literal.compile()?,
            });
        }
        let text = strip_quotes(raw).unwrap_or(raw);
        Regex::new(&wildcard_to_regex(text))
            .map(|regex| Self { regex })
            .map_err(|e| format!("invalid pattern: {e}"))
    }

    /// Test a string against the pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Split `name=value` at the first `=` that is not inside quotes or a
/// `/regex/` segment. A regex segment starts at the beginning or right
/// after a `.` (property chains).
#[must_use]
pub fn split_name_value(raw: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    let mut in_regex = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            prev = Some(c);
            continue;
        }
        match c {
            '\\' => escaped = true,
            _ if quote == Some(c) => quote = None,
            _ if quote.is_some() => {}
            '/' if in_regex => in_regex = false,
            '/' if matches!(prev, None | Some('.')) => in_regex = true,
            _ if in_regex => {}
            '"' | '\'' => quote = Some(c),
            '=' => return (&raw[..i], Some(&raw[i + 1..])),
            _ => {}
        }
        prev = Some(c);
    }
    (raw, None)
}

/// Split a property chain at `.` separators outside `/regex/` segments and
/// quotes.
#[must_use]
pub fn split_chain(raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_regex = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            prev = Some(c);
            continue;
        }
        match c {
            '\\' => escaped = true,
            '/' if in_regex => in_regex = false,
            '/' if matches!(prev, None | Some('.')) => in_regex = true,
            '.' if !in_regex => {
                segments.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = Some(c);
    }
    segments.push(&raw[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_literal_detection() {
        let literal = parse_regex_literal("/ad\\d+/i").unwrap();
        assert_eq!(literal.pattern, "ad\\d+");
        assert_eq!(literal.flags, "i");
        assert!(parse_regex_literal("/").is_none());
        assert!(parse_regex_literal("//").is_none());
        assert!(parse_regex_literal("/a/1").is_none());
        assert!(parse_regex_literal("text").is_none());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let literal = parse_regex_literal("/a/x").unwrap();
        assert!(literal.compile().is_err());
    }

    #[test]
    fn test_split_name_value_skips_regex_and_quotes() {
        assert_eq!(split_name_value("a=b"), ("a", Some("b")));
        assert_eq!(split_name_value("/a=b/=c"), ("/a=b/", Some("c")));
        assert_eq!(split_name_value("\"a=b\"=c"), ("\"a=b\"", Some("c")));
        assert_eq!(split_name_value("x./y=z/.w=v"), ("x./y=z/.w", Some("v")));
        assert_eq!(split_name_value("name"), ("name", None));
    }

    #[test]
    fn test_split_chain() {
        assert_eq!(split_chain("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(split_chain("a./b.c/.d"), vec!["a", "/b.c/", "d"]);
    }
}
