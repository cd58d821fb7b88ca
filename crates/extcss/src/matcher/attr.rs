//! `:matches-attr()`.

use super::pattern::{StringPattern, split_name_value};

/// Matches any attribute whose name (and optionally value) fit the patterns.
#[derive(Debug, Clone)]
pub struct AttrMatcher {
    name: StringPattern,
    value: Option<StringPattern>,
}

impl AttrMatcher {
    /// Parse `name` or `name=value`.
    ///
    /// # Errors
    ///
    /// Returns a description if either side is empty or invalid.
    pub fn parse(arg: &str) -> Result<Self, String> {
        let (name, value) = split_name_value(arg.trim());
        if name.trim().is_empty() {
            return Err("missing attribute name".to_string());
        }
        let value = match value {
            Some(v) if v.trim().is_empty() => return Err("missing attribute value after `=`".to_string()),
            Some(v) => Some(StringPattern::parse(v)?),
            None => None,
        };
        Ok(Self {
            name: StringPattern::parse(name)?,
            value,
        })
    }

    /// Test an element's attributes.
    #[must_use]
    pub fn matches(&self, attributes: &[(String, String)]) -> bool {
        attributes.iter().any(|(name, value)| {
            self.name.is_match(name) && self.value.as_ref().is_none_or(|p| p.is_match(value))
        })
    }
}
