//! `:matches-property()`.

use serde_json::{Map, Value};

use super::pattern::{StringPattern, split_chain, split_name_value, strip_quotes};

/// Matches a chain of element properties such as `dataset.adId=/^\d+$/`.
#[derive(Debug, Clone)]
pub struct PropertyMatcher {
    chain: Vec<StringPattern>,
    value: Option<StringPattern>,
}

impl PropertyMatcher {
    /// Parse `chain` or `chain=value`. The chain is dot-separated; each
    /// segment may be a `/regex/` or a wildcard name.
    ///
    /// # Errors
    ///
    /// Returns a description if the chain has an empty segment or a pattern
    /// is invalid.
    pub fn parse(arg: &str) -> Result<Self, String> {
        let (name, value) = split_name_value(arg.trim());
        let name = name.trim();
        let name = strip_quotes(name).unwrap_or(name);
        if name.is_empty() {
            return Err("missing property name".to_string());
        }

        let chain = split_chain(name)
            .into_iter()
            .map(|segment| {
                if segment.trim().is_empty() {
                    Err(format!("empty segment in property chain `{name}`"))
                } else {
                    StringPattern::parse(segment)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let value = match value {
            Some(v) if v.trim().is_empty() => return Err("missing property value after `=`".to_string()),
            Some(v) => Some(StringPattern::parse(v)?),
            None => None,
        };

        Ok(Self { chain, value })
    }

    /// Walk the chain through `properties` and test the values it reaches.
    ///
    /// Traversal stops without a match on `null` or a scalar before the last
    /// segment. Terminal scalars compare through their string form, so
    /// `null` compares as `"null"`; objects and arrays never match a value
    /// pattern.
    #[must_use]
    pub fn matches(&self, properties: &Map<String, Value>) -> bool {
        let Some((first, rest)) = self.chain.split_first() else {
            return false;
        };

        let mut current: Vec<&Value> = properties
            .iter()
            .filter(|(key, _)| first.is_match(key))
            .map(|(_, value)| value)
            .collect();

        for segment in rest {
            current = current
                .into_iter()
                .flat_map(children)
                .filter(|(key, _)| segment.is_match(key))
                .map(|(_, value)| value)
                .collect();
            if current.is_empty() {
                return false;
            }
        }

        match &self.value {
            None => !current.is_empty(),
            Some(pattern) => current
                .into_iter()
                .filter_map(scalar_string)
                .any(|s| pattern.is_match(&s)),
        }
    }
}

/// Keyed children of an object or array (array keys are indices).
fn children(value: &Value) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
    match value {
        Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.clone(), v))),
        Value::Array(items) => Box::new(items.iter().enumerate().map(|(i, v)| (i.to_string(), v))),
        _ => Box::new(std::iter::empty()),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
