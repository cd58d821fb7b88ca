//! Stylesheet compilation.
//!
//! Splits extended CSS text into rules, resolves each rule's
//! selector/style boundary, and merges rules by selector into
//! [`RuleData`]. A [`StylesheetParser`] owns the selector cache, so
//! compiling the same selector twice parses it once.

mod merge;
mod options;
mod splitter;

use extcss_common::warning::warn_once;
use indexmap::IndexMap;
use serde::Serialize;

use self::merge::RuleMerger;
use self::splitter::{RuleSplitter, check_supported, compile_rule};
use crate::error::StylesheetError;
use crate::selector::{AstCache, SelectorList};

pub use options::StylesheetOptions;

/// Component name used for stylesheet warnings.
const WARNING_COMPONENT: &str = "ExtCSS";

/// How a rule asked to be debugged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugMode {
    /// `debug: true`: this rule only.
    True,
    /// `debug: global`: every rule.
    Global,
}

/// One compiled rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleData {
    /// Normalized selector text, without a trailing `:remove()`.
    pub selector: String,
    /// The parsed selector.
    pub ast: SelectorList,
    /// Declarations after merging, in first-declared order. A removal is
    /// `{remove: "true"}` (plus `content` when configured). `None` if the
    /// rule declared nothing but `debug`.
    pub style: Option<IndexMap<String, String>>,
    /// The rule's `debug` declaration, if it had a valid one.
    pub debug: Option<DebugMode>,
}

/// The result of a batch compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedStylesheet {
    /// Merged rules, in first-seen selector order.
    pub rules: Vec<RuleData>,
    /// `"<rule>: <error>"` for every skipped rule.
    pub warnings: Vec<String>,
    /// Some rule declared `debug: global`.
    pub global_debug: bool,
}

/// Configured stylesheet compiler.
#[derive(Debug, Default)]
pub struct StylesheetParser {
    options: StylesheetOptions,
    cache: AstCache,
}

impl StylesheetParser {
    /// A parser with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser with `options`.
    #[must_use]
    pub fn with_options(options: StylesheetOptions) -> Self {
        Self {
            options,
            cache: AstCache::new(),
        }
    }

    /// The options this parser was built with.
    #[must_use]
    pub const fn options(&self) -> StylesheetOptions {
        self.options
    }

    /// The selector cache.
    #[must_use]
    pub const fn cache(&self) -> &AstCache {
        &self.cache
    }

    /// Compile a whole stylesheet. Invalid rules are skipped and reported
    /// in [`ParsedStylesheet::warnings`].
    pub fn parse_stylesheet(&mut self, text: &str) -> ParsedStylesheet {
        self.parse_rules(&[text])
    }

    /// Compile a list of rule texts as one stylesheet. Each entry may hold
    /// several rules.
    pub fn parse_rules(&mut self, rules: &[&str]) -> ParsedStylesheet {
        let mut merger = RuleMerger::default();
        let mut warnings = Vec::new();

        for rule in rules.iter().flat_map(|text| RuleSplitter::new(text)) {
            match compile_rule(rule, &mut self.cache) {
                Ok(compiled) => merger.add(compiled),
                Err(error) => {
                    let message = format!("{rule}: {error}");
                    if self.options.report_warnings {
                        warn_once(WARNING_COMPONENT, &message);
                    }
                    warnings.push(message);
                }
            }
        }

        let (rules, global_debug) = merger.finish(self.options);
        ParsedStylesheet {
            rules,
            warnings,
            global_debug,
        }
    }

    /// Compile exactly one rule, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns [`StylesheetError::EmptyStylesheet`] for blank input,
    /// [`StylesheetError::UnsupportedAtRule`] or
    /// [`StylesheetError::UnsupportedComment`] before any splitting (an
    /// at-rule block would otherwise split into several rules),
    /// [`StylesheetError::MultipleRules`] if `text` holds more than one
    /// rule, or the rule's own error.
    pub fn parse_single_rule(&mut self, text: &str) -> Result<RuleData, StylesheetError> {
        check_supported(text.trim())?;
        let mut rules = RuleSplitter::new(text);
        let Some(rule) = rules.next() else {
            return Err(StylesheetError::EmptyStylesheet);
        };
        if rules.next().is_some() {
            return Err(StylesheetError::MultipleRules { text: text.to_string() });
        }

        let mut merger = RuleMerger::default();
        merger.add(compile_rule(rule, &mut self.cache)?);
        let (rules, _) = merger.finish(self.options);
        rules.into_iter().next().ok_or(StylesheetError::EmptyStylesheet)
    }
}
