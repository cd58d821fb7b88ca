//! Merging compiled rules by selector.
//!
//! Rules with the same normalized selector collapse into one: later
//! property writes win, and a removal discards the other properties.

use indexmap::IndexMap;

use super::splitter::CompiledRule;
use super::{DebugMode, RuleData, StylesheetOptions};
use crate::selector::SelectorList;

const REMOVE: &str = "remove";
const DEBUG: &str = "debug";
const CONTENT: &str = "content";

struct PendingRule {
    ast: SelectorList,
    declarations: IndexMap<String, String>,
    remove: bool,
}

/// Accumulates compiled rules in first-seen selector order.
#[derive(Default)]
pub(crate) struct RuleMerger {
    entries: IndexMap<String, PendingRule>,
}

impl RuleMerger {
    pub(crate) fn add(&mut self, rule: CompiledRule) {
        let pending = self.entries.entry(rule.selector).or_insert_with(|| PendingRule {
            ast: rule.ast,
            declarations: IndexMap::new(),
            remove: false,
        });
        pending.remove |= rule.remove;
        for declaration in rule.declarations {
            let _ = pending.declarations.insert(declaration.property, declaration.value);
        }
    }

    /// Finalize every entry. The flag is `true` if any rule asked for
    /// `debug: global`.
    pub(crate) fn finish(self, options: StylesheetOptions) -> (Vec<RuleData>, bool) {
        let mut global_debug = false;
        let rules = self
            .entries
            .into_iter()
            .map(|(selector, pending)| {
                let rule = finalize(selector, pending, options);
                global_debug |= rule.debug == Some(DebugMode::Global);
                rule
            })
            .collect();
        (rules, global_debug)
    }
}

fn finalize(selector: String, mut pending: PendingRule, options: StylesheetOptions) -> RuleData {
    let debug = match pending.declarations.shift_remove(DEBUG).as_deref().map(str::trim) {
        Some("true") => Some(DebugMode::True),
        Some("global") => Some(DebugMode::Global),
        _ => None,
    };
    let remove = pending.remove
        || pending
            .declarations
            .shift_remove(REMOVE)
            .is_some_and(|value| value.trim() == "true");

    let style = if remove {
        let mut style = IndexMap::new();
        let _ = style.insert(REMOVE.to_string(), "true".to_string());
        if options.keep_content_on_remove
            && let Some(content) = pending.declarations.shift_remove(CONTENT)
        {
            let _ = style.insert(CONTENT.to_string(), content);
        }
        Some(style)
    } else {
        Some(pending.declarations).filter(|declarations| !declarations.is_empty())
    };

    RuleData {
        selector,
        ast: pending.ast,
        style,
        debug,
    }
}
