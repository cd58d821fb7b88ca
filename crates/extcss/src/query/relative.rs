//! Relative pseudo-classes: `:has()` and aliases, `:if-not()`, `:is()`,
//! `:where()`, `:not()` and selector-form `:upward()`.

use indexmap::IndexSet;

use super::{Evaluator, Origin};
use crate::error::MatchError;
use crate::host::HostBindings;
use crate::selector::{RelativeOp, RelativePseudoClass, SelectorList};

impl<H: HostBindings> Evaluator<'_, H> {
    /// Apply a relative pseudo-class to the candidate set.
    ///
    /// The builder only wraps names with a [`RelativeOp`] in a
    /// [`RelativePseudoClass`], so the `None` case leaves the set as is.
    pub(super) fn apply_relative(
        &self,
        pc: &RelativePseudoClass,
        current: Vec<H::Element>,
    ) -> Result<Vec<H::Element>, MatchError> {
        let Some(op) = pc.name.relative_op() else {
            return Ok(current);
        };
        let list = &pc.argument;
        let kept = match op {
            RelativeOp::Has => current
                .into_iter()
                .filter(|&e| self.has_relative(list, e))
                .collect(),
            RelativeOp::HasNot => current
                .into_iter()
                .filter(|&e| !self.has_relative(list, e))
                .collect(),
            RelativeOp::Is => {
                let matching = self.matching_set(list)?;
                current.into_iter().filter(|e| matching.contains(e)).collect()
            }
            RelativeOp::Not => {
                let matching = self.matching_set(list)?;
                current.into_iter().filter(|e| !matching.contains(e)).collect()
            }
            RelativeOp::Upward => self.upward(list, current)?,
        };
        Ok(kept)
    }

    /// Returns `true` if any branch of `list` finds an element relative to
    /// `element`.
    fn has_relative(&self, list: &SelectorList, element: H::Element) -> bool {
        list.selectors
            .iter()
            .any(|selector| match self.eval_branch(selector, Origin::Relative(element)) {
                Ok(found) => !found.is_empty(),
                Err(error) => {
                    trace!("`{selector}` failed for {element:?}, no match: {error}");
                    false
                }
            })
    }

    /// Every element in the document matching `list`.
    fn matching_set(&self, list: &SelectorList) -> Result<IndexSet<H::Element>, MatchError> {
        self.eval_list(list, Origin::Document, true)
    }

    /// The nearest proper ancestor of each candidate matching `list`.
    fn upward(&self, list: &SelectorList, current: Vec<H::Element>) -> Result<Vec<H::Element>, MatchError> {
        let mut found = Vec::new();

        if list.is_native() {
            let selector = list.to_string();
            for element in current {
                let Some(parent) = self.host.parent_element(element) else {
                    continue;
                };
                match self.host.closest_by_selector(parent, &selector) {
                    Ok(Some(ancestor)) => found.push(ancestor),
                    Ok(None) => {}
                    Err(error) => {
                        trace!("upward `{selector}` failed, no match: {error}");
                    }
                }
            }
            return Ok(found);
        }

        let matching = self.matching_set(list)?;
        for element in current {
            let mut ancestor = self.host.parent_element(element);
            while let Some(candidate) = ancestor {
                if matching.contains(&candidate) {
                    found.push(candidate);
                    break;
                }
                ancestor = self.host.parent_element(candidate);
            }
        }
        Ok(found)
    }
}
