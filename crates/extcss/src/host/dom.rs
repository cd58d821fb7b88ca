//! [`HostBindings`] over an in-memory [`DomTree`].

use std::collections::HashMap;

use extcss_dom::{DomTree, NodeId};
use serde_json::{Map, Value};

use super::{HostBindings, PseudoElement, xpath};
use crate::error::HostError;
use crate::native::{MatchContext, NativeSelectorList, parse_selector_list};
use crate::style::parse_style_block;

/// Reference host answering engine queries from a [`DomTree`].
///
/// There is no layout engine behind it, so computed styles come from
/// explicit overrides registered with [`DomHost::with_style`], falling back
/// to the element's inline `style` attribute.
#[derive(Debug, Clone)]
pub struct DomHost<'a> {
    tree: &'a DomTree,
    styles: HashMap<(NodeId, Option<PseudoElement>), HashMap<String, String>>,
}

impl<'a> DomHost<'a> {
    /// Create a host over `tree` with no style overrides.
    #[must_use]
    pub fn new(tree: &'a DomTree) -> Self {
        Self {
            tree,
            styles: HashMap::new(),
        }
    }

    /// Builder-style computed style override for `element` (or one of its
    /// pseudo-elements).
    #[must_use]
    pub fn with_style(
        mut self,
        element: NodeId,
        pseudo: Option<PseudoElement>,
        property: &str,
        value: impl Into<String>,
    ) -> Self {
        self.set_style(element, pseudo, property, value);
        self
    }

    /// Register a computed style override.
    pub fn set_style(
        &mut self,
        element: NodeId,
        pseudo: Option<PseudoElement>,
        property: &str,
        value: impl Into<String>,
    ) {
        let _ = self
            .styles
            .entry((element, pseudo))
            .or_default()
            .insert(property.to_ascii_lowercase(), value.into());
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    fn parse(selector: &str) -> Result<NativeSelectorList, HostError> {
        parse_selector_list(selector).map_err(|e| HostError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    }

    fn context(&self, scope: NodeId) -> MatchContext<'a> {
        if scope == NodeId::ROOT {
            MatchContext::new(self.tree)
        } else {
            MatchContext::scoped(self.tree, scope)
        }
    }

    fn inline_style(&self, element: NodeId, property: &str) -> Option<String> {
        let style = self.tree.as_element(element)?.attrs.get("style")?;
        parse_style_block(style, true)
            .ok()?
            .into_iter()
            .rev()
            .find(|declaration| declaration.property == property)
            .map(|declaration| declaration.value)
    }
}

impl HostBindings for DomHost<'_> {
    type Element = NodeId;

    fn document_root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn query_native(&self, selector: &str, root: NodeId) -> Result<Vec<NodeId>, HostError> {
        let list = Self::parse(selector)?;
        let ctx = self.context(root);
        // `+ a` and `~ a` reach outside the root's subtree.
        let base = if list.is_anchored() { NodeId::ROOT } else { root };
        Ok(self
            .tree
            .descendants(base)
            .filter(|&node| list.matches(&ctx, node))
            .collect())
    }

    fn computed_style_value(&self, element: NodeId, pseudo: Option<PseudoElement>, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        if let Some(value) = self.styles.get(&(element, pseudo)).and_then(|s| s.get(&property)) {
            return Some(value.clone());
        }
        match pseudo {
            None => self.inline_style(element, &property),
            Some(_) => None,
        }
    }

    fn evaluate_xpath(&self, expression: &str, context: NodeId) -> Result<Vec<NodeId>, HostError> {
        Ok(xpath::evaluate(self.tree, expression, context)?
            .into_iter()
            .filter(|&node| self.tree.as_element(node).is_some())
            .collect())
    }

    fn text_content(&self, element: NodeId) -> String {
        self.tree.text_content(element)
    }

    fn closest_by_selector(&self, element: NodeId, selector: &str) -> Result<Option<NodeId>, HostError> {
        let list = Self::parse(selector)?;
        let ctx = MatchContext::new(self.tree);
        Ok(std::iter::once(element)
            .chain(self.tree.ancestors(element))
            .find(|&node| list.matches(&ctx, node)))
    }

    fn parent_element(&self, element: NodeId) -> Option<NodeId> {
        self.tree.parent_element(element)
    }

    fn attributes(&self, element: NodeId) -> Vec<(String, String)> {
        let mut attributes: Vec<(String, String)> = self
            .tree
            .as_element(element)
            .map(|e| e.attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        attributes.sort();
        attributes
    }

    fn properties(&self, element: NodeId) -> Map<String, Value> {
        self.tree
            .as_element(element)
            .map(|e| e.properties.clone())
            .unwrap_or_default()
    }
}
