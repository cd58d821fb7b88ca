//! In-memory document for the extcss reference host and tests.
//!
//! Nodes follow the [DOM Living Standard](https://dom.spec.whatwg.org/) only
//! as far as selector matching looks: elements carry attributes and
//! script-visible properties, and text and comments exist so that
//! `:empty`, `textContent` and XPath `text()` see them.
//!
//! # Design
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Trees are
//! loaded top-down from JSON fixtures, so id order is document order.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};

/// Attribute name to value.
pub type AttributesMap = HashMap<String, String>;

/// Script-visible element properties (`element.foo.bar` chains), stored as a
/// JSON object so arbitrary nesting and `null` can be represented.
pub type PropertiesMap = Map<String, Value>;

/// Index of a node in its [`DomTree`]. This is the element handle the
/// reference host hands to the selector engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// Tree links are stored both ways so sibling combinators and XPath axes
/// step in constant time.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// Node kinds a fixture can produce.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data.
///
/// NOTE: We only store the local name, the attribute list and a bag of
/// script-visible properties. Namespaces and custom element state are not
/// modelled.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Local name as written in the fixture. Matching lowercases it.
    pub tag_name: String,
    /// Attributes, read by attribute selectors and `:matches-attr()`.
    pub attrs: AttributesMap,
    /// Properties reachable from script on the element object, consulted by
    /// `:matches-property()`.
    pub properties: PropertiesMap,
}

impl ElementData {
    /// Create element data with the given tag name and no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.into(), value.into());
        self
    }

    /// Builder-style property setter.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        let _ = self.properties.insert(name.into(), value);
        self
    }

    /// The `id` attribute, if any.
    #[must_use]
    pub fn id(&self) -> Option<&String> {
        self.attrs.get("id")
    }

    /// Whitespace-separated tokens of the `class` attribute.
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attrs
            .get("class")
            .map(|classlist| classlist.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A document: one `Document` node at [`NodeId::ROOT`] and everything
/// appended below it.
///
/// Node ids are allocated in creation order, which for trees built top-down
/// (as the fixture loader does) is also document order.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// A tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let _ = tree.push(NodeType::Document);
        tree
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Node `id`, or `None` for an id from another tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Create a node of `node_type` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not allocated by this tree.
    pub fn append(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let child = self.push(node_type);
        let last = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);

        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.prev_sibling = last;
        if let Some(last) = last {
            self.nodes[last.0].next_sibling = Some(child);
        }
        child
    }

    /// Append an element to `parent`.
    pub fn append_element(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        self.append(parent, NodeType::Element(data))
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, NodeType::Text(text.into()))
    }

    /// Parent node, including the document.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get the parent of a node if that parent is an element.
    ///
    /// The document node is not an element, so the document element has no
    /// parent element.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.as_element(p).is_some())
    }

    /// Child nodes of every kind.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over the element children of a node, skipping text and comments.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
    }

    /// Node after `id` under the same parent.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Node before `id` under the same parent.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Ancestors from the parent up to the document node.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Earlier siblings, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Later siblings, nearest first.
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> FollowingSiblingIterator<'_> {
        FollowingSiblingIterator {
            tree: self,
            current: self.next_sibling(id),
        }
    }

    /// Iterate over all descendants of a node in document (pre-)order,
    /// excluding the node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Element data, if `id` is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Character data, if `id` is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.node_type {
            NodeType::Text(text) => Some(text),
            _ => None,
        }
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// "The descendant text content of a node is the concatenation of the data
    /// of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// First element child of the document; what `:root` matches.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// Short human-readable description of an element: `tag#id.class1.class2`.
    #[must_use]
    pub fn describe(&self, id: NodeId) -> String {
        let Some(element) = self.as_element(id) else {
            return match self.get(id).map(|n| &n.node_type) {
                Some(NodeType::Document) => "#document".to_string(),
                Some(NodeType::Text(_)) => "#text".to_string(),
                Some(NodeType::Comment(_)) => "#comment".to_string(),
                _ => "#invalid".to_string(),
            };
        };
        let mut out = element.tag_name.to_ascii_lowercase();
        if let Some(el_id) = element.id() {
            out.push('#');
            out.push_str(el_id);
        }
        let mut classes: Vec<&str> = element.classes().into_iter().collect();
        classes.sort_unstable();
        for class in classes {
            out.push('.');
            out.push_str(class);
        }
        out
    }

    /// Path of element descriptions from the document element down to `id`,
    /// joined with ` > `.
    #[must_use]
    pub fn describe_path(&self, id: NodeId) -> String {
        let mut parts: Vec<String> = self
            .ancestors(id)
            .filter(|&a| self.as_element(a).is_some())
            .map(|a| self.describe(a))
            .collect();
        parts.reverse();
        parts.push(self.describe(id));
        parts.join(" > ")
    }

    /// Build a tree from a JSON fixture.
    ///
    /// The fixture is a single element object (the document element):
    ///
    /// ```json
    /// {"tag": "html", "children": [
    ///   {"tag": "body", "children": [
    ///     {"tag": "div", "attrs": {"id": "ad"}, "properties": {"dataset": {"x": 1}},
    ///      "children": ["some text"]}
    ///   ]}
    /// ]}
    /// ```
    ///
    /// String children become text nodes, `{"comment": "..."}` comment nodes.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Json`] if the fixture is not valid JSON of the
    /// expected shape.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let root: FixtureElement = serde_json::from_str(json)?;
        let mut tree = Self::new();
        tree.insert_fixture_element(NodeId::ROOT, root);
        Ok(tree)
    }

    fn insert_fixture_element(&mut self, parent: NodeId, fixture: FixtureElement) {
        let data = ElementData {
            tag_name: fixture.tag,
            attrs: fixture.attrs,
            properties: fixture.properties,
        };
        let id = self.append_element(parent, data);
        for child in fixture.children {
            match child {
                FixtureNode::Text(text) => {
                    let _ = self.append_text(id, text);
                }
                FixtureNode::Comment { comment } => {
                    let _ = self.append(id, NodeType::Comment(comment));
                }
                FixtureNode::Element(element) => self.insert_fixture_element(id, element),
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors produced while loading a JSON DOM fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The fixture text is not valid JSON or does not have the fixture shape.
    #[error("invalid DOM fixture: {0}")]
    Json(#[from] serde_json::Error),
}

/// One element in a JSON fixture.
#[derive(Debug, Deserialize)]
struct FixtureElement {
    tag: String,
    #[serde(default)]
    attrs: AttributesMap,
    #[serde(default)]
    properties: PropertiesMap,
    #[serde(default)]
    children: Vec<FixtureNode>,
}

/// A child entry in a JSON fixture.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureNode {
    Text(String),
    Comment { comment: String },
    Element(FixtureElement),
}

/// See [`DomTree::ancestors`].
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// See [`DomTree::preceding_siblings`].
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// See [`DomTree::following_siblings`].
pub struct FollowingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for FollowingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
