//! XPath subset evaluator for the reference host.
//!
//! [XML Path Language (XPath) 1.0](https://www.w3.org/TR/1999/REC-xpath-19991116/)
//!
//! Supported: absolute and relative location paths, `//`, `.`, `..`, unions
//! with `|`, the axes `child`, `descendant`, `descendant-or-self`, `parent`,
//! `ancestor`, `ancestor-or-self`, `following-sibling`, `preceding-sibling`
//! and `self`, the node tests `*`, `name`, `node()` and `text()`, and
//! predicates built from positions, `last()`, `position()`, attribute tests,
//! string comparisons, `contains()`, `starts-with()`, `not()`, `and` and `or`.
//! Anything else is rejected with [`HostError::InvalidXPath`].

use std::collections::BTreeSet;

use extcss_dom::{DomTree, NodeId};

use crate::error::HostError;

/// A parsed expression: a union of location paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    paths: Vec<LocationPath>,
}

/// [§ 2 Location Paths](https://www.w3.org/TR/1999/REC-xpath-19991116/#location-paths)
#[derive(Debug, Clone, PartialEq, Eq)]
struct LocationPath {
    /// "An absolute location path consists of / optionally followed by a
    /// relative location path."
    absolute: bool,
    steps: Vec<Step>,
}

/// [§ 2.1 Location Steps](https://www.w3.org/TR/1999/REC-xpath-19991116/#location-steps)
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Expr>,
}

/// [§ 2.2 Axes](https://www.w3.org/TR/1999/REC-xpath-19991116/#axes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Self::Child,
            "descendant" => Self::Descendant,
            "descendant-or-self" => Self::DescendantOrSelf,
            "parent" => Self::Parent,
            "ancestor" => Self::Ancestor,
            "ancestor-or-self" => Self::AncestorOrSelf,
            "following-sibling" => Self::FollowingSibling,
            "preceding-sibling" => Self::PrecedingSibling,
            "self" => Self::SelfAxis,
            _ => return None,
        })
    }

    /// Nodes on the axis, in proximity order ("reverse axes" start at the
    /// nearest node).
    fn nodes(self, tree: &DomTree, node: NodeId) -> Vec<NodeId> {
        match self {
            Self::Child => tree.children(node).to_vec(),
            Self::Descendant => tree.descendants(node).collect(),
            Self::DescendantOrSelf => std::iter::once(node).chain(tree.descendants(node)).collect(),
            Self::Parent => tree.parent(node).into_iter().collect(),
            Self::Ancestor => tree.ancestors(node).collect(),
            Self::AncestorOrSelf => std::iter::once(node).chain(tree.ancestors(node)).collect(),
            Self::FollowingSibling => tree.following_siblings(node).collect(),
            Self::PrecedingSibling => tree.preceding_siblings(node).collect(),
            Self::SelfAxis => vec![node],
        }
    }
}

/// [§ 2.3 Node Tests](https://www.w3.org/TR/1999/REC-xpath-19991116/#node-tests)
#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    /// `*`: "true for any node of the principal node type".
    AnyElement,
    /// A tag name, compared ASCII case-insensitively as in HTML documents.
    Name(String),
    /// `node()`
    Node,
    /// `text()`
    Text,
}

impl NodeTest {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self {
            Self::AnyElement => tree.as_element(node).is_some(),
            Self::Name(name) => tree
                .as_element(node)
                .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(name)),
            Self::Node => true,
            Self::Text => tree.as_text(node).is_some(),
        }
    }
}

/// A predicate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// `[@a]`, `[text()]`
    Exists(Operand),
    Compare(Operand, CompareOp, Operand),
    Contains(Operand, Operand),
    StartsWith(Operand, Operand),
    /// `[n]` and `[position() op n]`
    Position(CompareOp, usize),
    /// `[last()]`
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Attribute(String),
    Text,
    Context,
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    const fn holds(self, left: usize, right: usize) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// Parse and evaluate `expression` with `context` as the context node.
/// Results are in document order, without duplicates, and may include
/// non-element nodes.
///
/// # Errors
///
/// Returns [`HostError::InvalidXPath`] if the expression is outside the
/// supported subset.
pub fn evaluate(tree: &DomTree, expression: &str, context: NodeId) -> Result<Vec<NodeId>, HostError> {
    Ok(XPath::parse(expression)?.evaluate(tree, context))
}

impl XPath {
    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidXPath`] on unsupported or malformed syntax.
    pub fn parse(expression: &str) -> Result<Self, HostError> {
        let mut parser = Parser {
            expression,
            chars: expression.chars().collect(),
            pos: 0,
        };
        let mut paths = vec![parser.parse_path()?];
        loop {
            parser.skip_whitespace();
            if parser.eat("|") {
                paths.push(parser.parse_path()?);
            } else {
                break;
            }
        }
        if parser.pos < parser.chars.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self { paths })
    }

    /// Evaluate against `tree` with `context` as the context node.
    #[must_use]
    pub fn evaluate(&self, tree: &DomTree, context: NodeId) -> Vec<NodeId> {
        let mut result = BTreeSet::new();
        for path in &self.paths {
            result.extend(path.evaluate(tree, context));
        }
        // Node ids are allocated in document order.
        result.into_iter().collect()
    }
}

impl LocationPath {
    fn evaluate(&self, tree: &DomTree, context: NodeId) -> BTreeSet<NodeId> {
        let start = if self.absolute { NodeId::ROOT } else { context };
        let mut current = BTreeSet::from([start]);
        for step in &self.steps {
            current = current
                .into_iter()
                .flat_map(|node| step.evaluate(tree, node))
                .collect();
        }
        current
    }
}

impl Step {
    fn evaluate(&self, tree: &DomTree, node: NodeId) -> Vec<NodeId> {
        let mut selected: Vec<NodeId> = self
            .axis
            .nodes(tree, node)
            .into_iter()
            .filter(|&n| self.test.matches(tree, n))
            .collect();

        // [§ 2.4 Predicates] "The predicate filters the node-set with respect
        // to the axis to produce a new node-set."
        for predicate in &self.predicates {
            let size = selected.len();
            selected = selected
                .into_iter()
                .enumerate()
                .filter(|&(i, n)| predicate.holds(tree, n, i + 1, size))
                .map(|(_, n)| n)
                .collect();
        }
        selected
    }
}

impl Expr {
    fn holds(&self, tree: &DomTree, node: NodeId, position: usize, size: usize) -> bool {
        match self {
            Self::Or(a, b) => a.holds(tree, node, position, size) || b.holds(tree, node, position, size),
            Self::And(a, b) => a.holds(tree, node, position, size) && b.holds(tree, node, position, size),
            Self::Not(inner) => !inner.holds(tree, node, position, size),
            Self::Exists(operand) => !operand.values(tree, node).is_empty(),
            // "If both objects to be compared are node-sets, then the comparison
            // will be true if and only if there is a node in the first node-set
            // and a node in the second node-set such that the result of
            // performing the comparison on the string-values of the two nodes
            // is true."
            Self::Compare(left, op, right) => {
                let left = left.values(tree, node);
                let right = right.values(tree, node);
                left.iter().any(|l| {
                    right.iter().any(|r| match op {
                        CompareOp::Ne => l != r,
                        _ => l == r,
                    })
                })
            }
            Self::Contains(haystack, needle) => haystack
                .string(tree, node)
                .contains(&needle.string(tree, node)),
            Self::StartsWith(haystack, prefix) => haystack
                .string(tree, node)
                .starts_with(&prefix.string(tree, node)),
            Self::Position(op, n) => op.holds(position, *n),
            Self::Last => position == size,
        }
    }
}

impl Operand {
    /// String values of the node-set (or literal) the operand denotes.
    fn values(&self, tree: &DomTree, node: NodeId) -> Vec<String> {
        match self {
            Self::Attribute(name) => tree
                .as_element(node)
                .and_then(|e| e.attrs.get(name))
                .cloned()
                .into_iter()
                .collect(),
            Self::Text => tree
                .children(node)
                .iter()
                .filter_map(|&c| tree.as_text(c))
                .map(str::to_string)
                .collect(),
            Self::Context => vec![tree.text_content(node)],
            Self::Literal(s) => vec![s.clone()],
        }
    }

    /// [§ 4.2 string()] "A node-set is converted to a string by returning
    /// the string-value of the node in the node-set that is first in
    /// document order. If the node-set is empty, an empty string is
    /// returned."
    fn string(&self, tree: &DomTree, node: NodeId) -> String {
        self.values(tree, node).into_iter().next().unwrap_or_default()
    }
}

struct Parser<'a> {
    expression: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> HostError {
        HostError::InvalidXPath {
            expression: self.expression.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn looking_at(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.looking_at(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<(), HostError> {
        self.skip_whitespace();
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{s}`")))
        }
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            // `..` after a name is a step, not part of it.
            if self.looking_at("..") {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_path(&mut self) -> Result<LocationPath, HostError> {
        self.skip_whitespace();
        let mut steps = Vec::new();
        let absolute = if self.eat("//") {
            steps.push(descendant_or_self());
            true
        } else if self.eat("/") {
            self.skip_whitespace();
            // A lone `/` selects the document.
            if self.peek().is_none_or(|c| c == '|') {
                return Ok(LocationPath { absolute: true, steps });
            }
            true
        } else {
            false
        };

        steps.push(self.parse_step()?);
        loop {
            self.skip_whitespace();
            if self.eat("//") {
                steps.push(descendant_or_self());
            } else if !self.eat("/") {
                break;
            }
            steps.push(self.parse_step()?);
        }
        Ok(LocationPath { absolute, steps })
    }

    fn parse_step(&mut self) -> Result<Step, HostError> {
        self.skip_whitespace();
        if self.eat("..") {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.eat(".") {
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.looking_at("@") {
            return Err(self.error("attribute steps are not supported"));
        }

        let mut axis = Axis::Child;
        let test = if self.eat("*") {
            NodeTest::AnyElement
        } else {
            let mut name = self.consume_name();
            if self.eat("::") {
                axis = Axis::from_name(&name).ok_or_else(|| self.error(&format!("unsupported axis `{name}`")))?;
                if self.eat("*") {
                    name = "*".to_string();
                } else {
                    name = self.consume_name();
                }
            }
            self.node_test(&name)?
        };

        let mut predicates = Vec::new();
        loop {
            self.skip_whitespace();
            if !self.eat("[") {
                break;
            }
            predicates.push(self.parse_predicate()?);
            self.expect("]")?;
        }
        Ok(Step { axis, test, predicates })
    }

    fn node_test(&mut self, name: &str) -> Result<NodeTest, HostError> {
        match name {
            "" => Err(self.error("expected a node test")),
            "*" => Ok(NodeTest::AnyElement),
            "node" | "text" if self.looking_at("(") => {
                self.expect("(")?;
                self.expect(")")?;
                Ok(if name == "node" { NodeTest::Node } else { NodeTest::Text })
            }
            _ if self.looking_at("(") => Err(self.error(&format!("unsupported node test `{name}()`"))),
            _ => Ok(NodeTest::Name(name.to_string())),
        }
    }

    fn parse_predicate(&mut self) -> Result<Expr, HostError> {
        self.skip_whitespace();
        let start = self.pos;
        if let Some(n) = self.consume_number() {
            self.skip_whitespace();
            if self.looking_at("]") {
                return Ok(Expr::Position(CompareOp::Eq, n));
            }
            self.pos = start;
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, HostError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.eat_keyword("or") {
                return Ok(left);
            }
            left = Expr::Or(Box::new(left), Box::new(self.parse_and()?));
        }
    }

    fn parse_and(&mut self) -> Result<Expr, HostError> {
        let mut left = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            if !self.eat_keyword("and") {
                return Ok(left);
            }
            left = Expr::And(Box::new(left), Box::new(self.parse_primary()?));
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let end = self.pos + keyword.len();
        let boundary = self.chars.get(end).is_none_or(|c| c.is_whitespace() || matches!(c, '(' | '@' | '.'));
        boundary && self.eat(keyword)
    }

    fn parse_primary(&mut self) -> Result<Expr, HostError> {
        self.skip_whitespace();
        if self.eat("(") {
            let inner = self.parse_or()?;
            self.expect(")")?;
            return Ok(inner);
        }
        if self.eat("not(") {
            let inner = self.parse_or()?;
            self.expect(")")?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.eat("last()") {
            return Ok(Expr::Last);
        }
        if self.eat("position()") {
            let op = self.parse_compare_op()?.ok_or_else(|| self.error("expected a comparison after position()"))?;
            self.skip_whitespace();
            let n = self.consume_number().ok_or_else(|| self.error("expected a number"))?;
            return Ok(Expr::Position(op, n));
        }
        for (function, make) in [
            ("contains(", Expr::Contains as fn(Operand, Operand) -> Expr),
            ("starts-with(", Expr::StartsWith),
        ] {
            if self.eat(function) {
                let haystack = self.parse_operand()?;
                self.expect(",")?;
                let needle = self.parse_operand()?;
                self.expect(")")?;
                return Ok(make(haystack, needle));
            }
        }

        let left = self.parse_operand()?;
        match self.parse_compare_op()? {
            None => Ok(Expr::Exists(left)),
            Some(op @ (CompareOp::Eq | CompareOp::Ne)) => Ok(Expr::Compare(left, op, self.parse_operand()?)),
            Some(_) => Err(self.error("only = and != compare strings")),
        }
    }

    fn parse_compare_op(&mut self) -> Result<Option<CompareOp>, HostError> {
        self.skip_whitespace();
        let op = if self.eat("!=") {
            CompareOp::Ne
        } else if self.eat("<=") {
            CompareOp::Le
        } else if self.eat(">=") {
            CompareOp::Ge
        } else if self.eat("=") {
            CompareOp::Eq
        } else if self.eat("<") {
            CompareOp::Lt
        } else if self.eat(">") {
            CompareOp::Gt
        } else {
            return Ok(None);
        };
        Ok(Some(op))
    }

    fn parse_operand(&mut self) -> Result<Operand, HostError> {
        self.skip_whitespace();
        if self.eat("@") {
            let name = self.consume_name();
            if name.is_empty() {
                return Err(self.error("expected an attribute name"));
            }
            return Ok(Operand::Attribute(name));
        }
        if self.eat("text()") {
            return Ok(Operand::Text);
        }
        if self.eat("string()") || self.eat(".") {
            return Ok(Operand::Context);
        }
        if let Some(quote @ ('"' | '\'')) = self.peek() {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|c| c != quote) {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Err(self.error("unterminated string literal"));
            }
            let literal = self.chars[start..self.pos].iter().collect();
            self.pos += 1;
            return Ok(Operand::Literal(literal));
        }
        if let Some(n) = self.consume_number() {
            return Ok(Operand::Literal(n.to_string()));
        }
        Err(self.error("unsupported expression"))
    }

    fn consume_number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }
}

/// The step `//` abbreviates: "`//` is short for
/// `/descendant-or-self::node()/`".
fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_abbreviations() {
        let xpath = XPath::parse("//div/..").unwrap();
        let steps = &xpath.paths[0].steps;
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].axis, Axis::DescendantOrSelf);
        assert_eq!(steps[1].test, NodeTest::Name("div".to_string()));
        assert_eq!(steps[2].axis, Axis::Parent);
    }

    #[test]
    fn test_parse_predicates() {
        let xpath = XPath::parse("./following-sibling::p[@class=\"x\" and contains(., 'y')][1]").unwrap();
        let step = &xpath.paths[0].steps[1];
        assert_eq!(step.axis, Axis::FollowingSibling);
        assert_eq!(step.predicates.len(), 2);
        assert_eq!(step.predicates[1], Expr::Position(CompareOp::Eq, 1));
    }

    #[test]
    fn test_rejects_unsupported_syntax() {
        assert!(XPath::parse("//div/@id").is_err());
        assert!(XPath::parse("following::div").is_err());
        assert!(XPath::parse("//div[count(a) > 1]").is_err());
        assert!(XPath::parse("//div[").is_err());
    }
}
