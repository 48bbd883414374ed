// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query tree - the abstract, backend-neutral search expression.
//!
//! A [`SearchNode`] joins its children with a [`Connector`] and may be
//! negated. Children are either nested nodes or [`SearchLeaf`] conditions
//! of the form `(field, filter_type, value)`.
//!
//! # Example
//!
//! ```rust
//! use postgres_fts_backend::query::{SearchNode, Connector};
//!
//! // name:foo AND NOT content:bar
//! let node = SearchNode::leaf("name", "foo")
//!     .and(SearchNode::leaf("content", "bar").negate());
//!
//! assert_eq!(node.connector, Connector::And);
//! assert_eq!(node.children.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// Separator between a field name and its filter type (`author__exact`).
pub const FILTER_SEPARATOR: &str = "__";

/// Value that means "anything at all".
pub const WILDCARD: &str = "*";

/// Boolean connector joining a node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connector {
    #[default]
    And,
    Or,
}

/// Interior node of the query tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchNode {
    /// How children are combined
    pub connector: Connector,
    /// Whether the combined children are complemented
    pub negated: bool,
    /// Nested nodes and leaf conditions
    pub children: Vec<SearchChild>,
}

/// A child of a [`SearchNode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchChild {
    Node(SearchNode),
    Leaf(SearchLeaf),
}

/// Leaf condition: `field`, filter type and value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLeaf {
    pub field: String,
    pub filter_type: FilterType,
    pub value: QueryValue,
}

/// Filter type suffix of a leaf expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    #[default]
    Content,
    Contains,
    Exact,
    Fuzzy,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Range,
}

impl FilterType {
    /// Parse a filter suffix, `None` if it is not a known filter.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let filter_type = match suffix {
            "content" => FilterType::Content,
            "contains" => FilterType::Contains,
            "exact" => FilterType::Exact,
            "fuzzy" => FilterType::Fuzzy,
            "startswith" => FilterType::StartsWith,
            "endswith" => FilterType::EndsWith,
            "gt" => FilterType::Gt,
            "gte" => FilterType::Gte,
            "lt" => FilterType::Lt,
            "lte" => FilterType::Lte,
            "in" => FilterType::In,
            "range" => FilterType::Range,
            _ => return None,
        };
        Some(filter_type)
    }
}

/// Value carried by a leaf.
///
/// All variants hold the literal text handed to the database; the variant
/// only says how the text was produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryValue {
    /// Plain text
    Text(String),
    /// Exact phrase
    Exact(String),
    /// User-entered query string (may contain `-term` and `"phrases"`)
    Auto(String),
    /// Passed to the database's raw tsquery parser untouched
    Raw(String),
}

impl QueryValue {
    /// The literal text of this value
    pub fn as_str(&self) -> &str {
        match self {
            QueryValue::Text(s) | QueryValue::Exact(s) | QueryValue::Auto(s) | QueryValue::Raw(s) => s,
        }
    }

    /// True if the value is blank
    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }

    /// True if the value is the match-all wildcard
    pub fn is_wildcard(&self) -> bool {
        self.as_str().trim() == WILDCARD
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split `field__filter` into its field name and filter type.
///
/// A missing or unknown suffix yields [`FilterType::Content`] and leaves the
/// first segment as the field name.
pub fn split_expression(expression: &str) -> (String, FilterType) {
    let mut parts = expression.split(FILTER_SEPARATOR);
    let field = parts.next().unwrap_or_default().to_string();
    let filter_type = expression
        .rsplit_once(FILTER_SEPARATOR)
        .and_then(|(_, suffix)| FilterType::from_suffix(suffix))
        .unwrap_or_default();
    (field, filter_type)
}

impl SearchNode {
    /// Create an empty node (matches everything)
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            negated: false,
            children: Vec::new(),
        }
    }

    /// Create a node holding a single leaf: `expression` is `field` or `field__filter`
    pub fn leaf(expression: &str, value: impl Into<QueryValue>) -> Self {
        let (field, filter_type) = split_expression(expression);
        Self {
            connector: Connector::And,
            negated: false,
            children: vec![SearchChild::Leaf(SearchLeaf {
                field,
                filter_type,
                value: value.into(),
            })],
        }
    }

    /// Combine with AND
    pub fn and(self, other: SearchNode) -> Self {
        Self::combine(Connector::And, self, other)
    }

    /// Combine with OR
    pub fn or(self, other: SearchNode) -> Self {
        Self::combine(Connector::Or, self, other)
    }

    /// Toggle negation
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// True if the node has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Append a child node, flattening it when it adds nothing structurally.
    ///
    /// Empty nodes are kept: they match everything, which matters under OR.
    pub fn push(&mut self, node: SearchNode) {
        if !node.negated && !node.is_empty() && (node.connector == self.connector || node.len() == 1) {
            self.children.extend(node.children);
        } else {
            self.children.push(SearchChild::Node(node));
        }
    }

    /// Iterate over every leaf in the tree, depth first
    pub fn leaves(&self) -> Vec<&SearchLeaf> {
        let mut out = Vec::new();
        for child in &self.children {
            match child {
                SearchChild::Leaf(leaf) => out.push(leaf),
                SearchChild::Node(node) => out.extend(node.leaves()),
            }
        }
        out
    }

    fn combine(connector: Connector, left: SearchNode, right: SearchNode) -> Self {
        let mut node = SearchNode::new(connector);
        node.push(left);
        node.push(right);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_expression_plain_field() {
        assert_eq!(split_expression("name"), ("name".to_string(), FilterType::Content));
    }

    #[test]
    fn test_split_expression_with_filter() {
        assert_eq!(split_expression("name__exact"), ("name".to_string(), FilterType::Exact));
        assert_eq!(split_expression("pub_date__gte"), ("pub_date".to_string(), FilterType::Gte));
    }

    #[test]
    fn test_split_expression_unknown_suffix() {
        assert_eq!(split_expression("name__bogus"), ("name".to_string(), FilterType::Content));
    }

    #[test]
    fn test_leaf_node() {
        let node = SearchNode::leaf("author__contains", "daniel");
        assert_eq!(node.connector, Connector::And);
        assert!(!node.negated);
        assert_eq!(
            node.children,
            vec![SearchChild::Leaf(SearchLeaf {
                field: "author".to_string(),
                filter_type: FilterType::Contains,
                value: QueryValue::Text("daniel".to_string()),
            })]
        );
    }

    #[test]
    fn test_and_flattens_single_leaves() {
        let node = SearchNode::leaf("name", "foo").and(SearchNode::leaf("name", "bar"));
        assert_eq!(node.connector, Connector::And);
        assert_eq!(node.len(), 2);
        assert!(node.children.iter().all(|c| matches!(c, SearchChild::Leaf(_))));
    }

    #[test]
    fn test_or_of_ands_keeps_structure() {
        let left = SearchNode::leaf("name", "a").and(SearchNode::leaf("name", "b"));
        let right = SearchNode::leaf("name", "c");
        let node = left.or(right);

        assert_eq!(node.connector, Connector::Or);
        match &node.children[0] {
            SearchChild::Node(inner) => {
                assert_eq!(inner.connector, Connector::And);
                assert_eq!(inner.len(), 2);
            }
            _ => panic!("Expected nested And node"),
        }
        assert!(matches!(node.children[1], SearchChild::Leaf(_)));
    }

    #[test]
    fn test_negated_child_is_not_flattened() {
        let node = SearchNode::leaf("content", "index")
            .and(SearchNode::leaf("content", "document").negate());

        assert_eq!(node.len(), 2);
        match &node.children[1] {
            SearchChild::Node(inner) => assert!(inner.negated),
            _ => panic!("Expected negated node"),
        }
    }

    #[test]
    fn test_empty_child_is_kept_under_or() {
        let node = SearchNode::leaf("name", "a").or(SearchNode::new(Connector::Or));
        assert_eq!(node.len(), 2);
        assert!(matches!(&node.children[1], SearchChild::Node(inner) if inner.is_empty()));
    }

    #[test]
    fn test_double_negate_cancels() {
        let node = SearchNode::leaf("name", "foo").negate().negate();
        assert!(!node.negated);
    }

    #[test]
    fn test_value_predicates() {
        assert!(QueryValue::from("").is_empty());
        assert!(QueryValue::from("   ").is_empty());
        assert!(QueryValue::from("*").is_wildcard());
        assert!(!QueryValue::from("foo*").is_wildcard());
        assert_eq!(QueryValue::Auto("index -document".into()).as_str(), "index -document");
    }

    #[test]
    fn test_leaves_depth_first() {
        let node = SearchNode::leaf("name", "a")
            .or(SearchNode::leaf("name", "b").and(SearchNode::leaf("content", "c")));
        let fields: Vec<&str> = node.leaves().iter().map(|l| l.value.as_str()).collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
    }
}
