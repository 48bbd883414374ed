// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SearchQuery - accumulates filters into a query tree.
//!
//! ```rust
//! use postgres_fts_backend::query::{SearchQuery, Connector};
//!
//! let mut query = SearchQuery::new("content");
//! query.filter("name", "foo");
//! query.add_filter(postgres_fts_backend::query::SearchNode::leaf("name", "bar"), true);
//!
//! let tree = query.build_query();
//! assert_eq!(tree.connector, Connector::Or);
//! ```

use super::node::{Connector, QueryValue, SearchNode};
use crate::backend::SearchOptions;
use crate::schema::ModelSchema;

/// Mutable query object handed out by the engine.
///
/// Filters are folded into a single [`SearchNode`]. An empty query builds
/// the match-everything node.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    query_filter: SearchNode,
    document_field: String,
    options: SearchOptions,
}

impl SearchQuery {
    /// Create an empty query. `document_field` is the "search anywhere" field name.
    pub fn new(document_field: impl Into<String>) -> Self {
        Self {
            query_filter: SearchNode::default(),
            document_field: document_field.into(),
            options: SearchOptions::default(),
        }
    }

    /// Add a filter node, joined to what is already there with AND (or OR if `use_or`).
    pub fn add_filter(&mut self, node: SearchNode, use_or: bool) -> &mut Self {
        let connector = if use_or { Connector::Or } else { Connector::And };

        if self.query_filter.is_empty() {
            self.query_filter.connector = connector;
            self.query_filter.push(node);
        } else if self.query_filter.connector == connector && !self.query_filter.negated {
            self.query_filter.push(node);
        } else {
            let existing = std::mem::take(&mut self.query_filter);
            let mut root = SearchNode::new(connector);
            root.push(existing);
            root.push(node);
            self.query_filter = root;
        }
        self
    }

    /// AND a leaf: `expression` is `field` or `field__filter`
    pub fn filter(&mut self, expression: &str, value: impl Into<QueryValue>) -> &mut Self {
        self.add_filter(SearchNode::leaf(expression, value), false)
    }

    /// AND a negated leaf
    pub fn exclude(&mut self, expression: &str, value: impl Into<QueryValue>) -> &mut Self {
        self.add_filter(SearchNode::leaf(expression, value).negate(), false)
    }

    /// AND a user-entered query string against the document field.
    ///
    /// The string is kept whole: `-term`, `"phrase"` and `or` are interpreted
    /// by the database's web-search parser.
    pub fn auto_query(&mut self, query_string: &str) -> &mut Self {
        let field = self.document_field.clone();
        self.filter(&field, QueryValue::Auto(query_string.to_string()))
    }

    /// Restrict the search to the given models
    pub fn models(&mut self, models: impl IntoIterator<Item = ModelSchema>) -> &mut Self {
        self.options.models = models.into_iter().collect();
        self
    }

    /// Slice the results: `[start, end)`
    pub fn set_limits(&mut self, start: Option<u64>, end: Option<u64>) -> &mut Self {
        self.options.start_offset = start.unwrap_or(0);
        self.options.end_offset = end;
        self
    }

    /// Drop all filters and limits
    pub fn clear(&mut self) {
        self.query_filter = SearchNode::default();
        self.options = SearchOptions::default();
    }

    /// The accumulated query tree
    pub fn build_query(&self) -> SearchNode {
        self.query_filter.clone()
    }

    /// Options the backend receives with this query
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Name of the "search anywhere" field
    pub fn document_field(&self) -> &str {
        &self.document_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterType, SearchChild};

    #[test]
    fn test_build_query_all() {
        let query = SearchQuery::new("content");
        assert_eq!(query.build_query(), SearchNode::default());
    }

    #[test]
    fn test_build_query_single_word() {
        let mut query = SearchQuery::new("content");
        query.filter("content", "hello");
        assert_eq!(query.build_query(), SearchNode::leaf("content", "hello"));
    }

    #[test]
    fn test_build_query_multiple_word() {
        let mut query = SearchQuery::new("content");
        query.filter("name", "foo");
        query.filter("name", "bar");

        let tree = query.build_query();
        assert_eq!(tree.connector, Connector::And);
        assert_eq!(tree, SearchNode::leaf("name", "foo").and(SearchNode::leaf("name", "bar")));
    }

    #[test]
    fn test_build_query_or() {
        let mut query = SearchQuery::new("content");
        query.filter("name", "foo");
        query.add_filter(SearchNode::leaf("name", "bar"), true);

        let tree = query.build_query();
        assert_eq!(tree.connector, Connector::Or);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_and_after_or_nests() {
        let mut query = SearchQuery::new("content");
        query.filter("name", "a");
        query.add_filter(SearchNode::leaf("name", "b"), true);
        query.filter("name", "c");

        let tree = query.build_query();
        assert_eq!(tree.connector, Connector::And);
        match &tree.children[0] {
            SearchChild::Node(inner) => assert_eq!(inner.connector, Connector::Or),
            _ => panic!("Expected nested Or node"),
        }
    }

    #[test]
    fn test_exclude() {
        let mut query = SearchQuery::new("content");
        query.exclude("name", "daniel1");

        let tree = query.build_query();
        match &tree.children[0] {
            SearchChild::Node(inner) => {
                assert!(inner.negated);
                assert_eq!(inner.leaves()[0].value.as_str(), "daniel1");
            }
            _ => panic!("Expected negated node"),
        }
    }

    #[test]
    fn test_auto_query_targets_document_field() {
        let mut query = SearchQuery::new("content");
        query.auto_query("index -document");

        let tree = query.build_query();
        let leaf = tree.leaves()[0];
        assert_eq!(leaf.field, "content");
        assert_eq!(leaf.filter_type, FilterType::Content);
        assert_eq!(leaf.value, QueryValue::Auto("index -document".to_string()));
    }

    #[test]
    fn test_limits_and_clear() {
        let mut query = SearchQuery::new("content");
        query.filter("name", "foo").set_limits(Some(5), Some(10));
        assert_eq!(query.options().start_offset, 5);
        assert_eq!(query.options().end_offset, Some(10));

        query.clear();
        assert!(query.build_query().is_empty());
        assert_eq!(query.options().start_offset, 0);
        assert_eq!(query.options().end_offset, None);
    }
}
