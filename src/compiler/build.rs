// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query tree → native filter.
//!
//! Recursive descent over a [`SearchNode`]:
//!
//! | leaf value | positive       | negated        |
//! |------------|----------------|----------------|
//! | `""`       | match nothing  | match everything |
//! | `"*"`      | match everything | match nothing  |
//! | text       | text search    | NOT text search |
//!
//! Leaves on the document field search every text column of the record
//! type (OR'd together); any other leaf searches the column its index field
//! reads from.

use super::filter::{Filter, SearchType};
use crate::backend::BackendError;
use crate::query::{Connector, FilterType, QueryValue, SearchChild, SearchLeaf, SearchNode};
use crate::schema::SearchIndex;

/// Compiles query trees against one search index
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    index: &'a SearchIndex,
    document_field: &'a str,
    search_type: SearchType,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(index: &'a SearchIndex, document_field: &'a str, search_type: SearchType) -> Self {
        Self {
            index,
            document_field,
            search_type,
        }
    }

    /// Compile a whole tree
    pub fn compile(&self, node: &SearchNode) -> Result<Filter, BackendError> {
        // An empty node places no restriction, whatever its connector.
        let combined = if node.is_empty() {
            Filter::Everything
        } else {
            let mut parts = Vec::with_capacity(node.len());
            for child in &node.children {
                parts.push(match child {
                    SearchChild::Node(inner) => self.compile(inner)?,
                    SearchChild::Leaf(leaf) => self.compile_leaf(leaf)?,
                });
            }
            match node.connector {
                Connector::And => Filter::all(parts),
                Connector::Or => Filter::any(parts),
            }
        };

        Ok(if node.negated { combined.not() } else { combined })
    }

    fn compile_leaf(&self, leaf: &SearchLeaf) -> Result<Filter, BackendError> {
        let model = &self.index.model;

        // Resolve the field before looking at the value so an unknown field is
        // an error whatever it is compared with.
        let column = if leaf.field == self.document_field {
            None
        } else {
            let not_indexed = || BackendError::NotIndexedField {
                field: leaf.field.clone(),
                model: model.model_key(),
            };
            let index_field = self.index.get_field(&leaf.field).ok_or_else(not_indexed)?;
            Some(model.field(&index_field.model_attr).ok_or_else(not_indexed)?)
        };

        if leaf.value.is_empty() {
            return Ok(Filter::Nothing);
        }
        if leaf.value.is_wildcard() {
            return Ok(Filter::Everything);
        }

        let query = leaf.value.as_str();
        let search_type = self.search_type_for(leaf);

        match column {
            None => Ok(Filter::any(
                model
                    .text_columns()
                    .into_iter()
                    .map(|column| Filter::search(column, query, search_type)),
            )),
            Some(field) if !field.kind.is_textual() => Ok(Filter::Nothing),
            Some(field) => Ok(Filter::search(&field.column, query, search_type)),
        }
    }

    fn search_type_for(&self, leaf: &SearchLeaf) -> SearchType {
        match (&leaf.value, leaf.filter_type) {
            (QueryValue::Raw(_), _) => SearchType::Raw,
            (QueryValue::Exact(_), _) | (_, FilterType::Exact) => SearchType::Phrase,
            _ => self.search_type,
        }
    }
}

/// Compile `node` against `index`.
pub fn build_query(
    index: &SearchIndex,
    node: &SearchNode,
    document_field: &str,
    search_type: SearchType,
) -> Result<Filter, BackendError> {
    QueryCompiler::new(index, document_field, search_type).compile(node)
}
