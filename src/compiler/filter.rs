// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Native filter expression.
//!
//! The combinators fold constants so a compiled tree never carries
//! `TRUE AND ...` or `NOT FALSE` noise into SQL.

use serde::{Deserialize, Serialize};

/// Which tsquery parser a search term goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// `plainto_tsquery`: all words, no operators
    Plain,
    /// `phraseto_tsquery`: words in order
    Phrase,
    /// `websearch_to_tsquery`: quotes, `or`, leading `-`
    #[default]
    Websearch,
    /// `to_tsquery`: raw tsquery syntax
    Raw,
}

impl SearchType {
    /// PostgreSQL function that parses the search text
    pub fn tsquery_function(self) -> &'static str {
        match self {
            SearchType::Plain => "plainto_tsquery",
            SearchType::Phrase => "phraseto_tsquery",
            SearchType::Websearch => "websearch_to_tsquery",
            SearchType::Raw => "to_tsquery",
        }
    }
}

/// Filter over the rows of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// No restriction
    Everything,
    /// Matches no row
    Nothing,
    /// `column` text-search-matches `query`
    Search {
        column: String,
        query: String,
        search_type: SearchType,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// Text-search predicate on one column
    pub fn search(column: impl Into<String>, query: impl Into<String>, search_type: SearchType) -> Self {
        Filter::Search {
            column: column.into(),
            query: query.into(),
            search_type,
        }
    }

    /// Conjunction of two filters
    pub fn and(self, other: Filter) -> Self {
        Filter::all([self, other])
    }

    /// Disjunction of two filters
    pub fn or(self, other: Filter) -> Self {
        Filter::any([self, other])
    }

    /// Logical complement
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            Filter::Everything => Filter::Nothing,
            Filter::Nothing => Filter::Everything,
            Filter::Not(inner) => *inner,
            other => Filter::Not(Box::new(other)),
        }
    }

    /// Conjunction of any number of filters; empty input is `Everything`.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                Filter::Everything => {}
                Filter::Nothing => return Filter::Nothing,
                Filter::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Filter::Everything,
            1 => parts.remove(0),
            _ => Filter::And(parts),
        }
    }

    /// Disjunction of any number of filters; empty input is `Nothing`.
    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                Filter::Nothing => {}
                Filter::Everything => return Filter::Everything,
                Filter::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Filter::Nothing,
            1 => parts.remove(0),
            _ => Filter::Or(parts),
        }
    }

    /// True if the filter places no restriction on rows
    pub fn is_everything(&self) -> bool {
        matches!(self, Filter::Everything)
    }

    /// True if the filter can never match
    pub fn is_nothing(&self) -> bool {
        matches!(self, Filter::Nothing)
    }
}
