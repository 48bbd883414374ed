// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Abstract query layer
//!
//! Backend-neutral search expressions. Nothing here knows about SQL; the
//! [`compiler`](crate::compiler) turns a [`SearchNode`] into a native filter.
//!
//! # Architecture
//!
//! ```text
//! SearchQuery (filter / exclude / auto_query)
//!     ↓ build_query()
//! SearchNode tree (AND/OR, negated, leaves)
//!     ↓ compiler::build_query(index, ..)
//! Filter → SqlTranslator → WHERE clause
//! ```

mod node;
mod search_query;

pub use node::{
    split_expression, Connector, FilterType, QueryValue, SearchChild, SearchLeaf, SearchNode,
    FILTER_SEPARATOR, WILDCARD,
};
pub use search_query::SearchQuery;
