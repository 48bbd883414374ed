// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Postgres FTS Backend
//!
//! A search backend that answers full-text queries straight from the
//! application's own PostgreSQL tables, using `to_tsvector` and the
//! `*_to_tsquery` family. There is no external search index to keep in sync.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Query Layer                            │
//! │  • SearchQuery: filter / exclude / auto_query               │
//! │  • SearchNode tree (AND/OR, negation, leaves)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     (compiled per model)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Compiler                                │
//! │  • Field resolution through the SearchIndex                 │
//! │  • Constant folding (match-all / match-nothing)             │
//! │  • Filter → parameterised WHERE clause                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PostgresFtsBackend                         │
//! │  • COUNT for hits, ordered + sliced page for results        │
//! │  • Rows wrapped into a caller-chosen ResultEnvelope         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use postgres_fts_backend::{BackendConfig, SearchEngine, SearchResults};
//! use postgres_fts_backend::schema::{ModelSchema, SearchIndex, UnifiedIndex};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = ModelSchema::new("core", "mockmodel", "core_mockmodel")
//!         .char_field("author")
//!         .char_field("foo");
//!     let unified = UnifiedIndex::build([
//!         SearchIndex::new(model).document("text", "foo").field("name", "author"),
//!     ]);
//!
//!     let config = BackendConfig {
//!         database_url: Some("postgres://postgres@localhost/haystack_tests".into()),
//!         ..Default::default()
//!     };
//!     let engine = SearchEngine::connect(config, unified).await.expect("Failed to connect");
//!
//!     let mut query = engine.get_query();
//!     query.auto_query("indexed").exclude("name", "daniel1");
//!
//!     let results: SearchResults = engine.search(&query).await.unwrap();
//!     for result in &results.results {
//!         println!("{} {}", result.model_key(), result.pk);
//!     }
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`BackendConfig`] for all configuration options.
//!
//! ## Modules
//!
//! - [`query`]: Backend-neutral query tree and builder
//! - [`schema`]: Model and index declarations
//! - [`compiler`]: Tree → native filter → SQL
//! - [`backend`]: The [`SearchBackend`] contract and its PostgreSQL implementation
//! - [`engine`]: [`SearchEngine`] tying a backend to its index declarations
//! - [`resilience`]: Retry logic for the initial connection

pub mod config;
pub mod query;
pub mod schema;
pub mod compiler;
pub mod backend;
pub mod engine;
pub mod resilience;
pub mod metrics;

pub use config::BackendConfig;
pub use engine::SearchEngine;
pub use backend::{
    BackendError, PostgresFtsBackend, RawHit, ResultEnvelope, SearchBackend, SearchInput,
    SearchOptions, SearchResult, SearchResults,
};
pub use query::{Connector, FilterType, QueryValue, SearchNode, SearchQuery};
pub use schema::{FieldKind, ModelSchema, SearchIndex, UnifiedIndex};
pub use compiler::{build_query, Filter, SearchType};
pub use resilience::retry::RetryConfig;
pub use metrics::LatencyTimer;
