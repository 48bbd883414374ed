// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search engine: a backend bound to its index declarations and settings.
//!
//! ```rust,no_run
//! use postgres_fts_backend::{BackendConfig, SearchEngine, SearchResults};
//! use postgres_fts_backend::schema::{ModelSchema, SearchIndex, UnifiedIndex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = ModelSchema::new("core", "mockmodel", "core_mockmodel")
//!     .char_field("author")
//!     .char_field("foo");
//! let unified = UnifiedIndex::build([
//!     SearchIndex::new(model).document("text", "foo").field("name", "author"),
//! ]);
//!
//! let config = BackendConfig {
//!     database_url: Some("postgres://postgres@localhost/haystack_tests".into()),
//!     ..Default::default()
//! };
//! let engine = SearchEngine::connect(config, unified).await?;
//!
//! let mut query = engine.get_query();
//! query.auto_query("index -document");
//! let results: SearchResults = engine.search(&query).await?;
//! println!("{} hits", results.hits);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::backend::{
    BackendError, PostgresFtsBackend, ResultEnvelope, SearchBackend, SearchOptions, SearchResults,
};
use crate::config::BackendConfig;
use crate::query::SearchQuery;
use crate::schema::{ModelSchema, UnifiedIndex};

pub struct SearchEngine<B = PostgresFtsBackend> {
    backend: B,
    unified_index: Arc<UnifiedIndex>,
    config: BackendConfig,
}

impl SearchEngine<PostgresFtsBackend> {
    /// Connect to PostgreSQL and bind the index declarations.
    pub async fn connect(config: BackendConfig, unified_index: UnifiedIndex) -> Result<Self, BackendError> {
        let unified_index = Arc::new(unified_index);
        let backend = PostgresFtsBackend::connect(config.clone(), Arc::clone(&unified_index)).await?;
        Ok(Self::new(backend, unified_index, config))
    }
}

impl<B: SearchBackend> SearchEngine<B> {
    pub fn new(backend: B, unified_index: Arc<UnifiedIndex>, config: BackendConfig) -> Self {
        Self {
            backend,
            unified_index,
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn unified_index(&self) -> &UnifiedIndex {
        &self.unified_index
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// A fresh, empty query
    pub fn get_query(&self) -> SearchQuery {
        SearchQuery::new(self.config.document_field.clone())
    }

    /// Run `query`, wrapping hits into `R`.
    pub async fn search<R: ResultEnvelope>(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResults<R>, BackendError> {
        self.backend
            .search(query.build_query().into(), query.options())
            .await
    }

    /// Records similar to `pk` of `model`.
    pub async fn more_like_this<R: ResultEnvelope>(
        &self,
        model: &ModelSchema,
        pk: &Value,
    ) -> Result<SearchResults<R>, BackendError> {
        self.backend
            .more_like_this(model, pk, &SearchOptions::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{RawHit, SearchInput, SearchResult};
    use crate::query::SearchNode;
    use crate::schema::SearchIndex;
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::Mutex;

    /// Records each search call and answers with a single hit.
    #[derive(Default)]
    struct EchoBackend {
        calls: Mutex<Vec<(SearchInput, SearchOptions)>>,
    }

    #[async_trait]
    impl SearchBackend for EchoBackend {
        async fn update(&self, _: &SearchIndex, _: &[Value]) -> Result<(), BackendError> {
            Ok(())
        }

        async fn remove(&self, _: &ModelSchema, _: &Value) -> Result<(), BackendError> {
            Ok(())
        }

        async fn clear(&self, _: &[ModelSchema]) -> Result<(), BackendError> {
            Ok(())
        }

        async fn search<R: ResultEnvelope>(
            &self,
            input: SearchInput,
            options: &SearchOptions,
        ) -> Result<SearchResults<R>, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((input, options.clone()));
            let hit = RawHit {
                app_label: "core".into(),
                model_name: "mockmodel".into(),
                pk: json!(1),
                score: 0.0,
                fields: Map::new(),
            };
            Ok(SearchResults {
                hits: 1,
                results: vec![R::from_hit(hit)],
            })
        }

        async fn more_like_this<R: ResultEnvelope>(
            &self,
            _: &ModelSchema,
            _: &Value,
            _: &SearchOptions,
        ) -> Result<SearchResults<R>, BackendError> {
            Ok(SearchResults::empty())
        }
    }

    fn engine() -> SearchEngine<EchoBackend> {
        SearchEngine::new(
            EchoBackend::default(),
            Arc::new(UnifiedIndex::default()),
            BackendConfig {
                document_field: "text".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_get_query_uses_configured_document_field() {
        assert_eq!(engine().get_query().document_field(), "text");
    }

    #[tokio::test]
    async fn test_search_passes_tree_and_options() {
        let engine = engine();
        let mut query = engine.get_query();
        query.auto_query("index").set_limits(Some(1), Some(3));

        let results: SearchResults<SearchResult> = engine.search(&query).await.unwrap();
        assert_eq!(results.hits, 1);

        let calls = engine.backend().calls.lock().unwrap();
        let (input, options) = &calls[0];
        assert_eq!(input, &SearchInput::Tree(query.build_query()));
        assert_eq!(options.start_offset, 1);
        assert_eq!(options.limit(), Some(2));
    }

    #[tokio::test]
    async fn test_result_envelope_swaps_type_not_hits() {
        struct PkOnly(Value);
        impl ResultEnvelope for PkOnly {
            fn from_hit(hit: RawHit) -> Self {
                PkOnly(hit.pk)
            }
        }

        let engine = engine();
        let mut query = engine.get_query();
        query.add_filter(SearchNode::leaf("name", "daniel1"), false);

        let default: SearchResults = engine.search(&query).await.unwrap();
        let custom: SearchResults<PkOnly> = engine.search(&query).await.unwrap();

        assert_eq!(default.hits, custom.hits);
        assert_eq!(default.results[0].pk, custom.results[0].0);
    }

    #[tokio::test]
    async fn test_more_like_this_empty() {
        let results: SearchResults = engine()
            .more_like_this(&ModelSchema::new("core", "mockmodel", "core_mockmodel"), &json!(1))
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
