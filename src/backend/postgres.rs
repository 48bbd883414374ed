// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! PostgreSQL full-text search backend.
//!
//! Searches run directly against the model's table; there is no separate
//! index to maintain, so `update`, `remove` and `clear` only warn.
//!
//! For a model `core.mockmodel` stored in `core_mockmodel`, a search for
//! `content:"index"` becomes:
//!
//! ```sql
//! SELECT COUNT(*) AS hits FROM "core_mockmodel"
//!   WHERE (to_tsvector(COALESCE("author"::text, '')) @@ websearch_to_tsquery($1)
//!       OR to_tsvector(COALESCE("foo"::text, '')) @@ websearch_to_tsquery($2));
//!
//! SELECT to_jsonb(r) AS record FROM "core_mockmodel" AS r
//!   WHERE (...same clause...)
//!   ORDER BY r."id" OFFSET $3;
//! ```
//!
//! Each row comes back as a JSON object, so every column is copied into the
//! result envelope without per-type decoding.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info, warn};

use super::result::{RawHit, ResultEnvelope, SearchResults};
use super::traits::{BackendError, SearchBackend, SearchInput, SearchOptions};
use crate::compiler::{build_query, quote_ident, Filter, SqlQuery, SqlTranslator};
use crate::config::BackendConfig;
use crate::metrics::{self, LatencyTimer};
use crate::resilience::retry::{retry, RetryConfig};
use crate::schema::{ModelSchema, SearchIndex, UnifiedIndex};

pub struct PostgresFtsBackend {
    pool: PgPool,
    unified_index: Arc<UnifiedIndex>,
    config: BackendConfig,
}

impl PostgresFtsBackend {
    /// Connect with startup-mode retry (fails fast if config is wrong).
    pub async fn connect(
        config: BackendConfig,
        unified_index: Arc<UnifiedIndex>,
    ) -> Result<Self, BackendError> {
        Self::connect_with_retry(config, unified_index, &RetryConfig::startup()).await
    }

    /// Connect with an explicit retry policy.
    pub async fn connect_with_retry(
        config: BackendConfig,
        unified_index: Arc<UnifiedIndex>,
        retry_config: &RetryConfig,
    ) -> Result<Self, BackendError> {
        let url = config
            .database_url
            .clone()
            .ok_or_else(|| BackendError::Config("database_url is not set".to_string()))?;

        let pool = retry("postgres_connect", retry_config, || async {
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                .connect(&url)
                .await
        })
        .await?;

        info!(
            max_connections = config.max_connections,
            text_search_config = ?config.text_search_config,
            "Connected to PostgreSQL"
        );
        Ok(Self::new(pool, unified_index, config))
    }

    /// Wrap an existing pool.
    pub fn new(pool: PgPool, unified_index: Arc<UnifiedIndex>, config: BackendConfig) -> Self {
        Self {
            pool,
            unified_index,
            config,
        }
    }

    /// The connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn unified_index(&self) -> &UnifiedIndex {
        &self.unified_index
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Indexes the search targets: the requested models, or every indexed model.
    fn target_indexes(&self, options: &SearchOptions) -> Result<Vec<&SearchIndex>, BackendError> {
        if options.models.is_empty() {
            return Ok(self
                .unified_index
                .get_indexed_models()
                .into_iter()
                .filter_map(|model| self.unified_index.get_index(model))
                .collect());
        }

        options
            .models
            .iter()
            .map(|model| {
                self.unified_index
                    .get_index(model)
                    .ok_or_else(|| BackendError::ModelNotIndexed(model.model_key()))
            })
            .collect()
    }

    /// Compile `input` for `index` into a filter.
    pub fn build_filter(&self, index: &SearchIndex, input: SearchInput) -> Result<Filter, BackendError> {
        match input {
            SearchInput::Tree(node) => build_query(
                index,
                &node,
                &self.config.document_field,
                self.config.search_type,
            ),
            SearchInput::Filter(filter) => Ok(filter),
        }
    }

    async fn execute<R: ResultEnvelope>(
        &self,
        model: &ModelSchema,
        filter: &Filter,
        options: &SearchOptions,
    ) -> Result<SearchResults<R>, BackendError> {
        let model_key = model.model_key();
        let timer = LatencyTimer::new(&model_key);

        // Nothing can match; skip the round trip.
        if filter.is_nothing() {
            metrics::record_search(&model_key, "empty");
            metrics::record_search_hits(0);
            return Ok(SearchResults::empty());
        }

        let ts_config = self.config.text_search_config.as_deref();
        let sql_query = SqlTranslator::translate(filter, ts_config);

        let outcome = self.fetch(model, &sql_query, options).await;
        let status = match &outcome {
            Ok(results) if results.hits == 0 => "empty",
            Ok(_) => "success",
            Err(_) => "error",
        };
        metrics::record_search(&model_key, status);

        if self.config.log_queries {
            debug!(
                model = %model_key,
                clause = %SqlTranslator::translate_inline(filter, ts_config),
                hits = outcome.as_ref().map(|r| r.hits).ok(),
                elapsed_ms = timer.elapsed().as_millis() as u64,
                "Search query"
            );
        }

        let results = outcome?;
        metrics::record_search_hits(results.hits);
        Ok(results)
    }

    async fn fetch<R: ResultEnvelope>(
        &self,
        model: &ModelSchema,
        sql_query: &SqlQuery,
        options: &SearchOptions,
    ) -> Result<SearchResults<R>, BackendError> {
        let table = quote_ident(&model.table);

        let count_sql = format!("SELECT COUNT(*) AS hits FROM {} WHERE {}", table, sql_query.clause);
        let mut count = sqlx::query(&count_sql);
        for param in &sql_query.params {
            count = count.bind(param);
        }
        let hits: i64 = count.fetch_one(&self.pool).await?.try_get("hits")?;
        let hits = hits.max(0) as u64;

        if hits == 0 || options.start_offset >= hits || options.limit() == Some(0) {
            return Ok(SearchResults {
                hits,
                results: Vec::new(),
            });
        }

        let (page, offset, limit) = Self::page_clause(options, sql_query.params.len() + 1);
        let rows_sql = format!(
            "SELECT to_jsonb(r) AS record FROM {} AS r WHERE {} ORDER BY r.{}{}",
            table,
            sql_query.clause,
            quote_ident(&model.primary_key),
            page,
        );

        let mut rows = sqlx::query(&rows_sql);
        for param in &sql_query.params {
            rows = rows.bind(param);
        }
        rows = rows.bind(offset);
        if let Some(limit) = limit {
            rows = rows.bind(limit);
        }

        let mut results = Vec::new();
        for row in rows.fetch_all(&self.pool).await? {
            let record: Value = row.try_get("record")?;
            results.push(R::from_hit(Self::to_hit(model, record)));
        }

        Ok(SearchResults { hits, results })
    }

    /// `OFFSET`/`LIMIT` suffix with placeholders starting at `$first`, and the
    /// values to bind. A limit too large for BIGINT is the same as no limit.
    fn page_clause(options: &SearchOptions, first: usize) -> (String, i64, Option<i64>) {
        let offset = i64::try_from(options.start_offset).unwrap_or(i64::MAX);
        match options.limit().and_then(|limit| i64::try_from(limit).ok()) {
            Some(limit) => (format!(" OFFSET ${} LIMIT ${}", first, first + 1), offset, Some(limit)),
            None => (format!(" OFFSET ${}", first), offset, None),
        }
    }

    fn to_hit(model: &ModelSchema, record: Value) -> RawHit {
        let fields = match record {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        RawHit {
            app_label: model.app_label.clone(),
            model_name: model.model_name.clone(),
            pk: fields.get(&model.primary_key).cloned().unwrap_or(Value::Null),
            score: 0.0,
            fields,
        }
    }
}

#[async_trait]
impl SearchBackend for PostgresFtsBackend {
    async fn update(&self, index: &SearchIndex, records: &[Value]) -> Result<(), BackendError> {
        metrics::record_unsupported("update");
        warn!(model = %index.model.model_key(), records = records.len(), "update is not implemented in this backend");
        Ok(())
    }

    async fn remove(&self, model: &ModelSchema, pk: &Value) -> Result<(), BackendError> {
        metrics::record_unsupported("remove");
        warn!(model = %model.model_key(), %pk, "remove is not implemented in this backend");
        Ok(())
    }

    async fn clear(&self, models: &[ModelSchema]) -> Result<(), BackendError> {
        metrics::record_unsupported("clear");
        warn!(models = models.len(), "clear is not implemented in this backend");
        Ok(())
    }

    async fn search<R: ResultEnvelope>(
        &self,
        input: SearchInput,
        options: &SearchOptions,
    ) -> Result<SearchResults<R>, BackendError> {
        let indexes = self.target_indexes(options)?;
        let index = match indexes.as_slice() {
            [] => return Ok(SearchResults::empty()),
            [index] => *index,
            _ => {
                return Err(BackendError::NotImplemented(
                    "searching across multiple models".to_string(),
                ))
            }
        };

        let filter = self.build_filter(index, input)?;
        self.execute(&index.model, &filter, options).await
    }

    async fn more_like_this<R: ResultEnvelope>(
        &self,
        model: &ModelSchema,
        pk: &Value,
        _options: &SearchOptions,
    ) -> Result<SearchResults<R>, BackendError> {
        metrics::record_unsupported("more_like_this");
        debug!(model = %model.model_key(), %pk, "more_like_this is not supported; returning no results");
        Ok(SearchResults::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SearchResult;
    use crate::query::{SearchNode, SearchQuery};
    use serde_json::json;

    fn mock_model() -> ModelSchema {
        ModelSchema::new("core", "mockmodel", "core_mockmodel")
            .char_field("author")
            .char_field("foo")
            .datetime_field("pub_date")
            .foreign_key("tag_id")
    }

    fn mock_index() -> SearchIndex {
        SearchIndex::new(mock_model())
            .document("text", "foo")
            .field("name", "author")
            .field("pub_date", "pub_date")
    }

    /// Backend over a pool that never connects; only paths that don't reach
    /// the database can be exercised here.
    fn offline_backend(indexes: Vec<SearchIndex>) -> PostgresFtsBackend {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@127.0.0.1:1/unused")
            .unwrap();
        PostgresFtsBackend::new(
            pool,
            Arc::new(UnifiedIndex::build(indexes)),
            BackendConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_update_remove_clear_are_noops() {
        let backend = offline_backend(vec![mock_index()]);
        backend.update(&mock_index(), &[json!({"id": 1})]).await.unwrap();
        backend.remove(&mock_model(), &json!(1)).await.unwrap();
        backend.clear(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_query_string_has_no_hits() {
        let backend = offline_backend(vec![mock_index()]);
        let mut query = SearchQuery::new("content");
        query.auto_query("");

        let results: SearchResults<SearchResult> = backend
            .search(query.build_query().into(), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results, SearchResults::empty());
    }

    #[tokio::test]
    async fn test_prebuilt_nothing_filter() {
        let backend = offline_backend(vec![mock_index()]);
        let results: SearchResults = backend
            .search(Filter::Nothing.into(), &SearchOptions::for_model(mock_model()))
            .await
            .unwrap();
        assert_eq!(results.hits, 0);
    }

    #[tokio::test]
    async fn test_non_text_field_has_no_hits() {
        let backend = offline_backend(vec![mock_index()]);
        let results: SearchResults = backend
            .search(
                SearchNode::leaf("pub_date", "2009-06-18").into(),
                &SearchOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(results.hits, 0);
    }

    #[tokio::test]
    async fn test_multi_model_search_not_implemented() {
        let other = ModelSchema::new("core", "anothermockmodel", "core_anothermockmodel")
            .char_field("author");
        let backend = offline_backend(vec![
            mock_index(),
            SearchIndex::new(other).document("text", "author"),
        ]);

        let err = backend
            .search::<SearchResult>(SearchNode::leaf("content", "index").into(), &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotImplemented(_)));
    }

    #[tokio::test]
    async fn test_unindexed_field_errors_before_querying() {
        let backend = offline_backend(vec![mock_index()]);
        let err = backend
            .search::<SearchResult>(SearchNode::leaf("tag", "x").into(), &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotIndexedField { .. }));
    }

    #[tokio::test]
    async fn test_unindexed_model_requested() {
        let backend = offline_backend(vec![mock_index()]);
        let other = ModelSchema::new("core", "mocktag", "core_mocktag").char_field("name");
        let err = backend
            .search::<SearchResult>(SearchNode::default().into(), &SearchOptions::for_model(other))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ModelNotIndexed(key) if key == "core.mocktag"));
    }

    #[tokio::test]
    async fn test_no_indexes_no_results() {
        let backend = offline_backend(Vec::new());
        let results: SearchResults = backend
            .search(SearchNode::default().into(), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.hits, 0);
    }

    #[tokio::test]
    async fn test_more_like_this_is_empty() {
        let backend = offline_backend(vec![mock_index()]);
        let results: SearchResults = backend
            .more_like_this(&mock_model(), &json!(1), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.hits, 0);
        assert!(results.results.is_empty());
    }

    #[tokio::test]
    async fn test_connect_requires_url() {
        let err = PostgresFtsBackend::connect(BackendConfig::default(), Arc::new(UnifiedIndex::default()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BackendError::Config(_)));
    }

    #[test]
    fn test_page_clause_bounded() {
        let options = SearchOptions {
            start_offset: 2,
            end_offset: Some(5),
            ..Default::default()
        };
        assert_eq!(
            PostgresFtsBackend::page_clause(&options, 3),
            (" OFFSET $3 LIMIT $4".to_string(), 2, Some(3))
        );
    }

    #[test]
    fn test_page_clause_unbounded() {
        let options = SearchOptions::default();
        assert_eq!(
            PostgresFtsBackend::page_clause(&options, 1),
            (" OFFSET $1".to_string(), 0, None)
        );
    }

    #[test]
    fn test_page_clause_huge_end_offset_drops_limit() {
        let mut query = SearchQuery::new("content");
        query.set_limits(None, Some(u64::MAX));
        let (clause, offset, limit) = PostgresFtsBackend::page_clause(query.options(), 1);
        assert_eq!(clause, " OFFSET $1");
        assert_eq!(offset, 0);
        assert_eq!(limit, None);
    }

    #[test]
    fn test_to_hit_copies_row() {
        let hit = PostgresFtsBackend::to_hit(
            &mock_model(),
            json!({"id": 8, "author": "daniel3", "foo": "should be a string"}),
        );
        assert_eq!(hit.pk, json!(8));
        assert_eq!(hit.score, 0.0);
        assert_eq!(hit.model_name, "mockmodel");
        assert_eq!(hit.fields.get("foo"), Some(&json!("should be a string")));
    }

    #[test]
    fn test_prep_value_is_identity() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let _guard = rt.enter();
        let backend = offline_backend(vec![mock_index()]);
        assert_eq!(backend.prep_value(json!("x")), json!("x"));
    }
}
