use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::compiler::Filter;
use crate::query::SearchNode;
use crate::schema::{ModelSchema, SearchIndex};

use super::result::{ResultEnvelope, SearchResults};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("'{field}' is not an indexed field of {model}")]
    NotIndexedField { field: String, model: String },
    #[error("Model {0} has no search index")]
    ModelNotIndexed(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// What to search with: a query tree, or a filter already compiled for the target model.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchInput {
    Tree(SearchNode),
    Filter(Filter),
}

impl From<SearchNode> for SearchInput {
    fn from(node: SearchNode) -> Self {
        SearchInput::Tree(node)
    }
}

impl From<Filter> for SearchInput {
    fn from(filter: Filter) -> Self {
        SearchInput::Filter(filter)
    }
}

/// Per-call search modifiers
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Target models; empty means every indexed model
    pub models: Vec<ModelSchema>,
    /// First result to return
    pub start_offset: u64,
    /// One past the last result to return; `None` returns the rest
    pub end_offset: Option<u64>,
}

impl SearchOptions {
    /// Search only `model`
    pub fn for_model(model: ModelSchema) -> Self {
        Self {
            models: vec![model],
            ..Default::default()
        }
    }

    /// Page size implied by the offsets
    pub fn limit(&self) -> Option<u64> {
        self.end_offset.map(|end| end.saturating_sub(self.start_offset))
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Index records. Indexing is the database's job, so backends may no-op.
    async fn update(&self, index: &SearchIndex, records: &[Value]) -> Result<(), BackendError>;

    /// Remove a record from the index.
    async fn remove(&self, model: &ModelSchema, pk: &Value) -> Result<(), BackendError>;

    /// Remove every record of `models` (all models if empty) from the index.
    async fn clear(&self, models: &[ModelSchema]) -> Result<(), BackendError>;

    /// Run a search, wrapping each hit into `R`.
    async fn search<R: ResultEnvelope>(
        &self,
        input: SearchInput,
        options: &SearchOptions,
    ) -> Result<SearchResults<R>, BackendError>;

    /// Records similar to `pk` of `model`.
    async fn more_like_this<R: ResultEnvelope>(
        &self,
        model: &ModelSchema,
        pk: &Value,
        options: &SearchOptions,
    ) -> Result<SearchResults<R>, BackendError>;

    /// Convert a value before it is handed to the database.
    fn prep_value(&self, value: Value) -> Value {
        value
    }
}
