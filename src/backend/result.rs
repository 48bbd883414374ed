// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Result envelopes.
//!
//! Every matched row is handed to [`ResultEnvelope::from_hit`] as a
//! [`RawHit`]. The default envelope is [`SearchResult`]; callers pick another
//! by naming it as the type parameter of `search::<R>()`.

use serde::Serialize;
use serde_json::{Map, Value};

/// A matched row before it is wrapped
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub app_label: String,
    pub model_name: String,
    pub pk: Value,
    /// Relevance; this backend does not rank, so always 0
    pub score: f32,
    /// Column values copied from the row
    pub fields: Map<String, Value>,
}

/// A type search results can be wrapped into
pub trait ResultEnvelope: Sized + Send {
    fn from_hit(hit: RawHit) -> Self;
}

/// Default result envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub app_label: String,
    pub model_name: String,
    pub pk: Value,
    pub score: f32,
    pub fields: Map<String, Value>,
}

impl SearchResult {
    /// `app_label.model_name`
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// A copied column value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl ResultEnvelope for SearchResult {
    fn from_hit(hit: RawHit) -> Self {
        Self {
            app_label: hit.app_label,
            model_name: hit.model_name,
            pk: hit.pk,
            score: hit.score,
            fields: hit.fields,
        }
    }
}

impl ResultEnvelope for RawHit {
    fn from_hit(hit: RawHit) -> Self {
        hit
    }
}

/// Hit count plus the (possibly sliced) page of results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<R = SearchResult> {
    /// Total number of matching records
    pub hits: u64,
    pub results: Vec<R>,
}

impl<R> SearchResults<R> {
    /// No hits
    pub fn empty() -> Self {
        Self {
            hits: 0,
            results: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits == 0
    }
}

impl<R> Default for SearchResults<R> {
    fn default() -> Self {
        Self::empty()
    }
}
