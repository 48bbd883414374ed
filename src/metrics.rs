// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search backend.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `postgres_fts_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `model`: `app_label.model_name` of the searched record type
//! - `status`: success, error, empty
//! - `operation`: update, remove, clear, more_like_this

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a search call
pub fn record_search(model: &str, status: &str) {
    counter!(
        "postgres_fts_search_total",
        "model" => model.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record search latency
pub fn record_search_latency(model: &str, duration: Duration) {
    histogram!(
        "postgres_fts_search_seconds",
        "model" => model.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record number of hits
pub fn record_search_hits(hits: u64) {
    histogram!("postgres_fts_search_hits").record(hits as f64);
}

/// Record a call to an operation this backend does not implement
pub fn record_unsupported(operation: &str) {
    counter!(
        "postgres_fts_unsupported_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Timer guard that records latency on drop
pub struct LatencyTimer {
    model: String,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            start: Instant::now(),
        }
    }

    /// Elapsed so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_search_latency(&self.model, self.start.elapsed());
    }
}
