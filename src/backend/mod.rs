// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search backends
//!
//! [`SearchBackend`] is the contract the engine drives; [`PostgresFtsBackend`]
//! implements it on top of PostgreSQL's text-search operators.

mod postgres;
mod result;
mod traits;

pub use postgres::PostgresFtsBackend;
pub use result::{RawHit, ResultEnvelope, SearchResult, SearchResults};
pub use traits::{BackendError, SearchBackend, SearchInput, SearchOptions};
