// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query compilation
//!
//! ```text
//! SearchNode ──build_query──→ Filter ──SqlTranslator──→ WHERE clause + params
//! ```
//!
//! The [`Filter`] in the middle is the "native filter": already resolved to
//! table columns, still independent of placeholder numbering. Callers can
//! also build one by hand and pass it straight to the backend.

mod build;
mod filter;
mod sql_translator;

pub use build::{build_query, QueryCompiler};
pub use filter::{Filter, SearchType};
pub use sql_translator::{quote_ident, quote_literal, SqlQuery, SqlTranslator};
