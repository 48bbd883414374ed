// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL Translator
//!
//! Translates a [`Filter`] to a PostgreSQL WHERE clause using the native
//! text-search match operator.
//!
//! # SQL Syntax Generated
//!
//! ```sql
//! to_tsvector(COALESCE("foo"::text, '')) @@ websearch_to_tsquery($1)          -- default config
//! to_tsvector('english'::regconfig, COALESCE("foo"::text, ''))
//!     @@ phraseto_tsquery('english'::regconfig, $2)                            -- explicit config
//! (a OR b)  /  (a AND b)  /  NOT (a)
//! TRUE                                                                          -- match everything
//! FALSE                                                                         -- match nothing
//! ```

use super::filter::{Filter, SearchType};

/// SQL query translator for PostgreSQL full-text search
pub struct SqlTranslator;

/// SQL clause with `$n` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    /// The WHERE clause (without "WHERE" keyword)
    pub clause: String,
    /// Search texts bound to `$1..$n`, in order
    pub params: Vec<String>,
}

impl SqlTranslator {
    /// Translate a filter into a parameterized WHERE clause.
    ///
    /// `ts_config` names the text search configuration (`english`,
    /// `simple`, ...); `None` uses the server's `default_text_search_config`.
    pub fn translate(filter: &Filter, ts_config: Option<&str>) -> SqlQuery {
        Self::translate_from(filter, ts_config, 0)
    }

    /// Like [`translate`](Self::translate), numbering placeholders after `offset`
    /// already-bound parameters.
    pub fn translate_from(filter: &Filter, ts_config: Option<&str>, offset: usize) -> SqlQuery {
        let mut emitter = Emitter {
            ts_config,
            values: Values::Bound { offset, params: Vec::new() },
        };
        let clause = emitter.filter(filter);
        let params = match emitter.values {
            Values::Bound { params, .. } => params,
            Values::Inline => Vec::new(),
        };
        SqlQuery { clause, params }
    }

    /// Translate with inline values
    ///
    /// Warning: Only use for debugging, not for actual queries (SQL injection risk)
    pub fn translate_inline(filter: &Filter, ts_config: Option<&str>) -> String {
        Emitter {
            ts_config,
            values: Values::Inline,
        }
        .filter(filter)
    }
}

/// How search texts end up in the clause
enum Values {
    /// `$n` placeholders, texts collected in order
    Bound { offset: usize, params: Vec<String> },
    /// Quoted literals, for logs
    Inline,
}

struct Emitter<'a> {
    ts_config: Option<&'a str>,
    values: Values,
}

impl Emitter<'_> {
    fn filter(&mut self, filter: &Filter) -> String {
        match filter {
            Filter::Everything => TRUE.to_string(),
            Filter::Nothing => FALSE.to_string(),
            Filter::Search {
                column,
                query,
                search_type,
            } => {
                let value = self.value(query);
                self.search(column, *search_type, &value)
            }
            // Empty compounds keep their identity: AND of nothing is TRUE, OR is FALSE.
            Filter::And(filters) => self.join(filters, " AND ", TRUE),
            Filter::Or(filters) => self.join(filters, " OR ", FALSE),
            Filter::Not(inner) => format!("NOT ({})", self.filter(inner)),
        }
    }

    fn value(&mut self, query: &str) -> String {
        match &mut self.values {
            Values::Bound { offset, params } => {
                params.push(query.to_string());
                format!("${}", *offset + params.len())
            }
            Values::Inline => quote_literal(query),
        }
    }

    fn join(&mut self, filters: &[Filter], separator: &str, identity: &str) -> String {
        let mut parts: Vec<String> = filters.iter().map(|f| self.filter(f)).collect();
        match parts.len() {
            0 => identity.to_string(),
            1 => parts.remove(0),
            _ => format!("({})", parts.join(separator)),
        }
    }

    fn search(&self, column: &str, search_type: SearchType, value: &str) -> String {
        let config = self
            .ts_config
            .map(|c| format!("{}::regconfig, ", quote_literal(c)))
            .unwrap_or_default();
        format!(
            "to_tsvector({config}COALESCE({}::text, '')) @@ {}({config}{value})",
            quote_ident(column),
            search_type.tsquery_function(),
        )
    }
}

const TRUE: &str = "TRUE";
const FALSE: &str = "FALSE";

/// Double-quote an identifier
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
