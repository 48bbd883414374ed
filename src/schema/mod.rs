// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Record types and search index declarations.
//!
//! A [`ModelSchema`] describes a table the way the ORM sees it: the record
//! kind (`app_label`, `model_name`), its primary key and its typed columns.
//! A [`SearchIndex`] declares which of those columns are searchable and under
//! which names; the [`UnifiedIndex`] holds every declared index.
//!
//! # Example
//!
//! ```rust
//! use postgres_fts_backend::schema::{ModelSchema, SearchIndex, UnifiedIndex};
//!
//! let model = ModelSchema::new("core", "mockmodel", "core_mockmodel")
//!     .char_field("author")
//!     .char_field("foo")
//!     .datetime_field("pub_date")
//!     .foreign_key("tag_id");
//!
//! let index = SearchIndex::new(model.clone())
//!     .document("text", "foo")
//!     .field("name", "author")
//!     .field("pub_date", "pub_date");
//!
//! let mut unified = UnifiedIndex::default();
//! unified.register(index);
//!
//! assert_eq!(model.text_columns(), vec!["author", "foo"]);
//! assert_eq!(unified.get_indexed_models().len(), 1);
//! ```

use std::collections::HashMap;

/// Default primary key column.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Column type as the ORM reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Char,
    Slug,
    Integer,
    BigInteger,
    Boolean,
    DateTime,
    Date,
    Float,
    Uuid,
    ForeignKey,
}

impl FieldKind {
    /// True for the column types the text-search operator applies to.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Char | FieldKind::Slug)
    }
}

/// A typed column of a record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelField {
    /// Attribute name
    pub name: String,
    /// Column name in the table
    pub column: String,
    pub kind: FieldKind,
}

/// Record type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub app_label: String,
    pub model_name: String,
    /// Table the records live in
    pub table: String,
    /// Primary key column
    pub primary_key: String,
    pub fields: Vec<ModelField>,
}

impl ModelSchema {
    /// Declare a record type with an integer `id` primary key
    pub fn new(
        app_label: impl Into<String>,
        model_name: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
            table: table.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: vec![ModelField {
                name: DEFAULT_PRIMARY_KEY.to_string(),
                column: DEFAULT_PRIMARY_KEY.to_string(),
                kind: FieldKind::BigInteger,
            }],
        }
    }

    /// Replace the primary key with a column of the given kind
    pub fn primary_key(mut self, column: impl Into<String>, kind: FieldKind) -> Self {
        let column = column.into();
        self.fields.retain(|f| f.column != self.primary_key);
        self.fields.insert(
            0,
            ModelField {
                name: column.clone(),
                column: column.clone(),
                kind,
            },
        );
        self.primary_key = column;
        self
    }

    /// Add a column
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        self.fields.push(ModelField {
            column: name.clone(),
            name,
            kind,
        });
        self
    }

    pub fn char_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Char)
    }

    pub fn text_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Text)
    }

    pub fn slug_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Slug)
    }

    pub fn integer_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Integer)
    }

    pub fn boolean_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Boolean)
    }

    pub fn datetime_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::DateTime)
    }

    pub fn foreign_key(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::ForeignKey)
    }

    /// `app_label.model_name`, the record kind identifier
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Look up a column by attribute name
    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Columns the text-search operator applies to, in declaration order
    pub fn text_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.kind.is_textual())
            .map(|f| f.column.as_str())
            .collect()
    }
}

/// A searchable field of an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexField {
    /// Name used in queries
    pub name: String,
    /// Model attribute the field reads from
    pub model_attr: String,
    /// The designated "search anywhere" field
    pub document: bool,
}

/// Search index declaration over one record type
#[derive(Debug, Clone)]
pub struct SearchIndex {
    pub model: ModelSchema,
    pub fields: Vec<IndexField>,
}

impl SearchIndex {
    /// Create an index with no fields
    pub fn new(model: ModelSchema) -> Self {
        Self {
            model,
            fields: Vec::new(),
        }
    }

    /// Add the document field
    pub fn document(mut self, name: impl Into<String>, model_attr: impl Into<String>) -> Self {
        self.fields.push(IndexField {
            name: name.into(),
            model_attr: model_attr.into(),
            document: true,
        });
        self
    }

    /// Add a searchable field
    pub fn field(mut self, name: impl Into<String>, model_attr: impl Into<String>) -> Self {
        self.fields.push(IndexField {
            name: name.into(),
            model_attr: model_attr.into(),
            document: false,
        });
        self
    }

    /// Look up a field by its query name
    pub fn get_field(&self, name: &str) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The designated document field, if declared
    pub fn document_field(&self) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.document)
    }
}

/// Registry of every declared search index
#[derive(Debug, Clone, Default)]
pub struct UnifiedIndex {
    /// Registered indexes by model key
    indexes: HashMap<String, SearchIndex>,
    /// Registration order of model keys
    order: Vec<String>,
}

impl UnifiedIndex {
    /// Build a registry from a set of indexes
    pub fn build(indexes: impl IntoIterator<Item = SearchIndex>) -> Self {
        let mut unified = Self::default();
        for index in indexes {
            unified.register(index);
        }
        unified
    }

    /// Register an index, replacing any earlier one for the same model
    pub fn register(&mut self, index: SearchIndex) {
        let key = index.model.model_key();
        if !self.indexes.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.indexes.insert(key, index);
    }

    /// Index for a model, if one is registered
    pub fn get_index(&self, model: &ModelSchema) -> Option<&SearchIndex> {
        self.indexes.get(&model.model_key())
    }

    /// Models with an index, in registration order
    pub fn get_indexed_models(&self) -> Vec<&ModelSchema> {
        self.order
            .iter()
            .filter_map(|key| self.indexes.get(key))
            .map(|index| &index.model)
            .collect()
    }
}
