//! Registration request: one metadata value plus an ordered list of table
//! values, validated as a unit.

use serde_json::Value;

/// Untyped input to `Registry::register`.
///
/// Items are kept in argument order. Item 0 is the metadata record and items
/// 1.. are tables, which is the numbering error messages use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterRequest {
    items: Vec<Value>,
}

impl RegisterRequest {
    /// Create a request from a metadata value and its tables
    pub fn new(metadata: Value, tables: impl IntoIterator<Item = Value>) -> Self {
        tables.into_iter().fold(
            Self {
                items: vec![metadata],
            },
            Self::with_table,
        )
    }

    /// Create a request from a flat argument list, metadata first.
    ///
    /// Fewer than two items is accepted here and rejected at registration.
    pub fn from_items(items: Vec<Value>) -> Self {
        Self { items }
    }

    /// Append a table
    pub fn with_table(mut self, table: Value) -> Self {
        self.items.push(table);
        self
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.items.first()
    }

    pub fn tables(&self) -> &[Value] {
        self.items.get(1..).unwrap_or(&[])
    }

    /// Number of items, metadata included
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Value>> for RegisterRequest {
    fn from(items: Vec<Value>) -> Self {
        Self::from_items(items)
    }
}
