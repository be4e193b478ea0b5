//! Typed declaration model
//!
//! Values of these types only come out of the validator, so every
//! `Identifier` matches the identifier pattern, every row has one cell per
//! column, and every cell agrees with its column's kind.
//!
//! Record kinds:
//! - Metadata: exactly one per declaration
//! - UnencryptedTable: columns + rows in the clear
//!
//! `EncryptedTable` is a reserved name with no implementation; the validator
//! rejects it like any other unknown kind.
//!
//! Column kinds:
//! - Enum: string drawn from a permitted list
//! - Integer: whole 64-bit number
//! - String: UTF-8 text

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// The only version tag this registry accepts
pub const SUPPORTED_VERSION: &str = "0.0.1";

/// A validated kebab-case identifier, 3 to 32 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wraps a string that has already passed `validate_identifier`.
    pub(crate) fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Kind tag of a metadata or table record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    /// The declaration's descriptive record
    Metadata,
    /// A table whose payload is stored in the clear
    UnencryptedTable,
}

impl RecordKind {
    /// Accepted kinds, in the order they are listed in error messages
    pub const ALL: [RecordKind; 2] = [RecordKind::Metadata, RecordKind::UnencryptedTable];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Metadata => "Metadata",
            RecordKind::UnencryptedTable => "UnencryptedTable",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind tag of a column, without the enumeration's permitted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    Enum,
    Integer,
    String,
}

impl ColumnKind {
    /// Accepted kinds, in the order they are listed in error messages
    pub const ALL: [ColumnKind; 3] = [ColumnKind::Enum, ColumnKind::Integer, ColumnKind::String];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Enum => "Enum",
            ColumnKind::Integer => "Integer",
            ColumnKind::String => "String",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column type with any data the kind carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ColumnType {
    /// Cells must equal one of `valid`. An empty list admits no rows.
    Enum { valid: Vec<String> },
    Integer,
    String,
}

impl ColumnType {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnType::Enum { .. } => ColumnKind::Enum,
            ColumnType::Integer => ColumnKind::Integer,
            ColumnType::String => ColumnKind::String,
        }
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub identifier: Identifier,
    #[serde(flatten)]
    pub column_type: ColumnType,
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        self.column_type.kind()
    }

    /// Permitted values of an enumeration column
    pub fn valid_values(&self) -> Option<&[String]> {
        match &self.column_type {
            ColumnType::Enum { valid } => Some(valid),
            _ => None,
        }
    }
}

/// One cell of a row. Enumeration cells are stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Text(String),
}

impl Cell {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Integer(_) => None,
        }
    }
}

/// Cells in column order
pub type Row = Vec<Cell>;

/// The columns and rows of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Payload {
    /// Position of a column, which is also the position of its cells
    pub fn column_index(&self, identifier: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.identifier == identifier)
    }

    pub fn column(&self, identifier: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.identifier == identifier)
    }

    /// The cell at `row` under the column named `column`
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

/// A table record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub identifier: Identifier,
    pub kind: RecordKind,
    pub payload: Payload,
}

impl Table {
    pub fn columns(&self) -> &[Column] {
        &self.payload.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.payload.rows
    }

    pub fn row_count(&self) -> usize {
        self.payload.rows.len()
    }
}

/// The metadata record of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub identifier: Identifier,
    pub kind: RecordKind,
    pub version: String,
}

/// An accepted declaration: one metadata record plus its tables, in the
/// order they were submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub metadata: Metadata,
    pub tables: Vec<Table>,
}

impl Declaration {
    /// The identifier the declaration is stored under
    pub fn identifier(&self) -> &Identifier {
        &self.metadata.identifier
    }

    pub fn table(&self, identifier: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.identifier == identifier)
    }

    /// Renders the declaration back into its JSON shape.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
