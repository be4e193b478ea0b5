//! Declaration error types
//!
//! Error codes:
//! - CDNDB_ARITY
//! - CDNDB_SHAPE
//! - CDNDB_PATTERN
//! - CDNDB_ENUM
//! - CDNDB_KIND_MISMATCH
//! - CDNDB_VALUE
//! - CDNDB_DUPLICATE
//! - CDNDB_EMPTY
//! - CDNDB_TYPE
//! - CDNDB_INTEGER
//! - CDNDB_NOT_FOUND

use std::fmt;

use thiserror::Error;

/// The class of rule a declaration violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Too few items passed to `register`, or a row with the wrong cell count
    Arity,
    /// Value has the wrong structural type
    Shape,
    /// Identifier fails the lexical pattern or the double-dash rule
    Pattern,
    /// Kind or enumeration value outside its closed set
    Enum,
    /// Declared kind disagrees with the record's role
    KindMismatch,
    /// Literal value mismatch, e.g. an unsupported version
    Value,
    /// Identifier repeated within a scope that requires uniqueness
    Duplicate,
    /// Required non-empty sequence is empty
    Empty,
    /// Cell has the wrong primitive type
    Type,
    /// Numeric cell is not a whole 64-bit number
    Integer,
    /// No declaration stored under the requested identifier
    NotFound,
}

impl ErrorKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Arity => "CDNDB_ARITY",
            ErrorKind::Shape => "CDNDB_SHAPE",
            ErrorKind::Pattern => "CDNDB_PATTERN",
            ErrorKind::Enum => "CDNDB_ENUM",
            ErrorKind::KindMismatch => "CDNDB_KIND_MISMATCH",
            ErrorKind::Value => "CDNDB_VALUE",
            ErrorKind::Duplicate => "CDNDB_DUPLICATE",
            ErrorKind::Empty => "CDNDB_EMPTY",
            ErrorKind::Type => "CDNDB_TYPE",
            ErrorKind::Integer => "CDNDB_INTEGER",
            ErrorKind::NotFound => "CDNDB_NOT_FOUND",
        }
    }

    /// Returns true if this error came out of structural validation
    /// rather than a registry lookup.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ErrorKind::NotFound)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A rejected declaration, or a failed lookup.
///
/// `path` is the chain of steps that led to the failure, e.g.
/// `register(): item[1]: validate_table(): validate_payload(): `, and
/// `reason` the rule that was broken at that point. The rendered message is
/// their concatenation and is stable: callers match on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}{reason}")]
pub struct DeclarationError {
    kind: ErrorKind,
    path: String,
    reason: String,
}

impl DeclarationError {
    pub fn new(kind: ErrorKind, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn arity(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arity, path, reason)
    }

    pub fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, path, reason)
    }

    pub fn pattern(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Pattern, path, reason)
    }

    pub fn enumeration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Enum, path, reason)
    }

    pub fn kind_mismatch(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::KindMismatch, path, reason)
    }

    pub fn value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, path, reason)
    }

    pub fn duplicate(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate, path, reason)
    }

    pub fn empty(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Empty, path, reason)
    }

    pub fn type_mismatch(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, path, reason)
    }

    pub fn integer(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Integer, path, reason)
    }

    /// Create a not-found error for a registry lookup
    pub fn not_found(path: impl Into<String>, identifier: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            path,
            format!("no declaration \"{}\"", super::validator::safe_str(identifier)),
        )
    }

    /// Returns the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the stable string code of the kind
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Returns the path prefix locating the failure
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the rule that was broken, without the path
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the full path-qualified message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result type for declaration operations
pub type DeclarationResult<T> = Result<T, DeclarationError>;
