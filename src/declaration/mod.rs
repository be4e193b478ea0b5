//! Declaration subsystem for cdndb
//!
//! A declaration is one metadata record plus its tables. This module owns
//! the typed model and the validator that produces it from untyped JSON.
//!
//! # Design Principles
//!
//! - The whole declaration is checked before anything is stored
//! - The first violation aborts; no aggregation
//! - Errors are path-qualified and their text is stable
//! - No coercion: an integer column never accepts a string

mod errors;
mod request;
mod types;
pub mod validator;

pub use errors::{DeclarationError, DeclarationResult, ErrorKind};
pub use request::RegisterRequest;
pub use types::{
    Cell, Column, ColumnKind, ColumnType, Declaration, Identifier, Metadata, Payload, RecordKind,
    Row, Table, SUPPORTED_VERSION,
};
pub use validator::{validate_request, KindSet};
