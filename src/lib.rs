//! cdndb - a schema-validating registry for self-describing database
//! declarations
//!
//! A declaration is one metadata record plus its tables. `Registry::register`
//! validates the whole declaration against a fixed structural schema, stores
//! it under its identifier only if every check passes, and then notifies
//! subscribers.
//!
//! ```
//! use cdndb::{RegisterRequest, Registry};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry.register(RegisterRequest::new(
//!     json!({ "identifier": "user-db", "kind": "Metadata", "version": "0.0.1" }),
//!     vec![json!({
//!         "identifier": "users",
//!         "kind": "UnencryptedTable",
//!         "payload": {
//!             "columns": [{ "identifier": "uid", "kind": "Integer" }],
//!             "rows": [[1], [2]]
//!         }
//!     })],
//! ))?;
//!
//! assert_eq!(registry.get("user-db").unwrap().tables[0].row_count(), 2);
//! # Ok::<(), cdndb::DeclarationError>(())
//! ```

pub mod declaration;
pub mod notifier;
pub mod observability;
pub mod registry;

pub use declaration::{
    Cell, Column, ColumnKind, ColumnType, Declaration, DeclarationError, DeclarationResult,
    ErrorKind, Identifier, Metadata, Payload, RecordKind, RegisterRequest, Row, Table,
    SUPPORTED_VERSION,
};
pub use notifier::{RegistryEvent, SubscriberError, SubscriberResult, SubscriptionId};
pub use registry::{DuplicatePolicy, Registry, RegistryConfig, RegistryResult};
