//! Registration events delivered to subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::declaration::Identifier;

/// Announces that a declaration was stored.
///
/// Carries the identifier by value, never a reference into the registry,
/// so subscribers cannot reach stored state through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEvent {
    /// Position of this registration among all successful ones, from 1
    pub sequence: u64,

    /// Identifier of the stored declaration
    pub identifier: Identifier,

    /// Whether an earlier declaration with the same identifier was overwritten
    pub replaced: bool,

    /// When the declaration was stored
    pub timestamp: DateTime<Utc>,
}

impl RegistryEvent {
    pub fn new(sequence: u64, identifier: Identifier, replaced: bool) -> Self {
        Self {
            sequence,
            identifier,
            replaced,
            timestamp: Utc::now(),
        }
    }

    /// The identifier as a plain string
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Serialize to the JSON shape handed to presentation layers
    pub fn to_wire_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "cdndb-register",
            "detail": {
                "identifier": self.identifier.as_str(),
                "replaced": self.replaced,
                "sequence": self.sequence,
                "timestamp": self.timestamp.to_rfc3339(),
            }
        })
    }
}
