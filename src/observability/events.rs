//! Observable events for cdndb
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in the registry lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A registry context was created
    RegistryCreated,

    // Registration
    /// A declaration passed validation and was stored under a new identifier
    DeclarationRegistered,
    /// A declaration replaced an earlier one with the same identifier
    DeclarationReplaced,
    /// A declaration failed validation or was refused by the duplicate policy
    DeclarationRejected,

    // Subscriptions
    /// A subscriber was added
    SubscriberAdded,
    /// A subscriber was removed
    SubscriberRemoved,
    /// A subscriber returned an error during dispatch
    SubscriberFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RegistryCreated => "REGISTRY_CREATED",
            Event::DeclarationRegistered => "DECLARATION_REGISTERED",
            Event::DeclarationReplaced => "DECLARATION_REPLACED",
            Event::DeclarationRejected => "DECLARATION_REJECTED",
            Event::SubscriberAdded => "SUBSCRIBER_ADDED",
            Event::SubscriberRemoved => "SUBSCRIBER_REMOVED",
            Event::SubscriberFailed => "SUBSCRIBER_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DeclarationRejected | Event::SubscriberFailed => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
