//! The declaration store.

use std::collections::HashMap;

use crate::declaration::{
    validate_request, Declaration, DeclarationError, Identifier, RegisterRequest,
};
use crate::notifier::{DispatchResult, Notifier, RegistryEvent, SubscriberResult, SubscriptionId};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot};

use super::config::{DuplicatePolicy, RegistryConfig};

const REGISTER_PATH: &str = "register(): ";
const REQUIRE_PATH: &str = "require(): ";

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, DeclarationError>;

/// Identifier-keyed store of accepted declarations, plus the subscribers
/// told about each registration.
///
/// The caller owns the registry and passes it wherever it is needed; there
/// is no global instance. `register` is all-or-nothing: a rejected request
/// leaves the store, the subscribers and the sequence counter untouched.
#[derive(Debug)]
pub struct Registry {
    config: RegistryConfig,
    declarations: HashMap<Identifier, Declaration>,
    notifier: Notifier,
    metrics: MetricsRegistry,
    /// Successful registrations so far
    sequence: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with the default config
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let registry = Self {
            config,
            declarations: HashMap::new(),
            notifier: Notifier::new(),
            metrics: MetricsRegistry::new(),
            sequence: 0,
        };
        registry.log(Event::RegistryCreated, &[]);
        registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Validate and store a declaration, then notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning metadata, then tables in
    /// argument order. With `DuplicatePolicy::Reject`, re-registering a
    /// stored identifier fails with `Duplicate`.
    pub fn register(&mut self, request: impl Into<RegisterRequest>) -> RegistryResult<()> {
        let request = request.into();
        let declaration = match validate_request(&request, REGISTER_PATH) {
            Ok(declaration) => declaration,
            Err(err) => return Err(self.reject(&request, err)),
        };

        let identifier = declaration.identifier().clone();
        let replaced = self.declarations.contains_key(&identifier);
        if replaced && self.config.duplicate_policy == DuplicatePolicy::Reject {
            let err = DeclarationError::duplicate(
                REGISTER_PATH,
                format!("declaration \"{}\" is already registered", identifier),
            );
            return Err(self.reject(&request, err));
        }

        let table_count = declaration.tables.len().to_string();
        self.declarations.insert(identifier.clone(), declaration);
        self.sequence += 1;
        self.metrics.increment_registered();
        if replaced {
            self.metrics.increment_replaced();
        }
        self.log(
            if replaced {
                Event::DeclarationReplaced
            } else {
                Event::DeclarationRegistered
            },
            &[("identifier", identifier.as_str()), ("tables", table_count.as_str())],
        );

        let event = RegistryEvent::new(self.sequence, identifier, replaced);
        let dispatch = self.notifier.dispatch(&event);
        self.record_dispatch(&event, &dispatch);
        Ok(())
    }

    /// The declaration stored under `identifier`, if any.
    pub fn get(&self, identifier: &str) -> Option<&Declaration> {
        self.declarations.get(identifier)
    }

    /// Like `get`, but absence is an error.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing is stored under `identifier`.
    pub fn require(&self, identifier: &str) -> RegistryResult<&Declaration> {
        self.get(identifier)
            .ok_or_else(|| DeclarationError::not_found(REQUIRE_PATH, identifier))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.declarations.contains_key(identifier)
    }

    /// Number of stored declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Identifiers of all stored declarations, sorted
    pub fn identifiers(&self) -> Vec<&Identifier> {
        let mut ids: Vec<_> = self.declarations.keys().collect();
        ids.sort();
        ids
    }

    /// Stored declarations in identifier order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> + '_ {
        self.identifiers()
            .into_iter()
            .filter_map(move |id| self.declarations.get(id))
    }

    /// Add a subscriber, called after every later successful `register`.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&RegistryEvent) -> SubscriberResult + 'static,
    {
        let id = self.notifier.subscribe(callback);
        let subscription = id.to_string();
        self.log(Event::SubscriberAdded, &[("subscription", subscription.as_str())]);
        id
    }

    /// Remove a subscriber. Returns false if the handle is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.notifier.unsubscribe(id);
        if removed {
            let subscription = id.to_string();
            self.log(Event::SubscriberRemoved, &[("subscription", subscription.as_str())]);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.len()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn reject(&self, request: &RegisterRequest, err: DeclarationError) -> DeclarationError {
        self.metrics.increment_rejected();
        let identifier = request
            .metadata()
            .and_then(|m| m.get("identifier"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let message = err.to_string();
        self.log(
            Event::DeclarationRejected,
            &[
                ("code", err.code()),
                ("identifier", identifier),
                ("message", message.as_str()),
            ],
        );
        err
    }

    fn record_dispatch(&self, event: &RegistryEvent, dispatch: &DispatchResult) {
        self.metrics.add_delivered(dispatch.delivered as u64);
        self.metrics
            .add_subscriber_failures(dispatch.failures.len() as u64);
        for failure in &dispatch.failures {
            let position = failure.position.to_string();
            let subscription = failure.subscription.to_string();
            self.log(
                Event::SubscriberFailed,
                &[
                    ("identifier", event.identifier()),
                    ("message", failure.message.as_str()),
                    ("position", position.as_str()),
                    ("subscription", subscription.as_str()),
                ],
            );
        }
    }

    fn log(&self, event: Event, fields: &[(&str, &str)]) {
        if self.config.logging {
            log_event_with_fields(event, fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ErrorKind;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn metadata(identifier: &str) -> Value {
        json!({ "identifier": identifier, "kind": "Metadata", "version": "0.0.1" })
    }

    fn table(identifier: &str, rows: Value) -> Value {
        json!({
            "identifier": identifier,
            "kind": "UnencryptedTable",
            "payload": {
                "columns": [{ "identifier": "uid", "kind": "Integer" }],
                "rows": rows
            }
        })
    }

    fn quiet() -> Registry {
        Registry::with_config(RegistryConfig::silent())
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = quiet();
        registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("users", json!([[1], [2]]))]))
            .unwrap();

        let decl = registry.get("user-db").unwrap();
        assert_eq!(decl.tables.len(), 1);
        assert_eq!(decl.tables[0].row_count(), 2);
        assert!(registry.contains("user-db"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rejection_stores_nothing() {
        let mut registry = quiet();
        let err = registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("users", json!([[1.5]]))]))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Integer);
        assert!(registry.get("user-db").is_none());
        assert!(registry.is_empty());
        assert_eq!(registry.metrics().declarations_rejected, 1);
    }

    #[test]
    fn test_duplicate_tables_in_one_request() {
        let mut registry = quiet();
        let err = registry
            .register(RegisterRequest::new(
                metadata("user-db"),
                vec![table("users", json!([])), table("users", json!([]))],
            ))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(err.to_string(), "register(): item[2] dupe identifier \"users\"");
    }

    #[test]
    fn test_overwrite_is_default() {
        let mut registry = quiet();
        registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("users", json!([[1]]))]))
            .unwrap();
        registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("people", json!([]))]))
            .unwrap();

        let decl = registry.get("user-db").unwrap();
        assert!(decl.table("people").is_some());
        assert!(decl.table("users").is_none());
        assert_eq!(registry.metrics().declarations_replaced, 1);
    }

    #[test]
    fn test_reject_policy_keeps_first() {
        let mut registry = Registry::with_config(RegistryConfig::reject_duplicates().with_logging(false));
        registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("users", json!([[1]]))]))
            .unwrap();

        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        registry.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        let err = registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("people", json!([]))]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(
            err.to_string(),
            "register(): declaration \"user-db\" is already registered"
        );
        assert!(registry.get("user-db").unwrap().table("users").is_some());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_require_reports_not_found() {
        let registry = quiet();
        let err = registry.require("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "require(): no declaration \"nope\"");
    }

    #[test]
    fn test_identifiers_sorted() {
        let mut registry = quiet();
        for id in ["zeta-db", "alpha-db", "mid-db"] {
            registry
                .register(RegisterRequest::new(metadata(id), vec![table("t-one", json!([]))]))
                .unwrap();
        }

        let ids: Vec<&str> = registry.identifiers().into_iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["alpha-db", "mid-db", "zeta-db"]);
        assert_eq!(registry.declarations().count(), 3);
    }

    #[test]
    fn test_subscriber_failure_keeps_registration() {
        let mut registry = quiet();
        registry.subscribe(|_| Err("down".into()));

        registry
            .register(RegisterRequest::new(metadata("user-db"), vec![table("users", json!([]))]))
            .unwrap();

        assert!(registry.contains("user-db"));
        let metrics = registry.metrics();
        assert_eq!(metrics.subscriber_failures, 1);
        assert_eq!(metrics.notifications_delivered, 0);
    }

    #[test]
    fn test_register_accepts_item_list() {
        let mut registry = quiet();
        registry
            .register(vec![metadata("my-db"), table("my-table", json!([[123]]))])
            .unwrap();
        assert!(registry.contains("my-db"));
    }
}
