//! # Subscription Management
//!
//! Ordered subscriber list with synchronous, isolated dispatch.

use std::fmt;

use uuid::Uuid;

use super::event::RegistryEvent;

/// Error a subscriber may return. It is reported, never propagated.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by a subscriber callback
pub type SubscriberResult = Result<(), SubscriberError>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Subscriber {
    id: SubscriptionId,
    callback: Box<dyn FnMut(&RegistryEvent) -> SubscriberResult>,
}

/// A subscriber that returned an error during dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    pub subscription: SubscriptionId,
    /// Position of the subscriber in dispatch order
    pub position: usize,
    pub message: String,
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Subscribers that returned Ok
    pub delivered: usize,
    /// Subscribers that returned Err, in dispatch order
    pub failures: Vec<SubscriberFailure>,
}

/// Subscribers in subscription order
#[derive(Default)]
pub struct Notifier {
    subscribers: Vec<Subscriber>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. It only sees registrations made after this call.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&RegistryEvent) -> SubscriberResult + 'static,
    {
        let id = SubscriptionId::new();
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscriber. Returns false if the handle is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Invoke every subscriber in order.
    ///
    /// A failing subscriber does not stop the others.
    pub fn dispatch(&mut self, event: &RegistryEvent) -> DispatchResult {
        let mut result = DispatchResult::default();
        for (position, subscriber) in self.subscribers.iter_mut().enumerate() {
            match (subscriber.callback)(event) {
                Ok(()) => result.delivered += 1,
                Err(e) => result.failures.push(SubscriberFailure {
                    subscription: subscriber.id,
                    position,
                    message: e.to_string(),
                }),
            }
        }
        result
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
