//! # Notifier
//!
//! Announces successful registrations to subscribers.
//!
//! - Dispatch is synchronous, in subscription order
//! - Subscribers are not notified of registrations made before they subscribed
//! - A subscriber error is reported and dispatch continues; the registration
//!   it was told about stays in place

mod event;
mod subscription;

pub use event::RegistryEvent;
pub use subscription::{
    DispatchResult, Notifier, SubscriberError, SubscriberFailure, SubscriberResult, SubscriptionId,
};
