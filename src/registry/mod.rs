//! Declaration registry for cdndb
//!
//! Stores declarations that passed validation, keyed by metadata
//! identifier, and notifies subscribers after each successful registration.
//!
//! # Invariants
//!
//! - Nothing is stored unless the whole declaration validates
//! - A rejected registration has no visible effect
//! - Subscribers run after the store is updated, in subscription order
//! - Re-registering an identifier overwrites by default (see `DuplicatePolicy`)

mod config;
mod store;

pub use config::{DuplicatePolicy, RegistryConfig};
pub use store::{Registry, RegistryResult};
