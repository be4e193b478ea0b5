//! Observability subsystem for cdndb
//!
//! - Structured logging (JSON lines)
//! - Registry counters
//! - Typed lifecycle events
//!
//! Observability is read-only: a logging or metrics failure never changes
//! the outcome of a registration.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
