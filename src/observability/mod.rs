//! Observability
//!
//! Structured JSON-lines logging and the typed lifecycle events the service
//! emits. Logging is synchronous and never fails the caller.
//!
//! ```ignore
//! use afterschool::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("SEED_BEGIN", &[("file", "lessons.json")]);
//! log_event_with_fields(Event::StorageConnected, &[("backend", "file")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields. Fatal events go to stderr.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
