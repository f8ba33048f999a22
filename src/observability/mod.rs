//! Observability for tribunal
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Observation scopes for BEGIN/COMPLETE pairs
//!
//! Observability is read-only: nothing here feeds back into hashing,
//! graph analytics or replay verdicts.
//!
//! ```ignore
//! use tribunal::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::GraphBuilt, &[("nodes", "3")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::GraphCycleWarning, &[("cycles", "1")]);
    }
}
