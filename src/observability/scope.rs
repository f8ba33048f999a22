//! ObservationScope for BEGIN/COMPLETE/FAILED event pairs
//!
//! - `{name}_BEGIN` on creation
//! - `{name}_COMPLETE` on `complete()`
//! - `{name}_FAILED` on `fail()`
//! - `{name}_INCOMPLETE` (WARN) when dropped without either

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the start and end of an operation.
///
/// ```ignore
/// let scope = ObservationScope::with_fields("REPLAY", &[("run_id", run_id)]);
/// // ... do work ...
/// scope.complete_with_fields(&[("verdict", "PASS")]);
/// ```
pub struct ObservationScope {
    name: String,
    fields: Vec<(String, String)>,
    timer: Timer,
    completed: bool,
}

impl ObservationScope {
    /// Open a scope with no fields.
    pub fn new(name: &str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Open a scope; the fields are repeated on the closing event.
    pub fn with_fields(name: &str, fields: &[(&str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timer: Timer::new(),
            completed: false,
        }
    }

    /// Close the scope successfully.
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Close the scope successfully with additional fields.
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.completed = true;
        let elapsed = self.timer.elapsed_ms().to_string();

        let mut fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.extend(extra.iter().copied());
        fields.push(("elapsed_ms", elapsed.as_str()));

        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Close the scope as failed.
    pub fn fail(mut self, reason: &str) {
        self.completed = true;

        let mut fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.push(("reason", reason));

        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    /// Whether the scope has been closed
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer for durations recorded in logs and snapshots
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed whole milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
