//! Cooperative cancellation for engine runs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::errors::{EngineError, EngineResult};

/// Shared cancellation flag with an optional deadline.
///
/// Clones share the flag, so a token handed to an engine can be cancelled
/// from elsewhere. Engines poll `check` between pipeline steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Token that never fires unless cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Token with an optional timeout
    pub fn with_optional_timeout(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(timeout) => Self::with_timeout(timeout),
            None => Self::new(),
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// Fail if cancelled or expired. `step` names the step about to run.
    pub fn check(&self, step: &str) -> EngineResult<()> {
        if self.is_cancelled() {
            return Err(EngineError::cancelled(step));
        }
        if self.is_expired() {
            return Err(EngineError::timeout(step));
        }
        Ok(())
    }
}
