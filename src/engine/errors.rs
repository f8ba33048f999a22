//! Engine error types
//!
//! Error codes:
//! - TRIB_ENGINE_INVALID_SPEC (ERROR severity)
//! - TRIB_ENGINE_CANCELLED (ERROR severity)
//! - TRIB_ENGINE_TIMEOUT (ERROR severity)
//! - TRIB_ENGINE_INVALID_STEP (ERROR severity)
//! - TRIB_ENGINE_HASH (ERROR severity)

use std::fmt;

use crate::hashing::HashError;

/// Engine-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCode {
    /// Spec cannot be evaluated (no actions, bad confidence)
    TribEngineInvalidSpec,
    /// Caller cancelled the run
    TribEngineCancelled,
    /// Run exceeded its deadline
    TribEngineTimeout,
    /// Resume step outside the pipeline
    TribEngineInvalidStep,
    /// Seed derivation could not hash its input
    TribEngineHash,
}

impl EngineErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            EngineErrorCode::TribEngineInvalidSpec => "TRIB_ENGINE_INVALID_SPEC",
            EngineErrorCode::TribEngineCancelled => "TRIB_ENGINE_CANCELLED",
            EngineErrorCode::TribEngineTimeout => "TRIB_ENGINE_TIMEOUT",
            EngineErrorCode::TribEngineInvalidStep => "TRIB_ENGINE_INVALID_STEP",
            EngineErrorCode::TribEngineHash => "TRIB_ENGINE_HASH",
        }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Engine error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    code: EngineErrorCode,
    message: String,
    details: Option<String>,
}

impl EngineError {
    /// Spec failed validation
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self {
            code: EngineErrorCode::TribEngineInvalidSpec,
            message: message.into(),
            details: None,
        }
    }

    /// Run cancelled before `step`
    pub fn cancelled(step: &str) -> Self {
        Self {
            code: EngineErrorCode::TribEngineCancelled,
            message: "evaluation cancelled".to_string(),
            details: Some(format!("before step '{}'", step)),
        }
    }

    /// Deadline passed before `step`
    pub fn timeout(step: &str) -> Self {
        Self {
            code: EngineErrorCode::TribEngineTimeout,
            message: "evaluation deadline exceeded".to_string(),
            details: Some(format!("before step '{}'", step)),
        }
    }

    /// Resume requested from a step the pipeline does not have
    pub fn invalid_step(step: u32, total: u32) -> Self {
        Self {
            code: EngineErrorCode::TribEngineInvalidStep,
            message: format!("cannot resume from step {} of {}", step, total),
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> EngineErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Whether the run stopped because of the cancellation token
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self.code,
            EngineErrorCode::TribEngineCancelled | EngineErrorCode::TribEngineTimeout
        )
    }
}

impl From<HashError> for EngineError {
    fn from(err: HashError) -> Self {
        Self {
            code: EngineErrorCode::TribEngineHash,
            message: err.message().to_string(),
            details: None,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
