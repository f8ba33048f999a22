//! CLI-specific error types
//!
//! Subsystem errors pass through with their own codes so a caller sees
//! `TRIB_GRAPH_CYCLIC` rather than a generic CLI failure.

use std::fmt;
use std::io;

use crate::engine::EngineError;
use crate::graph::GraphError;
use crate::hashing::HashError;
use crate::ledger::LedgerError;
use crate::replay::ReplayError;
use crate::snapshot::SnapshotError;
use crate::transcript::TranscriptError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (input files, stdout)
    IoError,
    /// Input file could not be parsed
    InvalidInput,
    /// Error raised by a library subsystem, with its code
    Subsystem(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TRIB_CLI_CONFIG_ERROR",
            Self::IoError => "TRIB_CLI_IO_ERROR",
            Self::InvalidInput => "TRIB_CLI_INVALID_INPUT",
            Self::Subsystem(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Unparseable input file
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    fn subsystem(code: &'static str, message: impl fmt::Display) -> Self {
        Self::new(CliErrorCode::Subsystem(code), message.to_string())
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<GraphError> for CliError {
    fn from(e: GraphError) -> Self {
        Self::subsystem(e.code().code(), e.message())
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        let message = match e.details() {
            Some(details) => format!("{} ({})", e.message(), details),
            None => e.message().to_string(),
        };
        Self::subsystem(e.code().code(), message)
    }
}

impl From<TranscriptError> for CliError {
    fn from(e: TranscriptError) -> Self {
        Self::subsystem(e.code().code(), e.message())
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        Self::subsystem(e.code().code(), e.message())
    }
}

impl From<HashError> for CliError {
    fn from(e: HashError) -> Self {
        Self::subsystem(e.code().code(), e.message())
    }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self {
        Self::subsystem(e.code(), &e)
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        Self::subsystem(e.code(), &e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_codes_pass_through() {
        let err: CliError = GraphError::cyclic("fragility", 1).into();
        assert_eq!(err.code_str(), "TRIB_GRAPH_CYCLIC");
        assert!(err.message().contains("fragility"));

        let err: CliError = ReplayError::NonDeterministic("r".into()).into();
        assert_eq!(err.code_str(), "TRIB_REPLAY_NON_DETERMINISTIC");
    }

    #[test]
    fn test_display() {
        let err = CliError::config_error("replay_timeout_ms must be > 0");
        assert_eq!(
            err.to_string(),
            "TRIB_CLI_CONFIG_ERROR: replay_timeout_ms must be > 0"
        );
    }
}
