//! Snapshot error types
//!
//! Error codes:
//! - TRIB_SNAPSHOT_IO (ERROR severity)
//! - TRIB_SNAPSHOT_SERIALIZATION (ERROR severity)
//! - TRIB_SNAPSHOT_NOT_FOUND (ERROR severity, recoverable by the caller)
//! - TRIB_SNAPSHOT_COLLISION (ERROR severity)
//! - TRIB_SNAPSHOT_INVALID (ERROR severity)
//! - TRIB_SNAPSHOT_INTEGRITY (FATAL severity for the snapshot in question)
//! - TRIB_SNAPSHOT_ENVIRONMENT_MISMATCH (ERROR severity)

use std::fmt;
use std::io;
use std::path::Path;

use crate::hashing::HashError;

/// Severity levels for snapshot errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the store stays usable
    Error,
    /// Stored snapshot content is untrustworthy
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Snapshot-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorCode {
    /// File system failure
    TribSnapshotIo,
    /// Snapshot could not be encoded, decoded or hashed
    TribSnapshotSerialization,
    /// No snapshot for the requested run or id
    TribSnapshotNotFound,
    /// Snapshot id or original already present
    TribSnapshotCollision,
    /// Execution or snapshot violates a structural rule
    TribSnapshotInvalid,
    /// Stored hashes disagree with stored content
    TribSnapshotIntegrity,
    /// Recorded environment disagrees with the current one
    TribSnapshotEnvironmentMismatch,
}

impl SnapshotErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotErrorCode::TribSnapshotIo => "TRIB_SNAPSHOT_IO",
            SnapshotErrorCode::TribSnapshotSerialization => "TRIB_SNAPSHOT_SERIALIZATION",
            SnapshotErrorCode::TribSnapshotNotFound => "TRIB_SNAPSHOT_NOT_FOUND",
            SnapshotErrorCode::TribSnapshotCollision => "TRIB_SNAPSHOT_COLLISION",
            SnapshotErrorCode::TribSnapshotInvalid => "TRIB_SNAPSHOT_INVALID",
            SnapshotErrorCode::TribSnapshotIntegrity => "TRIB_SNAPSHOT_INTEGRITY",
            SnapshotErrorCode::TribSnapshotEnvironmentMismatch => {
                "TRIB_SNAPSHOT_ENVIRONMENT_MISMATCH"
            }
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SnapshotErrorCode::TribSnapshotIntegrity => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for SnapshotErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Snapshot error with context
#[derive(Debug)]
pub struct SnapshotError {
    code: SnapshotErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl SnapshotError {
    fn new(code: SnapshotErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// I/O failure at a path
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self {
            code: SnapshotErrorCode::TribSnapshotIo,
            message: format!("I/O error at path: {}", path.display()),
            details: None,
            source: Some(source),
        }
    }

    /// Snapshot could not be encoded or decoded
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(SnapshotErrorCode::TribSnapshotSerialization, message)
    }

    /// No original snapshot for a run
    pub fn run_not_found(run_id: &str) -> Self {
        Self::new(
            SnapshotErrorCode::TribSnapshotNotFound,
            format!("no snapshot recorded for run '{}'", run_id),
        )
    }

    /// No snapshot with this id in a run
    pub fn snapshot_not_found(run_id: &str, snapshot_id: &str) -> Self {
        Self::new(
            SnapshotErrorCode::TribSnapshotNotFound,
            format!("snapshot '{}' not found in run '{}'", snapshot_id, run_id),
        )
    }

    /// Snapshot file or run original already exists
    pub fn collision(message: impl Into<String>) -> Self {
        Self::new(SnapshotErrorCode::TribSnapshotCollision, message)
    }

    /// Structural rule violated
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(SnapshotErrorCode::TribSnapshotInvalid, message)
    }

    /// A stored hash stage disagrees with recomputation
    pub fn integrity(snapshot_id: &str, stage: &str) -> Self {
        Self::new(
            SnapshotErrorCode::TribSnapshotIntegrity,
            format!(
                "snapshot '{}' failed integrity check at {} stage",
                snapshot_id, stage
            ),
        )
    }

    /// Recorded environment is incompatible
    pub fn environment_mismatch(reason: impl Into<String>) -> Self {
        Self::new(SnapshotErrorCode::TribSnapshotEnvironmentMismatch, reason)
    }

    /// Add details to an error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SnapshotErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Whether the error means "nothing stored under that key"
    pub fn is_not_found(&self) -> bool {
        self.code == SnapshotErrorCode::TribSnapshotNotFound
    }
}

impl From<HashError> for SnapshotError {
    fn from(err: HashError) -> Self {
        Self::serialization(err.message().to_string())
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SnapshotErrorCode::TribSnapshotNotFound.code(), "TRIB_SNAPSHOT_NOT_FOUND");
        assert_eq!(
            SnapshotErrorCode::TribSnapshotEnvironmentMismatch.code(),
            "TRIB_SNAPSHOT_ENVIRONMENT_MISMATCH"
        );
    }

    #[test]
    fn test_only_integrity_is_fatal() {
        assert_eq!(SnapshotErrorCode::TribSnapshotIntegrity.severity(), Severity::Fatal);
        assert_eq!(SnapshotErrorCode::TribSnapshotCollision.severity(), Severity::Error);
    }

    #[test]
    fn test_display_contains_details() {
        let err = SnapshotError::collision("snapshot already exists").with_details("run r1");
        let display = err.to_string();
        assert!(display.contains("[ERROR] TRIB_SNAPSHOT_COLLISION"));
        assert!(display.contains("(run r1)"));
    }

    #[test]
    fn test_io_error_with_path() {
        let path = Path::new("/tmp/snapshots/r1/abc.json");
        let err = SnapshotError::io_error_at_path(
            path,
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.message().contains("/tmp/snapshots/r1/abc.json"));
        assert_eq!(err.code(), SnapshotErrorCode::TribSnapshotIo);
        assert!(std::error::Error::source(&err).is_some());
    }
}
