//! Hashing error types
//!
//! Error codes:
//! - TRIB_HASH_SERIALIZATION (ERROR severity)
//! - TRIB_HASH_MALFORMED_DIGEST (ERROR severity)

use std::fmt;

/// Severity levels for hashing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, caller decides what to do
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Hashing error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashErrorCode {
    /// Value could not be serialized to JSON
    TribHashSerialization,
    /// A digest string did not have the `sha256:<64 hex>` shape
    TribHashMalformedDigest,
}

impl HashErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            HashErrorCode::TribHashSerialization => "TRIB_HASH_SERIALIZATION",
            HashErrorCode::TribHashMalformedDigest => "TRIB_HASH_MALFORMED_DIGEST",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for HashErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Hashing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashError {
    code: HashErrorCode,
    message: String,
}

impl HashError {
    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self {
            code: HashErrorCode::TribHashSerialization,
            message: message.into(),
        }
    }

    /// Create a malformed digest error
    pub fn malformed_digest(value: &str) -> Self {
        Self {
            code: HashErrorCode::TribHashMalformedDigest,
            message: format!("malformed digest: '{}'", value),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> HashErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for HashError {}

/// Result type for hashing operations
pub type HashResult<T> = Result<T, HashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_code() {
        let err = HashError::malformed_digest("md5:abc");
        let display = err.to_string();
        assert!(display.contains("TRIB_HASH_MALFORMED_DIGEST"));
        assert!(display.contains("md5:abc"));
    }
}
