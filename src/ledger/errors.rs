//! # Ledger Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Ledger I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ledger entry at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl LedgerError {
    /// Stable error code for CLI responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "TRIB_LEDGER_NOT_FOUND",
            LedgerError::Io { .. } => "TRIB_LEDGER_IO",
            LedgerError::Parse { .. } => "TRIB_LEDGER_PARSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_line() {
        let err = LedgerError::Parse {
            line: 7,
            reason: "expected value".into(),
        };
        assert_eq!(err.code(), "TRIB_LEDGER_PARSE");
        assert!(err.to_string().contains("line 7"));
    }
}
