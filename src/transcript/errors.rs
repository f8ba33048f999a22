//! Transcript error types
//!
//! Error codes:
//! - TRIB_TRANSCRIPT_IO (ERROR severity)
//! - TRIB_TRANSCRIPT_PARSE (ERROR severity)
//! - TRIB_TRANSCRIPT_HASH_MISMATCH (ERROR severity)

use std::fmt;
use std::io;
use std::path::Path;

/// Transcript-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptErrorCode {
    /// Envelope file or directory could not be read
    TribTranscriptIo,
    /// Envelope file is not a valid envelope
    TribTranscriptParse,
    /// Recorded transcript hash disagrees with the transcript content
    TribTranscriptHashMismatch,
}

impl TranscriptErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            TranscriptErrorCode::TribTranscriptIo => "TRIB_TRANSCRIPT_IO",
            TranscriptErrorCode::TribTranscriptParse => "TRIB_TRANSCRIPT_PARSE",
            TranscriptErrorCode::TribTranscriptHashMismatch => "TRIB_TRANSCRIPT_HASH_MISMATCH",
        }
    }
}

impl fmt::Display for TranscriptErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Transcript error with context
#[derive(Debug)]
pub struct TranscriptError {
    code: TranscriptErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl TranscriptError {
    /// I/O failure at a path
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self {
            code: TranscriptErrorCode::TribTranscriptIo,
            message: format!("I/O error at path: {}", path.display()),
            source: Some(source),
        }
    }

    /// Envelope could not be parsed or hashed
    pub fn parse_error(path: &Path, reason: impl fmt::Display) -> Self {
        Self {
            code: TranscriptErrorCode::TribTranscriptParse,
            message: format!("invalid envelope {}: {}", path.display(), reason),
            source: None,
        }
    }

    /// Recorded hash does not match the content
    pub fn hash_mismatch(recorded: &str, computed: &str) -> Self {
        Self {
            code: TranscriptErrorCode::TribTranscriptHashMismatch,
            message: format!(
                "transcript hash mismatch: recorded {} but content hashes to {}",
                recorded, computed
            ),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> TranscriptErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for TranscriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for transcript operations
pub type TranscriptResult<T> = Result<T, TranscriptError>;
