//! Graph error types
//!
//! Error codes:
//! - TRIB_GRAPH_NOT_FOUND (ERROR severity, recoverable by the caller)
//! - TRIB_GRAPH_CYCLIC (ERROR severity, fatal to the requesting operation only)
//! - TRIB_GRAPH_INVALID_WEIGHTS (ERROR severity)

use std::fmt;

/// Severity levels for graph errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, other operations on the same graph may proceed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Graph-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorCode {
    /// Transcript hash not present in the graph
    TribGraphNotFound,
    /// Operation requires an acyclic graph
    TribGraphCyclic,
    /// Fragility weights are negative or not finite
    TribGraphInvalidWeights,
}

impl GraphErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            GraphErrorCode::TribGraphNotFound => "TRIB_GRAPH_NOT_FOUND",
            GraphErrorCode::TribGraphCyclic => "TRIB_GRAPH_CYCLIC",
            GraphErrorCode::TribGraphInvalidWeights => "TRIB_GRAPH_INVALID_WEIGHTS",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for GraphErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Graph error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphError {
    code: GraphErrorCode,
    message: String,
    operation: Option<String>,
}

impl GraphError {
    /// The requested transcript hash is not in the graph
    pub fn not_found(hash: &str) -> Self {
        Self {
            code: GraphErrorCode::TribGraphNotFound,
            message: format!("transcript '{}' not found in dependency graph", hash),
            operation: None,
        }
    }

    /// The operation refuses to run on a cyclic graph
    pub fn cyclic(operation: &str, cycle_count: usize) -> Self {
        Self {
            code: GraphErrorCode::TribGraphCyclic,
            message: format!(
                "{} requires an acyclic dependency graph; found {} cycle(s)",
                operation, cycle_count
            ),
            operation: Some(operation.to_string()),
        }
    }

    /// Fragility weights failed validation
    pub fn invalid_weights(reason: impl Into<String>) -> Self {
        Self {
            code: GraphErrorCode::TribGraphInvalidWeights,
            message: reason.into(),
            operation: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> GraphErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The operation that refused to run, for cyclic-graph errors
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }
}

impl fmt::Display for GraphError {
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

impl std::error::Error for GraphError {}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_error_names_operation() {
        let err = GraphError::cyclic("fragility", 2);
        assert_eq!(err.code(), GraphErrorCode::TribGraphCyclic);
        assert_eq!(err.operation(), Some("fragility"));
        assert!(err.to_string().contains("TRIB_GRAPH_CYCLIC"));
        assert!(err.to_string().contains("fragility"));
    }

    #[test]
    fn test_not_found_display() {
        let err = GraphError::not_found("sha256:abc");
        assert!(err.to_string().contains("sha256:abc"));
        assert!(err.operation().is_none());
    }
}
