//! Maskview Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Gateway Errors
    // =========================================================================
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Segment decode error: {0}")]
    SegmentDecode(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Convert to a user-friendly error message for IPC
    pub fn to_ipc_error(&self) -> String {
        self.to_string()
    }

    /// Whether this error came from the local validation layer, i.e. was
    /// raised before any network call was made.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::ValidationError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::ValidationError("bad extension".to_string());
        assert_eq!(err.to_string(), "Validation error: bad extension");

        let err = CoreError::NotFound("Job not found: abc".to_string());
        assert_eq!(err.to_string(), "Not found: Job not found: abc");
    }

    #[test]
    fn test_is_validation() {
        assert!(CoreError::ValidationError("x".to_string()).is_validation());
        assert!(!CoreError::Upstream("x".to_string()).is_validation());
    }

    #[test]
    fn test_ipc_error_matches_display() {
        let err = CoreError::Upstream("gateway returned 502".to_string());
        assert_eq!(err.to_ipc_error(), err.to_string());
    }
}
