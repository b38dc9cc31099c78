//! Policy error types.

use absentia_shared::AppError;
use absentia_shared::types::LeaveTypeId;
use thiserror::Error;

/// Errors that can occur during policy resolution.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// No policy is configured for the leave type.
    #[error("No leave policy configured for leave type {0}")]
    NotFound(LeaveTypeId),
}

impl PolicyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "POLICY_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
        }
    }
}

impl From<PolicyError> for AppError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::NotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}
