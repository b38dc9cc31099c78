//! Request lifecycle error types.

use absentia_shared::AppError;
use absentia_shared::types::{AttachmentId, EmployeeId, LeaveRequestId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::entitlement::LedgerError;
use crate::policy::PolicyError;

use super::types::RequestState;

/// Errors that can occur during leave request operations.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No request exists with the id.
    #[error("Leave request {0} not found")]
    NotFound(LeaveRequestId),

    /// The decision is not legal from the request's current state.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// The request's current state.
        from: RequestState,
        /// The state the decision would have produced.
        to: RequestState,
    },

    /// Only pending requests can be amended or cancelled.
    #[error("Leave request in state {state} can no longer be modified")]
    NotPending {
        /// The request's current state.
        state: RequestState,
    },

    /// The employee is unknown.
    #[error("Employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    /// The referenced attachment does not exist.
    #[error("Attachment {0} not found")]
    AttachmentNotFound(AttachmentId),

    /// The policy requires an attachment and none was supplied.
    #[error("A supporting attachment is required for this leave type")]
    AttachmentRequired,

    /// The date range is inverted.
    #[error("from_date {from} is after to_date {to}")]
    InvalidDateRange {
        /// First day of leave.
        from: NaiveDate,
        /// Last day of leave.
        to: NaiveDate,
    },

    /// The duration must be positive.
    #[error("Duration must be positive")]
    NonPositiveDuration,

    /// The duration is below the policy minimum.
    #[error("Requested {requested} days is below the minimum of {minimum}")]
    DurationBelowMinimum {
        /// Days requested.
        requested: Decimal,
        /// Policy minimum.
        minimum: Decimal,
    },

    /// The duration exceeds the policy's consecutive-day cap.
    #[error("Requested {requested} days exceeds the maximum of {maximum} consecutive days")]
    ExceedsMaxConsecutive {
        /// Days requested.
        requested: Decimal,
        /// Policy maximum.
        maximum: Decimal,
    },

    /// Policy resolution failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl RequestError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "REQUEST_NOT_FOUND",
            Self::InvalidTransition { .. } | Self::NotPending { .. } => "INVALID_STATE_TRANSITION",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::AttachmentNotFound(_) => "ATTACHMENT_NOT_FOUND",
            Self::AttachmentRequired => "ATTACHMENT_REQUIRED",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::NonPositiveDuration => "NON_POSITIVE_DURATION",
            Self::DurationBelowMinimum { .. } => "DURATION_BELOW_MINIMUM",
            Self::ExceedsMaxConsecutive { .. } => "EXCEEDS_MAX_CONSECUTIVE_DAYS",
            Self::Policy(inner) => inner.error_code(),
            Self::Ledger(inner) => inner.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::EmployeeNotFound(_) | Self::AttachmentNotFound(_) => 404,
            Self::InvalidTransition { .. } | Self::NotPending { .. } => 409,
            Self::AttachmentRequired
            | Self::InvalidDateRange { .. }
            | Self::NonPositiveDuration
            | Self::DurationBelowMinimum { .. }
            | Self::ExceedsMaxConsecutive { .. } => 400,
            Self::Policy(inner) => inner.http_status_code(),
            Self::Ledger(inner) => inner.http_status_code(),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound(_)
            | RequestError::EmployeeNotFound(_)
            | RequestError::AttachmentNotFound(_) => Self::NotFound(err.to_string()),
            RequestError::InvalidTransition { .. } | RequestError::NotPending { .. } => {
                Self::Conflict(err.to_string())
            }
            RequestError::AttachmentRequired
            | RequestError::InvalidDateRange { .. }
            | RequestError::NonPositiveDuration
            | RequestError::DurationBelowMinimum { .. }
            | RequestError::ExceedsMaxConsecutive { .. } => Self::Validation(err.to_string()),
            RequestError::Policy(inner) => inner.into(),
            RequestError::Ledger(inner) => inner.into(),
        }
    }
}
