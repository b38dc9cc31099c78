//! Ledger error types.

use absentia_shared::AppError;
use absentia_shared::types::LeaveRequestId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::EntitlementKey;

/// Errors that can occur during entitlement ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No entitlement exists for the key.
    #[error("No entitlement found for {key}")]
    EntitlementNotFound {
        /// The (employee, leave type) key.
        key: EntitlementKey,
    },

    /// An entitlement already exists for the key.
    #[error("Entitlement already granted for {key}")]
    AlreadyGranted {
        /// The (employee, leave type) key.
        key: EntitlementKey,
    },

    /// Day quantities must be positive.
    #[error("Requested days must be positive")]
    NonPositiveDays,

    /// A reservation would exceed the available balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Days the caller asked for.
        requested: Decimal,
        /// Days currently available.
        available: Decimal,
    },

    /// No open reservation exists for the request.
    #[error("No open reservation for request {0}")]
    ReservationNotFound(LeaveRequestId),

    /// An open reservation exists but holds a different amount.
    #[error("Reservation for request {request_id} holds {held} days, not {days}")]
    ReservationMismatch {
        /// The request whose reservation was addressed.
        request_id: LeaveRequestId,
        /// Days actually held by the reservation.
        held: Decimal,
        /// Days the caller claimed.
        days: Decimal,
    },

    /// The entitlement slot stayed contended past the retry bound.
    #[error("Entitlement for {key} is contended, please retry")]
    ConcurrencyConflict {
        /// The (employee, leave type) key.
        key: EntitlementKey,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EntitlementNotFound { .. } => "ENTITLEMENT_NOT_FOUND",
            Self::AlreadyGranted { .. } => "ENTITLEMENT_ALREADY_GRANTED",
            Self::NonPositiveDays => "NON_POSITIVE_DAYS",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            Self::ReservationMismatch { .. } => "RESERVATION_MISMATCH",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::EntitlementNotFound { .. } => 404,
            Self::NonPositiveDays => 400,
            Self::InsufficientBalance { .. } => 422,
            Self::AlreadyGranted { .. }
            | Self::ReservationNotFound(_)
            | Self::ReservationMismatch { .. }
            | Self::ConcurrencyConflict { .. } => 409,
        }
    }

    /// Returns true if this error is transient and worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EntitlementNotFound { .. } => Self::NotFound(err.to_string()),
            LedgerError::NonPositiveDays => Self::Validation(err.to_string()),
            LedgerError::InsufficientBalance { .. } => Self::BusinessRule(err.to_string()),
            LedgerError::AlreadyGranted { .. }
            | LedgerError::ReservationNotFound(_)
            | LedgerError::ReservationMismatch { .. }
            | LedgerError::ConcurrencyConflict { .. } => Self::Conflict(err.to_string()),
        }
    }
}
