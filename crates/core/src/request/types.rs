//! Leave request domain types.

use std::fmt;

use absentia_shared::types::{AttachmentId, EmployeeId, LeaveRequestId, LeaveTypeId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entitlement::EntitlementKey;

/// Request state in the two-stage approval workflow.
///
/// The valid transitions are:
/// - Pending → ManagerApproved (manager approve)
/// - Pending → ManagerRejected (manager reject)
/// - ManagerApproved → HrApproved (HR approve)
/// - ManagerApproved → HrRejected (HR reject)
///
/// `ManagerRejected`, `HrApproved`, and `HrRejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Submitted, awaiting the manager decision. Balance is reserved.
    Pending,
    /// Manager approved, awaiting the HR decision. Balance stays reserved.
    ManagerApproved,
    /// Manager rejected. Balance released (terminal).
    ManagerRejected,
    /// HR approved after manager approval. Balance committed (terminal).
    HrApproved,
    /// HR rejected after manager approval. Balance released (terminal).
    HrRejected,
}

impl RequestState {
    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ManagerApproved => "manager_approved",
            Self::ManagerRejected => "manager_rejected",
            Self::HrApproved => "hr_approved",
            Self::HrRejected => "hr_rejected",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "manager_approved" => Some(Self::ManagerApproved),
            "manager_rejected" => Some(Self::ManagerRejected),
            "hr_approved" => Some(Self::HrApproved),
            "hr_rejected" => Some(Self::HrRejected),
            _ => None,
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ManagerRejected | Self::HrApproved | Self::HrRejected)
    }

    /// Returns true if the request still holds a reservation.
    #[must_use]
    pub fn holds_reservation(&self) -> bool {
        matches!(self, Self::Pending | Self::ManagerApproved)
    }

    /// Returns true if the transition is one the workflow permits.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::ManagerApproved | Self::ManagerRejected)
                | (Self::ManagerApproved, Self::HrApproved | Self::HrRejected)
        )
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decision on a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Approve the request at the caller's stage.
    Approve,
    /// Reject the request at the caller's stage.
    Reject,
}

impl Decision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit record of a decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Who decided.
    pub decided_by: EmployeeId,
    /// The decision taken.
    pub decision: Decision,
    /// Optional comment from the decider.
    pub comment: Option<String>,
    /// When the decision was recorded.
    pub decided_at: DateTime<Utc>,
}

/// A leave request.
///
/// Created by submission, mutated only through lifecycle transitions, and
/// immutable once in a terminal state. The ledger never sees this type;
/// ledger calls carry only the key, the duration, and the request id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier; also the ledger idempotency key.
    pub id: LeaveRequestId,
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// The leave type requested.
    pub leave_type_id: LeaveTypeId,
    /// First day of leave.
    pub from_date: NaiveDate,
    /// Last day of leave.
    pub to_date: NaiveDate,
    /// Working days requested.
    pub duration_days: Decimal,
    /// Optional justification text.
    pub justification: Option<String>,
    /// Optional supporting attachment.
    pub attachment_id: Option<AttachmentId>,
    /// Current workflow state.
    pub state: RequestState,
    /// Manager decision, once taken.
    pub manager_decision: Option<DecisionRecord>,
    /// HR decision, once taken.
    pub hr_decision: Option<DecisionRecord>,
    /// When the request was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// The entitlement this request draws on.
    #[must_use]
    pub fn entitlement_key(&self) -> EntitlementKey {
        EntitlementKey::new(self.employee_id, self.leave_type_id)
    }
}

/// Input for submitting a leave request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeaveRequest {
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// The leave type requested.
    pub leave_type_id: LeaveTypeId,
    /// First day of leave.
    pub from_date: NaiveDate,
    /// Last day of leave.
    pub to_date: NaiveDate,
    /// Working days requested.
    pub duration_days: Decimal,
    /// Optional justification text.
    pub justification: Option<String>,
    /// Optional supporting attachment.
    pub attachment_id: Option<AttachmentId>,
}

/// Input for amending a pending leave request.
///
/// Dates and duration always replace the current values; justification and
/// attachment are only replaced when given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmendLeaveRequest {
    /// New first day of leave.
    pub from_date: NaiveDate,
    /// New last day of leave.
    pub to_date: NaiveDate,
    /// New working-day duration.
    pub duration_days: Decimal,
    /// Replacement justification, if any.
    pub justification: Option<String>,
    /// Replacement attachment, if any.
    pub attachment_id: Option<AttachmentId>,
}

/// Filter for listing leave requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestFilter {
    /// Only requests from this employee.
    pub employee_id: Option<EmployeeId>,
    /// Only requests for this leave type.
    pub leave_type_id: Option<LeaveTypeId>,
    /// Only requests in this state.
    pub state: Option<RequestState>,
}

impl RequestFilter {
    /// Returns true if the request passes the filter.
    #[must_use]
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.employee_id.is_none_or(|id| request.employee_id == id)
            && self.leave_type_id.is_none_or(|id| request.leave_type_id == id)
            && self.state.is_none_or(|state| request.state == state)
    }
}
