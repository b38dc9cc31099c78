//! Leave request workflow service.
//!
//! `LeaveService` owns the request store and drives every lifecycle
//! transition, calling the entitlement ledger at exactly the points where
//! balance changes hands: reserve on submit, release on any rejection or
//! cancellation, commit only on the final HR approval.

use std::sync::Arc;

use absentia_shared::types::pagination::{PageRequest, PageResponse};
use absentia_shared::types::{AttachmentId, EmployeeId, LeaveRequestId, LeaveTypeId};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;

use crate::entitlement::{BalanceSnapshot, Entitlement, EntitlementKey, EntitlementLedger};
use crate::policy::{LeavePolicy, PolicyResolver};

use super::directory::{AttachmentStore, EmployeeDirectory};
use super::error::RequestError;
use super::types::{
    AmendLeaveRequest, Decision, DecisionRecord, LeaveRequest, RequestFilter, RequestState,
    SubmitLeaveRequest,
};

/// Facade over the leave request lifecycle and the entitlement ledger.
///
/// Request transitions are single-writer per request id (the store entry is
/// held for the whole transition), and every transition is idempotent:
/// replaying a decision already on record is a no-op, never a second ledger
/// effect.
pub struct LeaveService<P, E, A> {
    policies: Arc<P>,
    employees: Arc<E>,
    attachments: Arc<A>,
    ledger: Arc<EntitlementLedger>,
    requests: DashMap<LeaveRequestId, LeaveRequest>,
}

impl<P, E, A> LeaveService<P, E, A>
where
    P: PolicyResolver,
    E: EmployeeDirectory,
    A: AttachmentStore,
{
    /// Creates a service over the given collaborators and ledger.
    #[must_use]
    pub fn new(
        policies: Arc<P>,
        employees: Arc<E>,
        attachments: Arc<A>,
        ledger: Arc<EntitlementLedger>,
    ) -> Self {
        Self {
            policies,
            employees,
            attachments,
            ledger,
            requests: DashMap::new(),
        }
    }

    /// Submits a new leave request, reserving its duration in the ledger.
    ///
    /// No request is created when validation or the reservation fails.
    pub fn submit(&self, input: SubmitLeaveRequest) -> Result<LeaveRequest, RequestError> {
        if !self.employees.employee_exists(input.employee_id) {
            return Err(RequestError::EmployeeNotFound(input.employee_id));
        }
        let policy = self.policies.resolve(input.leave_type_id)?;
        validate_duration(&policy, input.from_date, input.to_date, input.duration_days)?;
        self.validate_attachment(&policy, input.attachment_id)?;

        let request_id = LeaveRequestId::new();
        let key = EntitlementKey::new(input.employee_id, input.leave_type_id);
        self.ledger.reserve(key, input.duration_days, request_id)?;

        let request = LeaveRequest {
            id: request_id,
            employee_id: input.employee_id,
            leave_type_id: input.leave_type_id,
            from_date: input.from_date,
            to_date: input.to_date,
            duration_days: input.duration_days,
            justification: input.justification,
            attachment_id: input.attachment_id,
            state: RequestState::Pending,
            manager_decision: None,
            hr_decision: None,
            submitted_at: Utc::now(),
        };
        self.requests.insert(request_id, request.clone());
        info!(
            %request_id,
            employee = %request.employee_id,
            days = %request.duration_days,
            "leave request submitted"
        );
        Ok(request)
    }

    /// Records the manager decision on a pending request.
    ///
    /// Rejection releases the reservation; approval keeps the balance
    /// reserved until HR signs off.
    pub fn decide_as_manager(
        &self,
        request_id: LeaveRequestId,
        approver_id: EmployeeId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<LeaveRequest, RequestError> {
        let mut entry = self
            .requests
            .get_mut(&request_id)
            .ok_or(RequestError::NotFound(request_id))?;
        let request = entry.value_mut();
        let target = match decision {
            Decision::Approve => RequestState::ManagerApproved,
            Decision::Reject => RequestState::ManagerRejected,
        };

        if request.state != RequestState::Pending {
            if let Some(previous) = &request.manager_decision
                && previous.decision == decision
            {
                return Ok(request.clone());
            }
            return Err(RequestError::InvalidTransition {
                from: request.state,
                to: target,
            });
        }

        if decision == Decision::Reject {
            self.ledger
                .release(request.entitlement_key(), request.duration_days, request_id)?;
        }

        request.state = target;
        request.manager_decision = Some(DecisionRecord {
            decided_by: approver_id,
            decision,
            comment,
            decided_at: Utc::now(),
        });
        info!(%request_id, %decision, state = %request.state, "manager decision recorded");
        Ok(request.clone())
    }

    /// Records the HR decision on a manager-approved request.
    ///
    /// Approval commits the reservation into consumption; rejection releases
    /// it, restoring the balance a manager approval had kept on hold.
    pub fn decide_as_hr(
        &self,
        request_id: LeaveRequestId,
        reviewer_id: EmployeeId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<LeaveRequest, RequestError> {
        let mut entry = self
            .requests
            .get_mut(&request_id)
            .ok_or(RequestError::NotFound(request_id))?;
        let request = entry.value_mut();
        let target = match decision {
            Decision::Approve => RequestState::HrApproved,
            Decision::Reject => RequestState::HrRejected,
        };

        if request.state != RequestState::ManagerApproved {
            if let Some(previous) = &request.hr_decision
                && previous.decision == decision
            {
                return Ok(request.clone());
            }
            return Err(RequestError::InvalidTransition {
                from: request.state,
                to: target,
            });
        }

        let key = request.entitlement_key();
        match decision {
            Decision::Approve => {
                self.ledger.commit(key, request.duration_days, request_id)?;
            }
            Decision::Reject => {
                self.ledger.release(key, request.duration_days, request_id)?;
            }
        }

        request.state = target;
        request.hr_decision = Some(DecisionRecord {
            decided_by: reviewer_id,
            decision,
            comment,
            decided_at: Utc::now(),
        });
        info!(%request_id, %decision, state = %request.state, "HR decision recorded");
        Ok(request.clone())
    }

    /// Amends a pending request, atomically resizing its reservation.
    ///
    /// A failed resize leaves both the request and the ledger unchanged.
    pub fn amend(
        &self,
        request_id: LeaveRequestId,
        changes: AmendLeaveRequest,
    ) -> Result<LeaveRequest, RequestError> {
        let mut entry = self
            .requests
            .get_mut(&request_id)
            .ok_or(RequestError::NotFound(request_id))?;
        let request = entry.value_mut();
        if request.state != RequestState::Pending {
            return Err(RequestError::NotPending {
                state: request.state,
            });
        }

        let policy = self.policies.resolve(request.leave_type_id)?;
        validate_duration(
            &policy,
            changes.from_date,
            changes.to_date,
            changes.duration_days,
        )?;
        let effective_attachment = changes.attachment_id.or(request.attachment_id);
        self.validate_attachment(&policy, effective_attachment)?;

        self.ledger
            .adjust(request.entitlement_key(), changes.duration_days, request_id)?;

        request.from_date = changes.from_date;
        request.to_date = changes.to_date;
        request.duration_days = changes.duration_days;
        if let Some(justification) = changes.justification {
            request.justification = Some(justification);
        }
        if let Some(attachment_id) = changes.attachment_id {
            request.attachment_id = Some(attachment_id);
        }
        info!(%request_id, days = %request.duration_days, "leave request amended");
        Ok(request.clone())
    }

    /// Cancels a pending request, releasing its reservation and removing it
    /// from further decisions.
    pub fn cancel(&self, request_id: LeaveRequestId) -> Result<(), RequestError> {
        let removed = self
            .requests
            .remove_if(&request_id, |_, request| {
                request.state == RequestState::Pending
            });

        if let Some((_, request)) = removed {
            if let Err(err) =
                self.ledger
                    .release(request.entitlement_key(), request.duration_days, request_id)
            {
                // Put the request back so a transient conflict can be retried
                self.requests.insert(request_id, request);
                return Err(err.into());
            }
            info!(%request_id, "leave request cancelled");
            return Ok(());
        }

        match self.requests.get(&request_id) {
            Some(request) => Err(RequestError::NotPending {
                state: request.state,
            }),
            None => Err(RequestError::NotFound(request_id)),
        }
    }

    /// Fetches a request by id.
    pub fn get_request(&self, request_id: LeaveRequestId) -> Result<LeaveRequest, RequestError> {
        self.requests
            .get(&request_id)
            .map(|request| request.clone())
            .ok_or(RequestError::NotFound(request_id))
    }

    /// Lists requests matching the filter, newest first.
    #[must_use]
    pub fn list_requests(
        &self,
        filter: &RequestFilter,
        page: &PageRequest,
    ) -> PageResponse<LeaveRequest> {
        let mut matching: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|request| filter.matches(request))
            .map(|request| request.clone())
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.0.cmp(&a.id.0)));

        let total = matching.len() as u64;
        let data: Vec<LeaveRequest> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect();
        PageResponse::new(data, page, total)
    }

    /// Current balance for an employee and leave type.
    pub fn get_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
    ) -> Result<BalanceSnapshot, RequestError> {
        let key = EntitlementKey::new(employee_id, leave_type_id);
        Ok(self.ledger.balance(key)?)
    }

    /// Creates the entitlement for an employee and leave type.
    pub fn grant_entitlement(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        yearly_entitlement: Decimal,
        granted_on: NaiveDate,
    ) -> Result<BalanceSnapshot, RequestError> {
        if !self.employees.employee_exists(employee_id) {
            return Err(RequestError::EmployeeNotFound(employee_id));
        }
        let key = EntitlementKey::new(employee_id, leave_type_id);
        Ok(self.ledger.grant(key, yearly_entitlement, granted_on)?)
    }

    /// Brings the accrued balance up to date. Scheduler-invoked; balance
    /// reads never accrue as a side effect.
    pub fn run_accrual(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        as_of: NaiveDate,
    ) -> Result<Entitlement, RequestError> {
        let policy = self.policies.resolve(leave_type_id)?;
        let key = EntitlementKey::new(employee_id, leave_type_id);
        Ok(self.ledger.run_accrual(key, &policy, as_of)?)
    }

    /// Closes the entitlement period ending at `as_of_period_end`.
    /// Scheduler-invoked.
    pub fn reset_period(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        as_of_period_end: NaiveDate,
    ) -> Result<BalanceSnapshot, RequestError> {
        let policy = self.policies.resolve(leave_type_id)?;
        let key = EntitlementKey::new(employee_id, leave_type_id);
        Ok(self.ledger.reset_period(key, &policy, as_of_period_end)?)
    }

    fn validate_attachment(
        &self,
        policy: &LeavePolicy,
        attachment_id: Option<AttachmentId>,
    ) -> Result<(), RequestError> {
        match attachment_id {
            Some(id) if !self.attachments.attachment_exists(id) => {
                Err(RequestError::AttachmentNotFound(id))
            }
            Some(_) => Ok(()),
            None if policy.requires_attachment => Err(RequestError::AttachmentRequired),
            None => Ok(()),
        }
    }
}

fn validate_duration(
    policy: &LeavePolicy,
    from_date: NaiveDate,
    to_date: NaiveDate,
    duration_days: Decimal,
) -> Result<(), RequestError> {
    if from_date > to_date {
        return Err(RequestError::InvalidDateRange {
            from: from_date,
            to: to_date,
        });
    }
    if duration_days <= Decimal::ZERO {
        return Err(RequestError::NonPositiveDuration);
    }
    if duration_days < policy.min_request_days {
        return Err(RequestError::DurationBelowMinimum {
            requested: duration_days,
            minimum: policy.min_request_days,
        });
    }
    if let Some(maximum) = policy.max_consecutive_days
        && duration_days > maximum
    {
        return Err(RequestError::ExceedsMaxConsecutive {
            requested: duration_days,
            maximum,
        });
    }
    Ok(())
}
