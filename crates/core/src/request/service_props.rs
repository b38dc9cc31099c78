//! Property-based tests for the leave request workflow.
//!
//! Random sequences of decision calls (including replays and out-of-order
//! attempts) must keep the ledger consistent with the request state, and
//! must never deduct or release balance twice.

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use absentia_shared::types::{EmployeeId, LeaveTypeId};

use crate::entitlement::EntitlementLedger;
use crate::policy::{AccrualMethod, InMemoryPolicyStore, LeavePolicy, RoundingRule};
use crate::request::directory::{InMemoryAttachmentStore, InMemoryEmployeeDirectory};
use crate::request::service::LeaveService;
use crate::request::types::{Decision, RequestState, SubmitLeaveRequest};

type TestService =
    LeaveService<InMemoryPolicyStore, InMemoryEmployeeDirectory, InMemoryAttachmentStore>;

#[derive(Debug, Clone, Copy)]
enum Stage {
    Manager,
    Hr,
    Cancel,
}

fn arb_step() -> impl Strategy<Value = (Stage, Decision)> {
    let stage = prop_oneof![Just(Stage::Manager), Just(Stage::Hr), Just(Stage::Cancel)];
    let decision = prop_oneof![Just(Decision::Approve), Just(Decision::Reject)];
    (stage, decision)
}

fn arb_steps() -> impl Strategy<Value = Vec<(Stage, Decision)>> {
    prop::collection::vec(arb_step(), 1..12)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup(yearly: Decimal) -> (TestService, EmployeeId, LeaveTypeId) {
    let employee_id = EmployeeId::new();
    let leave_type_id = LeaveTypeId::new();

    let policies = Arc::new(InMemoryPolicyStore::new());
    policies.upsert(LeavePolicy {
        leave_type_id,
        name: "Annual Leave".to_string(),
        accrual_method: AccrualMethod::None,
        monthly_rate: Decimal::ZERO,
        yearly_rate: Decimal::ZERO,
        carry_forward_allowed: false,
        max_carry_forward: Decimal::ZERO,
        carry_forward_expiry_months: None,
        rounding_rule: RoundingRule::None,
        min_request_days: dec!(1),
        max_consecutive_days: None,
        requires_attachment: false,
    });
    let employees = Arc::new(InMemoryEmployeeDirectory::new());
    employees.add(employee_id);
    let attachments = Arc::new(InMemoryAttachmentStore::new());
    let ledger = Arc::new(EntitlementLedger::new());

    let service = LeaveService::new(policies, employees, attachments, ledger);
    service
        .grant_entitlement(employee_id, leave_type_id, yearly, date(2026, 1, 1))
        .expect("grant");
    (service, employee_id, leave_type_id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After any decision sequence, the ledger matches the request state:
    /// reservation-holding states hold exactly the duration, terminal
    /// rejections hold nothing, and only a final HR approval consumes.
    #[test]
    fn prop_ledger_matches_request_state(steps in arb_steps(), days in 1u32..10) {
        let duration = Decimal::from(days);
        let (service, employee_id, leave_type_id) = setup(dec!(40));

        let request = service
            .submit(SubmitLeaveRequest {
                employee_id,
                leave_type_id,
                from_date: date(2026, 3, 2),
                to_date: date(2026, 3, 13),
                duration_days: duration,
                justification: None,
                attachment_id: None,
            })
            .expect("submit");

        let mut cancelled = false;
        for (stage, decision) in steps {
            let result = match stage {
                Stage::Manager => service
                    .decide_as_manager(request.id, EmployeeId::new(), decision, None)
                    .map(|_| ()),
                Stage::Hr => service
                    .decide_as_hr(request.id, EmployeeId::new(), decision, None)
                    .map(|_| ()),
                Stage::Cancel => service.cancel(request.id),
            };
            if matches!(stage, Stage::Cancel) && result.is_ok() {
                cancelled = true;
            }

            let snapshot = service.get_balance(employee_id, leave_type_id).expect("balance");
            if cancelled {
                prop_assert_eq!(snapshot.reserved, Decimal::ZERO);
                prop_assert_eq!(snapshot.taken, Decimal::ZERO);
                continue;
            }

            let state = service.get_request(request.id).expect("request").state;
            match state {
                RequestState::Pending | RequestState::ManagerApproved => {
                    prop_assert_eq!(snapshot.reserved, duration);
                    prop_assert_eq!(snapshot.taken, Decimal::ZERO);
                }
                RequestState::ManagerRejected | RequestState::HrRejected => {
                    prop_assert_eq!(snapshot.reserved, Decimal::ZERO);
                    prop_assert_eq!(snapshot.taken, Decimal::ZERO);
                }
                RequestState::HrApproved => {
                    prop_assert_eq!(snapshot.reserved, Decimal::ZERO);
                    prop_assert_eq!(snapshot.taken, duration);
                }
            }
        }
    }

    /// A cancelled request stays gone: no later decision can resurrect it
    /// or touch the ledger.
    #[test]
    fn prop_cancelled_requests_stay_cancelled(steps in arb_steps(), days in 1u32..10) {
        let duration = Decimal::from(days);
        let (service, employee_id, leave_type_id) = setup(dec!(40));

        let request = service
            .submit(SubmitLeaveRequest {
                employee_id,
                leave_type_id,
                from_date: date(2026, 3, 2),
                to_date: date(2026, 3, 13),
                duration_days: duration,
                justification: None,
                attachment_id: None,
            })
            .expect("submit");
        service.cancel(request.id).expect("cancel");

        for (stage, decision) in steps {
            let result = match stage {
                Stage::Manager => service
                    .decide_as_manager(request.id, EmployeeId::new(), decision, None)
                    .map(|_| ()),
                Stage::Hr => service
                    .decide_as_hr(request.id, EmployeeId::new(), decision, None)
                    .map(|_| ()),
                Stage::Cancel => service.cancel(request.id),
            };
            prop_assert!(result.is_err());
        }

        let snapshot = service.get_balance(employee_id, leave_type_id).expect("balance");
        prop_assert_eq!(snapshot.available, dec!(40));
    }
}
