//! Property-based tests for the entitlement ledger.
//!
//! The central invariant: no sequence of reserve/commit/release/adjust
//! operations can push consumption past the granted balance, and no counter
//! ever goes negative.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use absentia_shared::types::{EmployeeId, LeaveRequestId, LeaveTypeId};

use super::error::LedgerError;
use super::ledger::EntitlementLedger;
use super::types::EntitlementKey;

/// Fixed pool of request ids so operations can collide on purpose.
const ID_POOL: usize = 8;

fn request_id(slot: usize) -> LeaveRequestId {
    LeaveRequestId::from_uuid(Uuid::from_u128(slot as u128 + 1))
}

#[derive(Debug, Clone)]
enum Op {
    Reserve { slot: usize, days: u32 },
    Commit { slot: usize, days: u32 },
    Release { slot: usize, days: u32 },
    Adjust { slot: usize, days: u32 },
}

fn arb_op() -> impl Strategy<Value = Op> {
    let slot = 0..ID_POOL;
    let days = 1u32..10;
    prop_oneof![
        (slot.clone(), days.clone()).prop_map(|(slot, days)| Op::Reserve { slot, days }),
        (slot.clone(), days.clone()).prop_map(|(slot, days)| Op::Commit { slot, days }),
        (slot.clone(), days.clone()).prop_map(|(slot, days)| Op::Release { slot, days }),
        (slot, days).prop_map(|(slot, days)| Op::Adjust { slot, days }),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 1..60)
}

fn setup(yearly: u32) -> (EntitlementLedger, EntitlementKey) {
    let ledger = EntitlementLedger::new();
    let key = EntitlementKey::new(EmployeeId::new(), LeaveTypeId::new());
    let granted_on = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    ledger
        .grant(key, Decimal::from(yearly), granted_on)
        .expect("grant");
    (ledger, key)
}

fn apply(ledger: &EntitlementLedger, key: EntitlementKey, op: &Op) -> Result<(), LedgerError> {
    match *op {
        Op::Reserve { slot, days } => ledger
            .reserve(key, Decimal::from(days), request_id(slot))
            .map(|_| ()),
        Op::Commit { slot, days } => ledger
            .commit(key, Decimal::from(days), request_id(slot))
            .map(|_| ()),
        Op::Release { slot, days } => ledger
            .release(key, Decimal::from(days), request_id(slot))
            .map(|_| ()),
        Op::Adjust { slot, days } => ledger
            .adjust(key, Decimal::from(days), request_id(slot))
            .map(|_| ()),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance invariant holds after every operation, successful or not.
    #[test]
    fn prop_no_overcommitment(yearly in 0u32..40, ops in arb_ops()) {
        let (ledger, key) = setup(yearly);
        let total = Decimal::from(yearly);

        for op in &ops {
            let _ = apply(&ledger, key, op);

            let snapshot = ledger.balance(key).expect("balance");
            prop_assert!(snapshot.taken >= Decimal::ZERO);
            prop_assert!(snapshot.reserved >= Decimal::ZERO);
            prop_assert!(
                snapshot.taken + snapshot.reserved <= total,
                "taken {} + reserved {} exceeded total {}",
                snapshot.taken,
                snapshot.reserved,
                total
            );
            prop_assert_eq!(
                snapshot.available,
                total - snapshot.taken - snapshot.reserved
            );
        }
    }

    /// Failed operations leave the balance exactly as it was.
    #[test]
    fn prop_failures_have_no_effect(yearly in 0u32..40, ops in arb_ops()) {
        let (ledger, key) = setup(yearly);

        for op in &ops {
            let before = ledger.balance(key).expect("balance");
            let result = apply(&ledger, key, op);
            let after = ledger.balance(key).expect("balance");

            if result.is_err() {
                prop_assert_eq!(before, after);
            }
        }
    }

    /// Replaying a successful reserve with the same id and amount never
    /// deducts twice.
    #[test]
    fn prop_reserve_replay_safe(yearly in 1u32..40, slot in 0..ID_POOL, days in 1u32..10) {
        let (ledger, key) = setup(yearly);
        let id = request_id(slot);

        if let Ok(first) = ledger.reserve(key, Decimal::from(days), id) {
            let replay = ledger.reserve(key, Decimal::from(days), id).expect("replay");
            prop_assert_eq!(first, replay);
        }
    }

    /// Committing after a successful reserve always succeeds exactly once.
    #[test]
    fn prop_commit_consumes_reservation(yearly in 1u32..40, slot in 0..ID_POOL, days in 1u32..10) {
        let (ledger, key) = setup(yearly);
        let id = request_id(slot);

        if ledger.reserve(key, Decimal::from(days), id).is_ok() {
            let snapshot = ledger.commit(key, Decimal::from(days), id).expect("commit");
            prop_assert_eq!(snapshot.taken, Decimal::from(days));
            prop_assert_eq!(snapshot.reserved, Decimal::ZERO);

            // The second commit is loud, not a silent double deduction
            let replay = ledger.commit(key, Decimal::from(days), id);
            prop_assert!(matches!(replay, Err(LedgerError::ReservationNotFound(_))));
            let after = ledger.balance(key).expect("balance");
            prop_assert_eq!(after.taken, Decimal::from(days));
        }
    }
}
