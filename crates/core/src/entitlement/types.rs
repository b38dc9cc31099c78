//! Entitlement aggregate.

use std::collections::HashMap;
use std::fmt;

use absentia_shared::types::{EmployeeId, LeaveRequestId, LeaveTypeId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accrual::engine::{AccrualEngine, add_months};
use crate::accrual::round_days;
use crate::policy::LeavePolicy;

use super::balance::{self, BalanceSnapshot};
use super::error::LedgerError;

/// Key of an entitlement: one balance per employee per leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitlementKey {
    /// The employee the balance belongs to.
    pub employee_id: EmployeeId,
    /// The leave type the balance is for.
    pub leave_type_id: LeaveTypeId,
}

impl EntitlementKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(employee_id: EmployeeId, leave_type_id: LeaveTypeId) -> Self {
        Self {
            employee_id,
            leave_type_id,
        }
    }
}

impl fmt::Display for EntitlementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "employee {}, leave type {}", self.employee_id, self.leave_type_id)
    }
}

/// Balance record for one (employee, leave type) pair.
///
/// Fields are private: all mutation goes through the narrow API the ledger
/// drives, so the balance invariant
/// `taken + reserved <= yearly_entitlement + carry_forward + accrued_rounded`
/// can only be affected in one place. Every mutation bumps `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    key: EntitlementKey,
    yearly_entitlement: Decimal,
    carry_forward: Decimal,
    carry_forward_earned_on: Option<NaiveDate>,
    /// Unrounded accrual accumulator; `accrued_rounded` derives from it.
    accrued_raw: Decimal,
    accrued_rounded: Decimal,
    taken: Decimal,
    reserved: Decimal,
    last_accrual_date: NaiveDate,
    last_yearly_accrual_date: NaiveDate,
    next_reset_date: NaiveDate,
    version: u64,
    /// Open reservations by request id; the idempotency record.
    reservations: HashMap<LeaveRequestId, Decimal>,
}

impl Entitlement {
    /// Creates a fresh entitlement with all counters at zero and accrual
    /// anchors at the grant date.
    pub(crate) fn new(key: EntitlementKey, yearly_entitlement: Decimal, granted_on: NaiveDate) -> Self {
        Self {
            key,
            yearly_entitlement,
            carry_forward: Decimal::ZERO,
            carry_forward_earned_on: None,
            accrued_raw: Decimal::ZERO,
            accrued_rounded: Decimal::ZERO,
            taken: Decimal::ZERO,
            reserved: Decimal::ZERO,
            last_accrual_date: granted_on,
            last_yearly_accrual_date: granted_on,
            next_reset_date: add_months(granted_on, 12),
            version: 1,
            reservations: HashMap::new(),
        }
    }

    /// The (employee, leave type) key.
    #[must_use]
    pub fn key(&self) -> EntitlementKey {
        self.key
    }

    /// Days granted for the period.
    #[must_use]
    pub fn yearly_entitlement(&self) -> Decimal {
        self.yearly_entitlement
    }

    /// Days rolled over from the prior period.
    #[must_use]
    pub fn carry_forward(&self) -> Decimal {
        self.carry_forward
    }

    /// Accumulated, rounded periodic accrual.
    #[must_use]
    pub fn accrued_rounded(&self) -> Decimal {
        self.accrued_rounded
    }

    /// Days consumed by finalized requests.
    #[must_use]
    pub fn taken(&self) -> Decimal {
        self.taken
    }

    /// Days held by requests awaiting decisions.
    #[must_use]
    pub fn reserved(&self) -> Decimal {
        self.reserved
    }

    /// Anchor of the monthly accrual component.
    #[must_use]
    pub fn last_accrual_date(&self) -> NaiveDate {
        self.last_accrual_date
    }

    /// Anchor of the yearly accrual component.
    #[must_use]
    pub fn last_yearly_accrual_date(&self) -> NaiveDate {
        self.last_yearly_accrual_date
    }

    /// When the current period ends.
    #[must_use]
    pub fn next_reset_date(&self) -> NaiveDate {
        self.next_reset_date
    }

    /// Monotonically increasing mutation counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Days held by the open reservation for a request, if any.
    #[must_use]
    pub fn open_reservation(&self, request_id: LeaveRequestId) -> Option<Decimal> {
        self.reservations.get(&request_id).copied()
    }

    /// Days available for new reservations.
    #[must_use]
    pub fn available(&self) -> Decimal {
        balance::available(
            self.yearly_entitlement,
            self.carry_forward,
            self.accrued_rounded,
            self.taken,
            self.reserved,
        )
    }

    /// Point-in-time view of the balance.
    #[must_use]
    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            yearly_entitlement: self.yearly_entitlement,
            carry_forward: self.carry_forward,
            accrued_rounded: self.accrued_rounded,
            taken: self.taken,
            reserved: self.reserved,
            available: self.available(),
        }
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    /// Holds `days` against the balance under `request_id`.
    ///
    /// Re-reserving an already-open `request_id` is a no-op success.
    pub(crate) fn reserve(
        &mut self,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<(), LedgerError> {
        if days <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveDays);
        }
        if self.reservations.contains_key(&request_id) {
            return Ok(());
        }

        let available = self.available();
        if days > available {
            return Err(LedgerError::InsufficientBalance {
                requested: days,
                available,
            });
        }

        self.reserved += days;
        self.reservations.insert(request_id, days);
        self.bump();
        Ok(())
    }

    /// Converts the open reservation for `request_id` into consumption.
    pub(crate) fn commit(
        &mut self,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<(), LedgerError> {
        let held = self
            .reservations
            .get(&request_id)
            .copied()
            .ok_or(LedgerError::ReservationNotFound(request_id))?;
        if held != days {
            return Err(LedgerError::ReservationMismatch {
                request_id,
                held,
                days,
            });
        }

        self.reservations.remove(&request_id);
        self.reserved -= days;
        self.taken += days;
        self.bump();
        Ok(())
    }

    /// Cancels the open reservation for `request_id`.
    ///
    /// Returns whether a reservation was actually released; a missing id is
    /// a no-op so rejection retries stay safe.
    pub(crate) fn release(
        &mut self,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<bool, LedgerError> {
        let Some(held) = self.reservations.get(&request_id).copied() else {
            return Ok(false);
        };
        if held != days {
            return Err(LedgerError::ReservationMismatch {
                request_id,
                held,
                days,
            });
        }

        self.reservations.remove(&request_id);
        self.reserved -= days;
        self.bump();
        Ok(true)
    }

    /// Resizes the open reservation for `request_id` to `days`.
    ///
    /// The availability check excludes the amount already held, so growing a
    /// reservation only needs the difference to be free.
    pub(crate) fn adjust(
        &mut self,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<(), LedgerError> {
        if days <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveDays);
        }
        let held = self
            .reservations
            .get(&request_id)
            .copied()
            .ok_or(LedgerError::ReservationNotFound(request_id))?;

        let available_with_held = self.available() + held;
        if days > available_with_held {
            return Err(LedgerError::InsufficientBalance {
                requested: days,
                available: available_with_held,
            });
        }

        self.reserved += days - held;
        self.reservations.insert(request_id, days);
        self.bump();
        Ok(())
    }

    /// Folds an accrual run into the aggregate, returning the raw delta.
    pub(crate) fn apply_accrual(&mut self, policy: &LeavePolicy, as_of: NaiveDate) -> Decimal {
        let outcome = AccrualEngine::compute_accrual(self, policy, as_of);

        let anchors_moved = outcome.new_last_accrual_date != self.last_accrual_date
            || outcome.new_last_yearly_accrual_date != self.last_yearly_accrual_date;
        if !anchors_moved && outcome.delta == Decimal::ZERO {
            return Decimal::ZERO;
        }

        self.accrued_raw += outcome.delta;
        self.accrued_rounded = round_days(self.accrued_raw, policy.rounding_rule);
        self.last_accrual_date = outcome.new_last_accrual_date;
        self.last_yearly_accrual_date = outcome.new_last_yearly_accrual_date;
        self.bump();
        outcome.delta
    }

    /// Closes the period: consumption resets, unconsumed balance rolls over
    /// subject to the policy cap and expiry, accrual starts fresh.
    ///
    /// Open reservations are left untouched; requests in flight at the
    /// boundary keep their hold in the new period.
    pub(crate) fn reset_period(&mut self, policy: &LeavePolicy, as_of_period_end: NaiveDate) {
        // A carried balance from an earlier period may have expired by now.
        if let (Some(expiry_months), Some(earned_on)) =
            (policy.carry_forward_expiry_months, self.carry_forward_earned_on)
            && add_months(earned_on, expiry_months) <= as_of_period_end
        {
            self.carry_forward = Decimal::ZERO;
        }

        let remaining = (self.yearly_entitlement + self.carry_forward + self.accrued_rounded
            - self.taken)
            .max(Decimal::ZERO);

        self.carry_forward = if policy.carry_forward_allowed {
            remaining.min(policy.max_carry_forward)
        } else {
            Decimal::ZERO
        };
        self.carry_forward_earned_on = Some(as_of_period_end);

        self.taken = Decimal::ZERO;
        self.accrued_raw = Decimal::ZERO;
        self.accrued_rounded = Decimal::ZERO;
        self.last_accrual_date = as_of_period_end;
        self.last_yearly_accrual_date = as_of_period_end;
        self.next_reset_date = add_months(as_of_period_end, 12);
        self.bump();
    }
}
