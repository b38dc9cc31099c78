//! Entitlement ledger store.

use absentia_shared::config::LedgerConfig;
use absentia_shared::types::LeaveRequestId;
use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::try_result::TryResult;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::policy::LeavePolicy;

use super::balance::BalanceSnapshot;
use super::error::LedgerError;
use super::types::{Entitlement, EntitlementKey};

/// Concurrent store of entitlements with atomic balance operations.
///
/// Mutations for one (employee, leave type) key serialize on the key's map
/// slot; operations on different keys proceed independently. Slot
/// acquisition is bounded: a slot that stays contended past the configured
/// retry count surfaces as a transient [`LedgerError::ConcurrencyConflict`].
///
/// The check-then-act pair (available vs. reserve) always runs inside the
/// slot, never across two acquisitions.
#[derive(Debug)]
pub struct EntitlementLedger {
    entitlements: DashMap<EntitlementKey, Entitlement>,
    max_slot_retries: u32,
}

impl EntitlementLedger {
    /// Creates a ledger with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&LedgerConfig::default())
    }

    /// Creates a ledger from configuration.
    #[must_use]
    pub fn with_config(config: &LedgerConfig) -> Self {
        Self {
            entitlements: DashMap::new(),
            max_slot_retries: config.max_slot_retries.max(1),
        }
    }

    /// Creates the entitlement for a key on first assignment.
    pub fn grant(
        &self,
        key: EntitlementKey,
        yearly_entitlement: Decimal,
        granted_on: NaiveDate,
    ) -> Result<BalanceSnapshot, LedgerError> {
        if yearly_entitlement < Decimal::ZERO {
            return Err(LedgerError::NonPositiveDays);
        }

        match self.entitlements.entry(key) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyGranted { key }),
            Entry::Vacant(slot) => {
                let entitlement = Entitlement::new(key, yearly_entitlement, granted_on);
                let snapshot = entitlement.snapshot();
                slot.insert(entitlement);
                info!(%key, %yearly_entitlement, %granted_on, "entitlement granted");
                Ok(snapshot)
            }
        }
    }

    /// Days available for new reservations.
    ///
    /// A plain read: fine for display, but reservation decisions happen
    /// inside [`reserve`](Self::reserve) itself.
    pub fn available(&self, key: EntitlementKey) -> Result<Decimal, LedgerError> {
        self.entitlements
            .get(&key)
            .map(|entitlement| entitlement.available())
            .ok_or(LedgerError::EntitlementNotFound { key })
    }

    /// Point-in-time view of the balance.
    pub fn balance(&self, key: EntitlementKey) -> Result<BalanceSnapshot, LedgerError> {
        self.entitlements
            .get(&key)
            .map(|entitlement| entitlement.snapshot())
            .ok_or(LedgerError::EntitlementNotFound { key })
    }

    /// Holds `days` against the balance under `request_id`.
    pub fn reserve(
        &self,
        key: EntitlementKey,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let snapshot = self.with_entitlement(key, |entitlement| {
            entitlement.reserve(days, request_id)?;
            Ok(entitlement.snapshot())
        })?;
        info!(%key, %days, %request_id, reserved = %snapshot.reserved, "balance reserved");
        Ok(snapshot)
    }

    /// Converts the reservation for `request_id` into consumption.
    pub fn commit(
        &self,
        key: EntitlementKey,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let snapshot = self.with_entitlement(key, |entitlement| {
            entitlement.commit(days, request_id)?;
            Ok(entitlement.snapshot())
        })?;
        info!(%key, %days, %request_id, taken = %snapshot.taken, "reservation committed");
        Ok(snapshot)
    }

    /// Cancels the reservation for `request_id`. Idempotent per id.
    pub fn release(
        &self,
        key: EntitlementKey,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let (released, snapshot) = self.with_entitlement(key, |entitlement| {
            let released = entitlement.release(days, request_id)?;
            Ok((released, entitlement.snapshot()))
        })?;
        if released {
            info!(%key, %days, %request_id, "reservation released");
        } else {
            debug!(%key, %request_id, "release replay ignored");
        }
        Ok(snapshot)
    }

    /// Resizes the open reservation for `request_id` to `days`.
    pub fn adjust(
        &self,
        key: EntitlementKey,
        days: Decimal,
        request_id: LeaveRequestId,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let snapshot = self.with_entitlement(key, |entitlement| {
            entitlement.adjust(days, request_id)?;
            Ok(entitlement.snapshot())
        })?;
        info!(%key, %days, %request_id, reserved = %snapshot.reserved, "reservation adjusted");
        Ok(snapshot)
    }

    /// Brings the accrued balance up to date per the policy.
    pub fn run_accrual(
        &self,
        key: EntitlementKey,
        policy: &LeavePolicy,
        as_of: NaiveDate,
    ) -> Result<Entitlement, LedgerError> {
        let (delta, entitlement) = self.with_entitlement(key, |entitlement| {
            let delta = entitlement.apply_accrual(policy, as_of);
            Ok((delta, entitlement.clone()))
        })?;
        if delta > Decimal::ZERO {
            info!(%key, %as_of, %delta, accrued = %entitlement.accrued_rounded(), "accrual applied");
        } else {
            debug!(%key, %as_of, "accrual up to date");
        }
        Ok(entitlement)
    }

    /// Closes the period ending at `as_of_period_end` and rolls the balance
    /// into the next one.
    pub fn reset_period(
        &self,
        key: EntitlementKey,
        policy: &LeavePolicy,
        as_of_period_end: NaiveDate,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let snapshot = self.with_entitlement(key, |entitlement| {
            if entitlement.reserved() > Decimal::ZERO {
                warn!(
                    %key,
                    reserved = %entitlement.reserved(),
                    "period reset with open reservations; carrying them into the new period"
                );
            }
            entitlement.reset_period(policy, as_of_period_end);
            Ok(entitlement.snapshot())
        })?;
        info!(
            %key,
            %as_of_period_end,
            carry_forward = %snapshot.carry_forward,
            "period reset"
        );
        Ok(snapshot)
    }

    /// Runs `f` with exclusive access to the key's entitlement.
    ///
    /// Acquisition spins with bounded retries rather than blocking, so a
    /// slot held by a stuck reader cannot wedge every writer behind it.
    fn with_entitlement<T>(
        &self,
        key: EntitlementKey,
        f: impl FnOnce(&mut Entitlement) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        for _ in 0..self.max_slot_retries {
            match self.entitlements.try_get_mut(&key) {
                TryResult::Present(mut entitlement) => return f(&mut entitlement),
                TryResult::Absent => return Err(LedgerError::EntitlementNotFound { key }),
                TryResult::Locked => std::thread::yield_now(),
            }
        }
        warn!(%key, retries = self.max_slot_retries, "entitlement slot contended, giving up");
        Err(LedgerError::ConcurrencyConflict { key })
    }
}

impl Default for EntitlementLedger {
    fn default() -> Self {
        Self::new()
    }
}
