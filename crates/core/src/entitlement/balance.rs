//! Available-balance calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days available for new reservations.
///
/// `available = (yearly_entitlement + carry_forward + accrued_rounded) - taken - reserved`
#[must_use]
pub fn available(
    yearly_entitlement: Decimal,
    carry_forward: Decimal,
    accrued_rounded: Decimal,
    taken: Decimal,
    reserved: Decimal,
) -> Decimal {
    yearly_entitlement + carry_forward + accrued_rounded - taken - reserved
}

/// Point-in-time view of one entitlement's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Days granted for the period.
    pub yearly_entitlement: Decimal,
    /// Days rolled over from the prior period.
    pub carry_forward: Decimal,
    /// Accumulated, rounded periodic accrual.
    pub accrued_rounded: Decimal,
    /// Days consumed by finalized requests.
    pub taken: Decimal,
    /// Days held by requests awaiting decisions.
    pub reserved: Decimal,
    /// Days available for new reservations.
    pub available: Decimal,
}
