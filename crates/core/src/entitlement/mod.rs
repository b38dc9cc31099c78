//! Per-employee leave balance ledger.
//!
//! This module implements the core balance bookkeeping:
//! - The `Entitlement` aggregate (one balance per employee per leave type)
//! - Pure available-balance calculation
//! - The `EntitlementLedger` store with atomic, per-key-serialized
//!   reserve/commit/release/adjust/accrual/reset operations
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use balance::{BalanceSnapshot, available};
pub use error::LedgerError;
pub use ledger::EntitlementLedger;
pub use types::{Entitlement, EntitlementKey};
