//! Periodic leave accrual.
//!
//! This module computes how much balance an entitlement has earned since it
//! was last brought up to date:
//! - Whole-month and whole-year accrual deltas with remainder carry
//! - Half-day rounding rules applied to the cumulative accrued figure
//!
//! The engine is pure: applying its outcome to the ledger is the
//! entitlement module's job.

pub mod engine;
pub mod rounding;

#[cfg(test)]
mod engine_props;

pub use engine::{AccrualEngine, AccrualOutcome};
pub use rounding::round_days;
