//! Leave policy records and resolution.
//!
//! Policies are configuration records owned outside the core; this module
//! defines their shape and the read-only lookup the rest of the core uses:
//! - Policy domain types (accrual method, rounding rule, request limits)
//! - Error types for policy lookups
//! - The `PolicyResolver` trait with in-memory and cached implementations

pub mod error;
pub mod resolver;
pub mod types;

pub use error::PolicyError;
pub use resolver::{CachedPolicyResolver, InMemoryPolicyStore, PolicyResolver};
pub use types::{AccrualMethod, LeavePolicy, RoundingRule};
