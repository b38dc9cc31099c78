//! Leave request lifecycle and approval workflow.
//!
//! This module drives a leave request from submission through the two-stage
//! manager → HR approval chain, invoking the entitlement ledger at the
//! transitions that reserve, commit, or release balance:
//! - Request domain types and the request state machine
//! - Error types for lifecycle operations
//! - Collaborator traits for employee and attachment existence checks
//! - The `LeaveService` facade exposing the external call contracts

pub mod directory;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use directory::{
    AttachmentStore, EmployeeDirectory, InMemoryAttachmentStore, InMemoryEmployeeDirectory,
};
pub use error::RequestError;
pub use service::LeaveService;
pub use types::{
    AmendLeaveRequest, Decision, DecisionRecord, LeaveRequest, RequestFilter, RequestState,
    SubmitLeaveRequest,
};
