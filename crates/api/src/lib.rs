// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the staff allocation planner.
//!
//! Callers pass an externally decided `PermissionGate` with every request.
//! Responses are serde DTOs; failures are `ApiError`s with a stable category.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod capabilities;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use capabilities::{Permission, PermissionGate, compute_capabilities, required_permission};
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use handlers::AllocationService;
pub use request_response::{
    AllocationCapabilities, AssignmentResponse, AuditEntryInfo, AuditHistoryRequest,
    AuditHistoryResponse, BulkAction, BulkFailureInfo, BulkOutcomeResponse, BulkRequest,
    CalendarRequest, CalendarResponse, Capability, CompleteAssignmentRequest,
    CreateAssignmentRequest, DeleteAssignmentResponse, ErrorResponse, ListAssignmentsRequest,
    ListAssignmentsResponse, TransitionResponse, UpdateAssignmentRequest, parse_assignment_id,
};
