// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocation handlers.
//!
//! Every handler checks the caller's `PermissionGate` first, translates the
//! request into domain types, runs the core operation and maps any failure
//! to an `ApiError`.

use crate::capabilities::{Permission, PermissionGate, required_permission};
use crate::error::ApiError;
use crate::request_response::{
    AssignmentResponse, AuditEntryInfo, AuditHistoryRequest, AuditHistoryResponse,
    BulkOutcomeResponse, BulkRequest, CalendarRequest, CalendarResponse,
    CompleteAssignmentRequest, CreateAssignmentRequest, DeleteAssignmentResponse,
    ListAssignmentsRequest, ListAssignmentsResponse, TransitionResponse, UpdateAssignmentRequest,
    parse_assignment_id,
};
use staffplan::{
    AllocationCache, AllocationQueryRunner, AssignmentEditor, AssignmentStore, BulkOperation,
    BulkOperationCoordinator, Clock, CoreConfig, QueryOutcome, TransitionOutcome,
    ValidationLifecycle,
};
use staffplan_audit::{AuditLogQuery, AuditLogReader, AuditPage};
use staffplan_domain::{
    AllocationQuery, AssignmentId, AssignmentPatch, QueryScope, ViewWindow, parse_iso_date,
};
use std::sync::Arc;
use tracing::{debug, info};

/// The allocation API over one store.
///
/// List queries run on one runner per scope, so a newer query on one tab
/// supersedes only older queries on the same tab.
pub struct AllocationService {
    runners: [AllocationQueryRunner; 4],
    editor: AssignmentEditor,
    lifecycle: ValidationLifecycle,
    bulk: BulkOperationCoordinator,
    audit: Arc<dyn AuditLogReader>,
}

const fn scope_index(scope: QueryScope) -> usize {
    match scope {
        QueryScope::All => 0,
        QueryScope::Planned => 1,
        QueryScope::Validation => 2,
        QueryScope::Unplanned => 3,
    }
}

fn transition_response(outcome: TransitionOutcome, verb: &str) -> TransitionResponse {
    let message: String = if outcome.affected == 0 {
        format!("Assignment {} was already {verb}", outcome.assignment.id)
    } else {
        format!("Assignment {} {verb}", outcome.assignment.id)
    };
    TransitionResponse {
        assignment: outcome.assignment,
        affected: outcome.affected,
        message,
    }
}

impl AllocationService {
    /// Creates the service.
    ///
    /// # Arguments
    ///
    /// * `store` - The assignment store
    /// * `audit` - The audit log reader
    /// * `clock` - Source of "today" for duplicate-forward
    /// * `config` - Query configuration
    #[must_use]
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        audit: Arc<dyn AuditLogReader>,
        clock: Arc<dyn Clock>,
        config: CoreConfig,
    ) -> Self {
        let cache = Arc::new(AllocationCache::new());
        let runners = [(); 4].map(|()| {
            AllocationQueryRunner::new(Arc::clone(&store), Arc::clone(&cache), config)
        });
        Self {
            runners,
            editor: AssignmentEditor::new(Arc::clone(&store), Arc::clone(&cache)),
            lifecycle: ValidationLifecycle::new(Arc::clone(&store), Arc::clone(&cache)),
            bulk: BulkOperationCoordinator::new(store, cache, clock),
            audit,
        }
    }

    const fn runner(&self, scope: QueryScope) -> &AllocationQueryRunner {
        &self.runners[scope_index(scope)]
    }

    /// Lists one page of assignments.
    ///
    /// Returns `Ok(None)` when a newer list request for the same scope
    /// superseded this one; the caller should drop it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not read (`Forbidden`)
    /// - The filters are malformed (`InvalidInput`)
    /// - The store read fails (`QueryFailed`)
    pub async fn list_assignments(
        &self,
        gate: &PermissionGate,
        request: &ListAssignmentsRequest,
    ) -> Result<Option<ListAssignmentsResponse>, ApiError> {
        gate.require("list assignments", Permission::Read)?;

        let runner: &AllocationQueryRunner = self.runner(request.scope);
        let query: AllocationQuery = runner.normalize(&request.filters, request.scope)?;

        let response = match runner.run(&query).await? {
            QueryOutcome::Fresh(page) => Some(ListAssignmentsResponse::new(page, false)),
            QueryOutcome::Cached(page) => Some(ListAssignmentsResponse::new(page, true)),
            QueryOutcome::Superseded => {
                debug!(scope = ?request.scope, "List request superseded");
                None
            }
        };
        Ok(response)
    }

    /// Computes the calendar view for the selected assignments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not read (`Forbidden`)
    /// - The filters or anchor date are malformed (`InvalidInput`)
    /// - The store read fails (`QueryFailed`)
    pub async fn calendar(
        &self,
        gate: &PermissionGate,
        request: &CalendarRequest,
    ) -> Result<CalendarResponse, ApiError> {
        gate.require("view calendar", Permission::Read)?;

        let runner: &AllocationQueryRunner = self.runner(request.scope);
        let query: AllocationQuery = runner.normalize(&request.filters, request.scope)?;
        let anchor = parse_iso_date("anchorDate", request.anchor_date.trim())?;
        let window: ViewWindow = ViewWindow::resolve(request.view_mode, anchor)?;

        let days = runner.calendar(&query, window, request.active_only).await?;

        Ok(CalendarResponse::new(
            request.view_mode,
            window.start(),
            window.end(),
            days.to_vec(),
        ))
    }

    /// Creates an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not update (`Forbidden`)
    /// - The fields are malformed or inconsistent (`InvalidInput`)
    /// - The store rejects the create (`MutationFailed`)
    pub async fn create_assignment(
        &self,
        gate: &PermissionGate,
        request: CreateAssignmentRequest,
    ) -> Result<AssignmentResponse, ApiError> {
        gate.require("create assignment", Permission::Update)?;

        let fields = request.into_new_assignment()?;
        let assignment = self.editor.create(&fields).await?;

        info!(id = %assignment.id, profile_id = %assignment.profile_id, "Created assignment");
        Ok(AssignmentResponse {
            message: format!("Created assignment {}", assignment.id),
            assignment,
        })
    }

    /// Applies an inline edit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not update (`Forbidden`)
    /// - The id or fields are malformed, or the edit leaves the record
    ///   inconsistent (`InvalidInput`)
    /// - The assignment does not exist (`NotFound`)
    /// - The store rejects the write (`MutationFailed`)
    pub async fn update_assignment(
        &self,
        gate: &PermissionGate,
        id: &str,
        request: UpdateAssignmentRequest,
    ) -> Result<AssignmentResponse, ApiError> {
        gate.require("edit assignment", Permission::Update)?;

        let id: AssignmentId = parse_assignment_id(id)?;
        let patch: AssignmentPatch = request.into_patch()?;
        let assignment = self.editor.update(&id, &patch).await?;

        Ok(AssignmentResponse {
            message: format!("Updated assignment {id}"),
            assignment,
        })
    }

    /// Deletes an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not delete (`Forbidden`)
    /// - The assignment does not exist (`NotFound`)
    /// - The store rejects the delete (`MutationFailed`)
    pub async fn delete_assignment(
        &self,
        gate: &PermissionGate,
        id: &str,
    ) -> Result<DeleteAssignmentResponse, ApiError> {
        gate.require("delete assignment", Permission::Delete)?;

        let id: AssignmentId = parse_assignment_id(id)?;
        self.editor.delete(&id).await?;

        info!(id = %id, "Deleted assignment");
        Ok(DeleteAssignmentResponse {
            message: format!("Deleted assignment {id}"),
            id,
        })
    }

    /// Marks an assignment validated for the week.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not update (`Forbidden`)
    /// - The assignment does not exist (`NotFound`)
    /// - The assignment is complete, or the store rejects the write
    ///   (`MutationFailed`)
    pub async fn validate_assignment(
        &self,
        gate: &PermissionGate,
        id: &str,
    ) -> Result<TransitionResponse, ApiError> {
        gate.require("validate assignment", Permission::Update)?;

        let id: AssignmentId = parse_assignment_id(id)?;
        let outcome = self.lifecycle.validate(&id).await?;
        Ok(transition_response(outcome, "validated"))
    }

    /// Withdraws an assignment's weekly validation.
    ///
    /// # Errors
    ///
    /// Same as `validate_assignment`.
    pub async fn invalidate_assignment(
        &self,
        gate: &PermissionGate,
        id: &str,
    ) -> Result<TransitionResponse, ApiError> {
        gate.require("invalidate assignment", Permission::Update)?;

        let id: AssignmentId = parse_assignment_id(id)?;
        let outcome = self.lifecycle.invalidate(&id).await?;
        Ok(transition_response(outcome, "invalidated"))
    }

    /// Marks an assignment complete, optionally with a new release date.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not update (`Forbidden`)
    /// - The release date is malformed or precedes the start (`InvalidInput`)
    /// - The assignment does not exist (`NotFound`)
    /// - The store rejects the write (`MutationFailed`)
    pub async fn complete_assignment(
        &self,
        gate: &PermissionGate,
        id: &str,
        request: &CompleteAssignmentRequest,
    ) -> Result<TransitionResponse, ApiError> {
        gate.require("complete assignment", Permission::Update)?;

        let id: AssignmentId = parse_assignment_id(id)?;
        let release_date = request.release_date()?;
        let outcome = self.lifecycle.complete(&id, release_date).await?;
        Ok(transition_response(outcome, "completed"))
    }

    /// Runs one operation across a selection.
    ///
    /// Per-id failures are reported in the response, never as an error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` if the gate denies the operation.
    pub async fn bulk(
        &self,
        gate: &PermissionGate,
        request: &BulkRequest,
    ) -> Result<BulkOutcomeResponse, ApiError> {
        let operation: BulkOperation = request.operation.into();
        gate.require(&format!("bulk {operation}"), required_permission(operation))?;

        let outcome = self.bulk.execute(operation, &request.ids).await;
        Ok(BulkOutcomeResponse::from(outcome))
    }

    /// Reads one page of an assignment's audit history.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller may not read (`Forbidden`)
    /// - The id is blank (`InvalidInput`)
    /// - The log refuses the read or cannot be reached (`QueryFailed`)
    pub async fn audit_history(
        &self,
        gate: &PermissionGate,
        id: &str,
        request: &AuditHistoryRequest,
    ) -> Result<AuditHistoryResponse, ApiError> {
        gate.require("view audit history", Permission::Read)?;

        let id: AssignmentId = parse_assignment_id(id)?;
        let defaults = AuditLogQuery::for_assignment(id.clone());
        let query = AuditLogQuery {
            page: request.page.filter(|page| *page > 0).unwrap_or(defaults.page),
            page_size: request
                .page_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            ..defaults
        };

        let page: AuditPage = self.audit.read(&query).await?;

        Ok(AuditHistoryResponse {
            assignment_id: id,
            entries: page
                .entries
                .iter()
                .filter_map(AuditEntryInfo::from_entry)
                .collect(),
            total_count: page.total_count,
            page: page.page,
            page_count: page.page_count,
        })
    }
}
