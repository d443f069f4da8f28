// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    UnavailableAuditLog, create_test_context, create_test_context_with_audit, date,
};
use crate::{
    ApiError, AuditHistoryRequest, BulkAction, BulkRequest, CalendarRequest,
    CompleteAssignmentRequest, CreateAssignmentRequest, ListAssignmentsRequest, PermissionGate,
    UpdateAssignmentRequest,
};
use staffplan_domain::{
    AllocationFilters, AllocationStatus, AssignmentId, ProfileId, QueryScope, ViewMode,
};
use std::sync::Arc;

fn create_request(start: &str, release: Option<&str>) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        profile_id: String::from("P4"),
        project_id: Some(String::from("PRJ-2")),
        bill_type_id: None,
        engagement_percentage: 40.0,
        billing_percentage: None,
        engagement_start_date: start.to_string(),
        release_date: release.map(str::to_string),
        is_forecasted: false,
    }
}

fn calendar_request(anchor: &str) -> CalendarRequest {
    CalendarRequest {
        filters: AllocationFilters::default(),
        scope: QueryScope::All,
        view_mode: ViewMode::Month,
        anchor_date: anchor.to_string(),
        active_only: true,
    }
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_list_is_cached_until_a_mutation() {
    let ctx = create_test_context();
    let gate = PermissionGate::full();
    let request = ListAssignmentsRequest::default();

    let first = ctx
        .service
        .list_assignments(&gate, &request)
        .await
        .unwrap()
        .unwrap();
    let second = ctx
        .service
        .list_assignments(&gate, &request)
        .await
        .unwrap()
        .unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.filtered_count, 4);

    ctx.service
        .create_assignment(&gate, create_request("2024-02-01", None))
        .await
        .unwrap();

    let third = ctx
        .service
        .list_assignments(&gate, &request)
        .await
        .unwrap()
        .unwrap();
    assert!(!third.from_cache);
    assert_eq!(third.filtered_count, 5);
}

#[tokio::test]
async fn test_list_respects_scope() {
    let ctx = create_test_context();
    let request = ListAssignmentsRequest {
        filters: AllocationFilters::default(),
        scope: QueryScope::Validation,
    };

    let page = ctx
        .service
        .list_assignments(&PermissionGate::read_only(), &request)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(page.total_count, 3);
    assert!(page.items.iter().all(|a| !a.engagement_complete));
}

#[tokio::test]
async fn test_list_rejects_malformed_date() {
    let ctx = create_test_context();
    let request = ListAssignmentsRequest {
        filters: AllocationFilters {
            end_date_to: Some(String::from("2024/01/31")),
            ..AllocationFilters::default()
        },
        scope: QueryScope::All,
    };

    let err = ctx
        .service
        .list_assignments(&PermissionGate::full(), &request)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "invalid_input");
    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "endDateTo"));
}

#[tokio::test]
async fn test_list_requires_read() {
    let ctx = create_test_context();

    let err = ctx
        .service
        .list_assignments(
            &PermissionGate::new(false, true, true),
            &ListAssignmentsRequest::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category(), "forbidden");
}

#[tokio::test]
async fn test_calendar_flags_over_allocated_days() {
    let ctx = create_test_context();

    let response = ctx
        .service
        .calendar(&PermissionGate::read_only(), &calendar_request("2024-01-10"))
        .await
        .unwrap();

    assert_eq!(response.window_start, date("2024-01-01"));
    assert_eq!(response.window_end, date("2024-01-31"));
    assert_eq!(response.days.len(), 31);
    // X and Y overlap from the 15th through the 31st.
    assert_eq!(response.over_allocated_days, 17);

    let day = response
        .days
        .iter()
        .find(|day| day.date == date("2024-01-20"))
        .unwrap();
    assert_eq!(
        day.load_for(&ProfileId::new("P1")).unwrap().status,
        AllocationStatus::OverAllocated
    );
}

#[tokio::test]
async fn test_calendar_rejects_malformed_anchor() {
    let ctx = create_test_context();

    let err = ctx
        .service
        .calendar(&PermissionGate::read_only(), &calendar_request("Jan 10"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "anchorDate"));
}

// ============================================================================
// Single-record mutations
// ============================================================================

#[tokio::test]
async fn test_create_rejects_release_before_start() {
    let ctx = create_test_context();

    let err = ctx
        .service
        .create_assignment(
            &PermissionGate::full(),
            create_request("2024-02-01", Some("2024-01-01")),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "releaseDate"));
    assert_eq!(ctx.store.snapshot().len(), 4);
}

#[tokio::test]
async fn test_create_requires_update() {
    let ctx = create_test_context();

    let err = ctx
        .service
        .create_assignment(
            &PermissionGate::read_only(),
            create_request("2024-02-01", None),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Forbidden {
            action: String::from("create assignment"),
            required: String::from("update"),
        }
    );
}

#[tokio::test]
async fn test_update_can_reopen_an_assignment() {
    let ctx = create_test_context();
    let request = UpdateAssignmentRequest {
        clear_release_date: true,
        ..UpdateAssignmentRequest::default()
    };

    let response = ctx
        .service
        .update_assignment(&PermissionGate::full(), "X", request)
        .await
        .unwrap();

    assert_eq!(response.assignment.release_date, None);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let ctx = create_test_context();
    let request = UpdateAssignmentRequest {
        engagement_percentage: Some(10.0),
        ..UpdateAssignmentRequest::default()
    };

    let err = ctx
        .service
        .update_assignment(&PermissionGate::full(), "missing", request)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "not_found");
}

#[tokio::test]
async fn test_delete_requires_delete_permission() {
    let ctx = create_test_context();
    let gate = PermissionGate::new(true, true, false);

    let err = ctx
        .service
        .delete_assignment(&gate, "X")
        .await
        .unwrap_err();

    assert_eq!(err.category(), "forbidden");
    assert_eq!(ctx.store.snapshot().len(), 4);
}

#[tokio::test]
async fn test_delete_removes_the_assignment() {
    let ctx = create_test_context();

    let response = ctx
        .service
        .delete_assignment(&PermissionGate::full(), " X ")
        .await
        .unwrap();

    assert_eq!(response.id, AssignmentId::new("X"));
    assert_eq!(ctx.store.snapshot().len(), 3);
}

#[tokio::test]
async fn test_validate_is_idempotent() {
    let ctx = create_test_context();
    let gate = PermissionGate::full();

    let first = ctx.service.validate_assignment(&gate, "X").await.unwrap();
    let second = ctx.service.validate_assignment(&gate, "X").await.unwrap();

    assert_eq!(first.affected, 1);
    assert_eq!(first.message, "Assignment X validated");
    assert_eq!(second.affected, 0);
    assert_eq!(second.message, "Assignment X was already validated");
}

#[tokio::test]
async fn test_validate_complete_assignment_is_a_mutation_failure() {
    let ctx = create_test_context();

    let err = ctx
        .service
        .validate_assignment(&PermissionGate::full(), "D")
        .await
        .unwrap_err();

    assert_eq!(err.category(), "mutation_failed");
    assert!(err.to_string().contains("complete"));
}

#[tokio::test]
async fn test_invalidate_validated_assignment() {
    let ctx = create_test_context();

    let response = ctx
        .service
        .invalidate_assignment(&PermissionGate::full(), "Z")
        .await
        .unwrap();

    assert_eq!(response.affected, 1);
    assert!(!response.assignment.weekly_validation);
}

#[tokio::test]
async fn test_complete_with_release_before_start_is_invalid_input() {
    let ctx = create_test_context();
    let request = CompleteAssignmentRequest {
        release_date: Some(String::from("2024-01-01")),
    };

    let err = ctx
        .service
        .complete_assignment(&PermissionGate::full(), "Y", &request)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "invalid_input");
    assert!(
        ctx.store
            .snapshot()
            .iter()
            .all(|a| a.id.value() != "Y" || !a.engagement_complete)
    );
}

#[tokio::test]
async fn test_complete_keeps_release_date_when_absent() {
    let ctx = create_test_context();

    let response = ctx
        .service
        .complete_assignment(
            &PermissionGate::full(),
            "X",
            &CompleteAssignmentRequest::default(),
        )
        .await
        .unwrap();

    assert!(response.assignment.engagement_complete);
    assert_eq!(response.assignment.release_date, Some(date("2024-01-31")));
}

// ============================================================================
// Bulk operations
// ============================================================================

#[tokio::test]
async fn test_bulk_validate_reports_every_id() {
    let ctx = create_test_context();
    let request = BulkRequest {
        operation: BulkAction::Validate,
        ids: vec![
            AssignmentId::new("X"),
            AssignmentId::new("Z"),
            AssignmentId::new("D"),
        ],
    };

    let response = ctx
        .service
        .bulk(&PermissionGate::full(), &request)
        .await
        .unwrap();

    assert_eq!(response.operation, "validate");
    assert_eq!(response.succeeded_ids, vec![AssignmentId::new("X")]);
    assert_eq!(response.skipped_ids, vec![AssignmentId::new("Z")]);
    assert_eq!(response.failed.len(), 1);
    assert_eq!(response.failed[0].id, AssignmentId::new("D"));
    assert_eq!(response.summary, "1 of 3 succeeded, 1 failed, 1 unchanged");
    assert!(!response.success);
}

#[tokio::test]
async fn test_bulk_delete_requires_delete_permission() {
    let ctx = create_test_context();
    let request = BulkRequest {
        operation: BulkAction::Delete,
        ids: vec![AssignmentId::new("X")],
    };

    let err = ctx
        .service
        .bulk(&PermissionGate::new(true, true, false), &request)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Forbidden {
            action: String::from("bulk delete"),
            required: String::from("delete"),
        }
    );
    assert_eq!(ctx.store.snapshot().len(), 4);
}

#[tokio::test]
async fn test_bulk_duplicate_forward_creates_next_month_copies() {
    let ctx = create_test_context();
    let request = BulkRequest {
        operation: BulkAction::DuplicateForward,
        ids: vec![AssignmentId::new("X")],
    };

    let response = ctx
        .service
        .bulk(&PermissionGate::full(), &request)
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.created_ids.len(), 1);
    let created = ctx
        .store
        .snapshot()
        .into_iter()
        .find(|a| a.id == response.created_ids[0])
        .unwrap();
    assert_eq!(created.engagement_start_date, date("2024-02-01"));
    assert_eq!(created.release_date, Some(date("2024-02-29")));
}

// ============================================================================
// Audit history
// ============================================================================

#[tokio::test]
async fn test_audit_history_pages_newest_first() {
    let ctx = create_test_context();
    let request = AuditHistoryRequest {
        page: None,
        page_size: Some(1),
    };

    let response = ctx
        .service
        .audit_history(&PermissionGate::read_only(), "X", &request)
        .await
        .unwrap();

    assert_eq!(response.total_count, 2);
    assert_eq!(response.page_count, 2);
    assert_eq!(response.entries.len(), 1);
    let entry = &response.entries[0];
    assert_eq!(entry.id, "e-2");
    assert_eq!(entry.actor, "Dana Admin");
    assert_eq!(entry.action, "update");
    assert_eq!(entry.recorded_at, "2024-01-03T09:00:00Z");
    assert_eq!(entry.changes.len(), 1);
}

#[tokio::test]
async fn test_audit_history_unavailable_is_query_failure() {
    let ctx = create_test_context_with_audit(Arc::new(UnavailableAuditLog));

    let err = ctx
        .service
        .audit_history(
            &PermissionGate::read_only(),
            "X",
            &AuditHistoryRequest::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category(), "query_failed");
}
