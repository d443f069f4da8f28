// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ApiError, ErrorResponse, translate_core_error};
use staffplan::{CoreError, StoreError};
use staffplan_audit::AuditReadError;
use staffplan_domain::{AssignmentId, DomainError};

#[test]
fn test_validation_keeps_the_field() {
    let err = translate_core_error(CoreError::Validation(DomainError::InvalidDate {
        field: String::from("startDateFrom"),
        value: String::from("01/01/2024"),
        error: String::from("bad"),
    }));

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "startDateFrom"));
}

#[test]
fn test_missing_record_is_not_found_for_reads_and_writes() {
    let id = AssignmentId::new("a-1");

    for err in [
        CoreError::Query(StoreError::NotFound(id.clone())),
        CoreError::Mutation(StoreError::NotFound(id.clone())),
    ] {
        assert_eq!(translate_core_error(err).category(), "not_found");
    }
}

#[test]
fn test_remote_rejections_keep_their_category() {
    let read = translate_core_error(CoreError::Query(StoreError::Unauthorized(String::from(
        "token expired",
    ))));
    let write = translate_core_error(CoreError::Mutation(StoreError::ConstraintViolation(
        String::from("overlap"),
    )));

    assert_eq!(read.category(), "query_failed");
    assert_eq!(write.category(), "mutation_failed");
    assert_eq!(write.to_string(), "Mutation failed: Constraint violation: overlap");
}

#[test]
fn test_lifecycle_rejection_is_a_mutation_failure() {
    let id = AssignmentId::new("a-1");
    let err = translate_core_error(CoreError::LifecycleRejected {
        id: id.clone(),
        reason: DomainError::AssignmentComplete { id },
    });

    assert_eq!(err.category(), "mutation_failed");
}

#[test]
fn test_audit_read_errors() {
    let refused = ApiError::from(AuditReadError::Unauthorized);
    assert_eq!(refused.category(), "query_failed");
    assert_eq!(
        refused.to_string(),
        "Query failed: Not authorized to read the audit log"
    );
    assert_eq!(
        ApiError::from(AuditReadError::Unavailable(String::from("down"))).category(),
        "query_failed"
    );
}

#[test]
fn test_error_response_body() {
    let err = ApiError::NotFound {
        resource_type: String::from("Assignment"),
        message: String::from("Assignment a-1 does not exist"),
    };

    let body = ErrorResponse::from(&err);

    assert_eq!(body.category, "not_found");
    assert_eq!(body.message, "Assignment not found: Assignment a-1 does not exist");
}
