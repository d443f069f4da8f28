// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AssignmentPatch, DomainError, NewAssignment, Percentage, ProfileId, validate_interval,
    validate_new_assignment, validate_patch,
};

use super::helpers::{create_test_assignment, date};

fn new_assignment(profile: &str, start: &str, release: Option<&str>) -> NewAssignment {
    NewAssignment {
        profile_id: ProfileId::new(profile),
        project_id: None,
        bill_type_id: None,
        engagement_percentage: Percentage::whole(50),
        billing_percentage: Percentage::ZERO,
        engagement_start_date: date(start),
        release_date: release.map(date),
        is_forecasted: false,
    }
}

#[test]
fn test_same_day_interval_is_valid() {
    assert!(validate_interval(date("2024-01-01"), Some(date("2024-01-01"))).is_ok());
    assert!(validate_interval(date("2024-01-01"), None).is_ok());
}

#[test]
fn test_new_assignment_release_before_start_is_rejected() {
    let fields = new_assignment("P1", "2024-02-01", Some("2024-01-31"));

    assert!(matches!(
        validate_new_assignment(&fields),
        Err(DomainError::ReleaseBeforeStart { .. })
    ));
}

#[test]
fn test_new_assignment_requires_profile() {
    let fields = new_assignment("  ", "2024-02-01", None);

    assert!(matches!(
        validate_new_assignment(&fields),
        Err(DomainError::InvalidIdentifier(_))
    ));
}

#[test]
fn test_patch_is_checked_against_merged_record() {
    let existing = create_test_assignment("A", "P1", "2024-01-01", Some("2024-01-31"), 50);
    let patch = AssignmentPatch {
        engagement_start_date: Some(date("2024-02-15")),
        ..AssignmentPatch::default()
    };

    assert!(matches!(
        validate_patch(&existing, &patch),
        Err(DomainError::ReleaseBeforeStart { .. })
    ));

    let patch = AssignmentPatch {
        engagement_start_date: Some(date("2024-02-15")),
        release_date: Some(None),
        ..AssignmentPatch::default()
    };
    assert!(validate_patch(&existing, &patch).is_ok());
}
