// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{AssignmentPatch, NewAssignment, ResourceAssignment};
use time::Date;

/// Validates that an engagement interval is well-formed.
///
/// # Arguments
///
/// * `start` - The engagement start date
/// * `release` - The optional release date
///
/// # Errors
///
/// Returns `DomainError::ReleaseBeforeStart` if the release date precedes
/// the start date.
pub fn validate_interval(start: Date, release: Option<Date>) -> Result<(), DomainError> {
    match release {
        Some(release) if release < start => Err(DomainError::ReleaseBeforeStart { start, release }),
        _ => Ok(()),
    }
}

/// Validates the fields of an assignment about to be created.
///
/// Percentages are non-negative by construction, so only the identifiers
/// and the interval are checked here.
///
/// # Errors
///
/// Returns an error if:
/// - The profile id is empty
/// - The release date precedes the start date
pub fn validate_new_assignment(fields: &NewAssignment) -> Result<(), DomainError> {
    if fields.profile_id.value().trim().is_empty() {
        return Err(DomainError::InvalidIdentifier(String::from(
            "profileId cannot be empty",
        )));
    }

    validate_interval(fields.engagement_start_date, fields.release_date)
}

/// Validates that a patch leaves the assignment consistent.
///
/// The patch is merged onto a copy of `existing` and the merged interval is
/// checked, so a patch moving only the start date past an existing release
/// date is rejected as well.
///
/// # Errors
///
/// Returns an error if:
/// - The patch sets an empty profile id
/// - The merged release date precedes the merged start date
pub fn validate_patch(
    existing: &ResourceAssignment,
    patch: &AssignmentPatch,
) -> Result<(), DomainError> {
    if patch
        .profile_id
        .as_ref()
        .is_some_and(|profile_id| profile_id.value().trim().is_empty())
    {
        return Err(DomainError::InvalidIdentifier(String::from(
            "profileId cannot be empty",
        )));
    }

    let mut merged: ResourceAssignment = existing.clone();
    patch.apply_to(&mut merged);
    validate_interval(merged.engagement_start_date, merged.release_date)
}
