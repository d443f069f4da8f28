// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Validation and completion lifecycle rules.
//!
//! An assignment carries two independent states:
//!
//! - Validation: `Unvalidated` ⇄ `Validated`
//! - Completion: `Active` → `Complete` (terminal)
//!
//! The functions here only decide what a transition would change; writing
//! the change is the caller's job. A complete assignment rejects validation
//! changes in both directions.

use crate::error::DomainError;
use crate::types::{AssignmentFlag, AssignmentPatch, ResourceAssignment};
use crate::validation::validate_interval;
use serde::{Deserialize, Serialize};
use time::Date;

/// Position on the validation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValidationState {
    /// Not signed off for the current period.
    #[default]
    Unvalidated,
    /// Signed off.
    Validated,
}

/// Position on the completion axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompletionState {
    /// Counts towards capacity.
    #[default]
    Active,
    /// Finished; terminal for this workflow.
    Complete,
}

/// Both lifecycle axes of one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LifecycleState {
    /// Validation axis.
    pub validation: ValidationState,
    /// Completion axis.
    pub completion: CompletionState,
}

impl LifecycleState {
    /// Reads the lifecycle state from an assignment's flags.
    #[must_use]
    pub const fn of(assignment: &ResourceAssignment) -> Self {
        Self {
            validation: if assignment.weekly_validation {
                ValidationState::Validated
            } else {
                ValidationState::Unvalidated
            },
            completion: if assignment.engagement_complete {
                CompletionState::Complete
            } else {
                CompletionState::Active
            },
        }
    }
}

/// The outcome of planning a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The assignment already is in the target state; nothing to write.
    NoOp,
    /// Writing this patch performs the transition.
    Apply(AssignmentPatch),
}

impl Transition {
    /// Returns whether the transition changes anything.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Plans `Unvalidated → Validated`.
///
/// # Errors
///
/// Returns `DomainError::AssignmentComplete` if the assignment is complete
/// and not yet validated.
pub fn plan_validate(assignment: &ResourceAssignment) -> Result<Transition, DomainError> {
    plan_validation_change(assignment, ValidationState::Validated)
}

/// Plans `Validated → Unvalidated`.
///
/// # Errors
///
/// Returns `DomainError::AssignmentComplete` if the assignment is complete
/// and still validated.
pub fn plan_invalidate(assignment: &ResourceAssignment) -> Result<Transition, DomainError> {
    plan_validation_change(assignment, ValidationState::Unvalidated)
}

fn plan_validation_change(
    assignment: &ResourceAssignment,
    target: ValidationState,
) -> Result<Transition, DomainError> {
    let state = LifecycleState::of(assignment);

    if state.validation == target {
        return Ok(Transition::NoOp);
    }

    if state.completion == CompletionState::Complete {
        return Err(DomainError::AssignmentComplete {
            id: assignment.id.clone(),
        });
    }

    Ok(Transition::Apply(AssignmentPatch::flag(
        AssignmentFlag::WeeklyValidation,
        target == ValidationState::Validated,
    )))
}

/// Plans `Active → Complete`, optionally moving the release date in the
/// same write.
///
/// Completing an already complete assignment is a no-op unless a different
/// release date is supplied.
///
/// # Errors
///
/// Returns `DomainError::ReleaseBeforeStart` if `new_release_date` precedes
/// the engagement start date.
pub fn plan_complete(
    assignment: &ResourceAssignment,
    new_release_date: Option<Date>,
) -> Result<Transition, DomainError> {
    if let Some(release) = new_release_date {
        validate_interval(assignment.engagement_start_date, Some(release))?;
    }

    let release_changes: bool =
        new_release_date.is_some_and(|release| assignment.release_date != Some(release));

    if assignment.engagement_complete && !release_changes {
        return Ok(Transition::NoOp);
    }

    Ok(Transition::Apply(AssignmentPatch {
        engagement_complete: Some(true),
        release_date: new_release_date.filter(|_| release_changes).map(Some),
        ..AssignmentPatch::default()
    }))
}
