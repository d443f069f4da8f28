// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bulk::{BulkOperation, BulkOutcome, distinct_ids};
use crate::cache::AllocationCache;
use crate::error::CoreError;
use crate::store::AssignmentStore;
use futures::future::join_all;
use staffplan_domain::{
    AssignmentFlag, AssignmentId, AssignmentPatch, DomainError, ProfileId, ResourceAssignment,
    Transition, plan_complete, plan_invalidate, plan_validate,
};
use std::collections::HashMap;
use std::sync::Arc;
use time::Date;
use tracing::debug;

/// The result of a single lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The assignment after the transition.
    pub assignment: ResourceAssignment,
    /// `1` if the assignment changed, `0` for a no-op.
    pub affected: usize,
}

#[derive(Debug, Clone, Copy)]
enum LifecycleOp {
    Validate,
    Invalidate,
    Complete(Option<Date>),
}

impl LifecycleOp {
    fn plan(self, assignment: &ResourceAssignment) -> Result<Transition, DomainError> {
        match self {
            Self::Validate => plan_validate(assignment),
            Self::Invalidate => plan_invalidate(assignment),
            Self::Complete(release) => plan_complete(assignment, release),
        }
    }

    const fn flag(self) -> (AssignmentFlag, bool) {
        match self {
            Self::Validate => (AssignmentFlag::WeeklyValidation, true),
            Self::Invalidate => (AssignmentFlag::WeeklyValidation, false),
            Self::Complete(_) => (AssignmentFlag::EngagementComplete, true),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Invalidate => "invalidate",
            Self::Complete(_) => "complete",
        }
    }
}

/// Validation and completion transitions against the store.
///
/// Every transition that writes evicts the cached pages and the calendars
/// touching the affected profiles.
pub struct ValidationLifecycle {
    store: Arc<dyn AssignmentStore>,
    cache: Arc<AllocationCache>,
}

impl ValidationLifecycle {
    /// Creates the lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<dyn AssignmentStore>, cache: Arc<AllocationCache>) -> Self {
        Self { store, cache }
    }

    /// `Unvalidated → Validated`. A validated assignment is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The assignment cannot be read (`Query`)
    /// - The assignment is complete (`LifecycleRejected`)
    /// - The write fails (`Mutation`)
    pub async fn validate(&self, id: &AssignmentId) -> Result<TransitionOutcome, CoreError> {
        self.transition(id, LifecycleOp::Validate).await
    }

    /// `Validated → Unvalidated`. An unvalidated assignment is left alone.
    ///
    /// # Errors
    ///
    /// Same as `validate`.
    pub async fn invalidate(&self, id: &AssignmentId) -> Result<TransitionOutcome, CoreError> {
        self.transition(id, LifecycleOp::Invalidate).await
    }

    /// `Active → Complete`, writing `new_release_date` in the same update.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The assignment cannot be read (`Query`)
    /// - `new_release_date` precedes the start date (`Validation`, nothing
    ///   is written)
    /// - The write fails (`Mutation`)
    pub async fn complete(
        &self,
        id: &AssignmentId,
        new_release_date: Option<Date>,
    ) -> Result<TransitionOutcome, CoreError> {
        self.transition(id, LifecycleOp::Complete(new_release_date))
            .await
    }

    /// Validates every selected assignment.
    pub async fn bulk_validate(&self, ids: &[AssignmentId]) -> BulkOutcome {
        self.bulk(BulkOperation::Validate, LifecycleOp::Validate, ids)
            .await
    }

    /// Invalidates the validated part of the selection. Unvalidated ids are
    /// skipped, not failed.
    pub async fn bulk_invalidate(&self, ids: &[AssignmentId]) -> BulkOutcome {
        self.bulk(BulkOperation::Invalidate, LifecycleOp::Invalidate, ids)
            .await
    }

    /// Completes every selected assignment, keeping each release date.
    pub async fn bulk_complete(&self, ids: &[AssignmentId]) -> BulkOutcome {
        self.bulk(BulkOperation::Complete, LifecycleOp::Complete(None), ids)
            .await
    }

    async fn transition(
        &self,
        id: &AssignmentId,
        op: LifecycleOp,
    ) -> Result<TransitionOutcome, CoreError> {
        let current: ResourceAssignment = self
            .store
            .get_assignment(id)
            .await
            .map_err(CoreError::Query)?;

        let patch: AssignmentPatch = match op.plan(&current)? {
            Transition::NoOp => {
                debug!(operation = op.name(), id = %id, "Transition is a no-op");
                return Ok(TransitionOutcome {
                    assignment: current,
                    affected: 0,
                });
            }
            Transition::Apply(patch) => patch,
        };

        let updated: ResourceAssignment = self
            .store
            .update_assignment(id, &patch)
            .await
            .map_err(CoreError::Mutation)?;

        if patch.release_date.is_some() {
            self.cache.invalidate_all();
        } else {
            self.cache
                .invalidate_profiles(&[current.profile_id, updated.profile_id.clone()]);
        }

        Ok(TransitionOutcome {
            assignment: updated,
            affected: 1,
        })
    }

    async fn bulk(
        &self,
        operation: BulkOperation,
        op: LifecycleOp,
        ids: &[AssignmentId],
    ) -> BulkOutcome {
        let ids: Vec<AssignmentId> = distinct_ids(ids);
        let mut outcome = BulkOutcome::new(operation, ids.len());

        let current = join_all(ids.iter().map(|id| self.store.get_assignment(id))).await;

        let mut pending: Vec<AssignmentId> = Vec::new();
        let mut profiles: HashMap<AssignmentId, ProfileId> = HashMap::new();
        for (id, result) in ids.iter().cloned().zip(current) {
            let assignment: ResourceAssignment = match result {
                Ok(assignment) => assignment,
                Err(err) => {
                    outcome.record_failure(id, CoreError::Query(err));
                    continue;
                }
            };
            match op.plan(&assignment) {
                Ok(Transition::NoOp) => {
                    debug!(operation = op.name(), id = %id, "Skipping id already in target state");
                    outcome.record_skip(id);
                }
                Ok(Transition::Apply(_)) => {
                    profiles.insert(id.clone(), assignment.profile_id);
                    pending.push(id);
                }
                Err(err) => outcome.record_failure(id, CoreError::from(err)),
            }
        }

        if !pending.is_empty() {
            let (flag, value) = op.flag();
            let mut touched: Vec<ProfileId> = Vec::new();
            for (id, result) in self.store.bulk_update_flag(&pending, flag, value).await {
                match result {
                    Ok(()) => {
                        if let Some(profile) = profiles.remove(&id) {
                            touched.push(profile);
                        }
                        outcome.record_success(id);
                    }
                    Err(err) => outcome.record_failure(id, CoreError::Mutation(err)),
                }
            }
            if !touched.is_empty() {
                self.cache.invalidate_profiles(&touched);
            }
        }

        outcome.order_failures(&ids);
        outcome.finish()
    }
}
