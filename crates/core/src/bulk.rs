// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk operations over a selected id set.
//!
//! Every id is processed independently. A bulk operation never fails as a
//! whole because some ids failed; it returns one `BulkOutcome` listing what
//! succeeded, what was skipped as already in the target state, and what
//! failed with which reason.

use crate::cache::AllocationCache;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::lifecycle::ValidationLifecycle;
use crate::store::AssignmentStore;
use futures::future::join_all;
use staffplan_domain::{
    AssignmentId, DomainError, NewAssignment, ResourceAssignment, copy_exact, duplicate_forward,
    validate_new_assignment,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use time::Date;
use tracing::{info, warn};

/// The operations available on a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkOperation {
    /// Delete every selected assignment.
    Delete,
    /// Mark every selected assignment complete.
    Complete,
    /// Validate every selected assignment.
    Validate,
    /// Invalidate the validated part of the selection.
    Invalidate,
    /// Copy every selected assignment onto next month.
    DuplicateForward,
    /// Copy every selected assignment unchanged.
    CopyExact,
}

impl BulkOperation {
    /// Returns the operation name used in logs and responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Complete => "complete",
            Self::Validate => "validate",
            Self::Invalidate => "invalidate",
            Self::DuplicateForward => "duplicate_forward",
            Self::CopyExact => "copy_exact",
        }
    }

    /// Returns whether the operation creates new records.
    #[must_use]
    pub const fn creates_records(&self) -> bool {
        matches!(self, Self::DuplicateForward | Self::CopyExact)
    }
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One id that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// The selected id.
    pub id: AssignmentId,
    /// Human readable reason.
    pub reason: String,
}

/// The aggregate result of one bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    /// The operation performed.
    pub operation: BulkOperation,
    /// Distinct ids in the selection.
    pub requested: usize,
    /// Ids the operation changed, in selection order.
    pub succeeded_ids: Vec<AssignmentId>,
    /// Ids already in the target state; neither changed nor failed.
    pub skipped_ids: Vec<AssignmentId>,
    /// Ids that failed, in selection order.
    pub failed: Vec<BulkFailure>,
    /// Records created by duplicate and copy operations, parallel to
    /// `succeeded_ids`.
    pub created_ids: Vec<AssignmentId>,
}

impl BulkOutcome {
    pub(crate) const fn new(operation: BulkOperation, requested: usize) -> Self {
        Self {
            operation,
            requested,
            succeeded_ids: Vec::new(),
            skipped_ids: Vec::new(),
            failed: Vec::new(),
            created_ids: Vec::new(),
        }
    }

    /// Number of records actually changed or created.
    #[must_use]
    pub const fn affected(&self) -> usize {
        self.succeeded_ids.len()
    }

    /// Returns whether no id failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary for user feedback, e.g. `12 of 14 succeeded, 2 failed`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} of {} succeeded, {} failed",
            self.succeeded_ids.len(),
            self.requested,
            self.failed.len()
        );
        if !self.skipped_ids.is_empty() {
            summary.push_str(&format!(", {} unchanged", self.skipped_ids.len()));
        }
        summary
    }

    pub(crate) fn record_success(&mut self, id: AssignmentId) {
        self.succeeded_ids.push(id);
    }

    pub(crate) fn record_created(&mut self, source: AssignmentId, created: AssignmentId) {
        self.succeeded_ids.push(source);
        self.created_ids.push(created);
    }

    pub(crate) fn record_skip(&mut self, id: AssignmentId) {
        self.skipped_ids.push(id);
    }

    pub(crate) fn record_failure(&mut self, id: AssignmentId, reason: impl std::fmt::Display) {
        let reason: String = reason.to_string();
        warn!(operation = %self.operation, id = %id, reason = %reason, "Bulk item failed");
        self.failed.push(BulkFailure { id, reason });
    }

    /// Puts `failed` back in selection order after failures were recorded
    /// in several passes.
    pub(crate) fn order_failures(&mut self, selection: &[AssignmentId]) {
        let position: HashMap<&AssignmentId, usize> = selection
            .iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();
        self.failed
            .sort_by_key(|failure| position.get(&failure.id).copied().unwrap_or(usize::MAX));
    }

    pub(crate) fn finish(self) -> Self {
        info!(
            operation = %self.operation,
            requested = self.requested,
            succeeded = self.succeeded_ids.len(),
            skipped = self.skipped_ids.len(),
            failed = self.failed.len(),
            "Bulk operation completed"
        );
        self
    }
}

/// Removes repeated ids, keeping the first occurrence of each.
pub(crate) fn distinct_ids(ids: &[AssignmentId]) -> Vec<AssignmentId> {
    let mut seen: HashSet<&AssignmentId> = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Applies one operation across a selection.
///
/// Confirmation happens before the coordinator is called; it never prompts.
pub struct BulkOperationCoordinator {
    store: Arc<dyn AssignmentStore>,
    cache: Arc<AllocationCache>,
    clock: Arc<dyn Clock>,
    lifecycle: ValidationLifecycle,
}

impl BulkOperationCoordinator {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        cache: Arc<AllocationCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lifecycle = ValidationLifecycle::new(Arc::clone(&store), Arc::clone(&cache));
        Self {
            store,
            cache,
            clock,
            lifecycle,
        }
    }

    /// Runs `operation` over `ids`.
    pub async fn execute(&self, operation: BulkOperation, ids: &[AssignmentId]) -> BulkOutcome {
        match operation {
            BulkOperation::Delete => self.delete(ids).await,
            BulkOperation::Complete => self.lifecycle.bulk_complete(ids).await,
            BulkOperation::Validate => self.lifecycle.bulk_validate(ids).await,
            BulkOperation::Invalidate => self.lifecycle.bulk_invalidate(ids).await,
            BulkOperation::DuplicateForward => self.duplicate_forward(ids).await,
            BulkOperation::CopyExact => self.copy_exact(ids).await,
        }
    }

    /// Deletes every selected assignment.
    pub async fn delete(&self, ids: &[AssignmentId]) -> BulkOutcome {
        let ids: Vec<AssignmentId> = distinct_ids(ids);
        let mut outcome = BulkOutcome::new(BulkOperation::Delete, ids.len());

        if !ids.is_empty() {
            for (id, result) in self.store.bulk_delete(&ids).await {
                match result {
                    Ok(()) => outcome.record_success(id),
                    Err(err) => outcome.record_failure(id, CoreError::Mutation(err)),
                }
            }
        }

        if outcome.affected() > 0 {
            self.cache.invalidate_all();
        }
        outcome.finish()
    }

    /// Copies every selected assignment onto the month after today.
    pub async fn duplicate_forward(&self, ids: &[AssignmentId]) -> BulkOutcome {
        let today: Date = self.clock.today();
        self.duplicate(BulkOperation::DuplicateForward, ids, |source| {
            duplicate_forward(source, today)
        })
        .await
    }

    /// Copies every selected assignment unchanged.
    pub async fn copy_exact(&self, ids: &[AssignmentId]) -> BulkOutcome {
        self.duplicate(BulkOperation::CopyExact, ids, |source| Ok(copy_exact(source)))
            .await
    }

    async fn duplicate<F>(&self, operation: BulkOperation, ids: &[AssignmentId], derive: F) -> BulkOutcome
    where
        F: Fn(&ResourceAssignment) -> Result<NewAssignment, DomainError> + Sync,
    {
        let ids: Vec<AssignmentId> = distinct_ids(ids);
        let mut outcome = BulkOutcome::new(operation, ids.len());

        let results = join_all(ids.iter().map(|id| {
            let derive = &derive;
            async move {
                let source = self
                    .store
                    .get_assignment(id)
                    .await
                    .map_err(CoreError::Query)?;
                let fields: NewAssignment = derive(&source)?;
                validate_new_assignment(&fields)?;
                self.store
                    .create_assignment(&fields)
                    .await
                    .map_err(CoreError::Mutation)
            }
        }))
        .await;

        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(created) => outcome.record_created(id, created.id),
                Err(err) => outcome.record_failure(id, err),
            }
        }

        if outcome.affected() > 0 {
            self.cache.invalidate_all();
        }
        outcome.finish()
    }
}
