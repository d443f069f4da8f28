// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::cache::AllocationCache;
use crate::error::CoreError;
use crate::store::AssignmentStore;
use staffplan_domain::{
    AssignmentId, AssignmentPatch, NewAssignment, ResourceAssignment, validate_new_assignment,
    validate_patch,
};
use std::sync::Arc;
use tracing::debug;

/// Single-record create, edit and delete.
///
/// Input is validated locally before any write. Concurrent edits of the
/// same record are last-writer-wins.
pub struct AssignmentEditor {
    store: Arc<dyn AssignmentStore>,
    cache: Arc<AllocationCache>,
}

impl AssignmentEditor {
    /// Creates the editor.
    #[must_use]
    pub const fn new(store: Arc<dyn AssignmentStore>, cache: Arc<AllocationCache>) -> Self {
        Self { store, cache }
    }

    /// Creates an assignment. The new record starts unvalidated and active.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for inconsistent fields, or
    /// `CoreError::Mutation` if the store rejects the write.
    pub async fn create(&self, fields: &NewAssignment) -> Result<ResourceAssignment, CoreError> {
        validate_new_assignment(fields)?;

        let created = self
            .store
            .create_assignment(fields)
            .await
            .map_err(CoreError::Mutation)?;

        self.cache.invalidate_all();
        Ok(created)
    }

    /// Applies an inline edit.
    ///
    /// An empty patch returns the current record without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The current record cannot be read (`Query`)
    /// - The merged record would be inconsistent (`Validation`)
    /// - The store rejects the write (`Mutation`)
    pub async fn update(
        &self,
        id: &AssignmentId,
        patch: &AssignmentPatch,
    ) -> Result<ResourceAssignment, CoreError> {
        let current = self
            .store
            .get_assignment(id)
            .await
            .map_err(CoreError::Query)?;

        if patch.is_empty() {
            debug!(id = %id, "Empty edit, nothing to write");
            return Ok(current);
        }

        validate_patch(&current, patch)?;

        let updated = self
            .store
            .update_assignment(id, patch)
            .await
            .map_err(CoreError::Mutation)?;

        // Any edited field can move the record into or out of a selection.
        self.cache.invalidate_all();
        Ok(updated)
    }

    /// Deletes an assignment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Mutation` if the store rejects the delete.
    pub async fn delete(&self, id: &AssignmentId) -> Result<(), CoreError> {
        self.store
            .delete_assignment(id)
            .await
            .map_err(CoreError::Mutation)?;
        self.cache.invalidate_all();
        Ok(())
    }
}
