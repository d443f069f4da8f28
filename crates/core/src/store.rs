// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The persistence collaborator.
//!
//! Every call is a remote call that resolves exactly once. Bulk calls report
//! one result per id; a failing id never hides the others.

use async_trait::async_trait;
use futures::future::join_all;
use staffplan_domain::{
    AllocationQuery, AssignmentFlag, AssignmentId, AssignmentPatch, NewAssignment, PagedResult,
    ResourceAssignment,
};

/// Errors reported by an assignment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No assignment has this id.
    NotFound(AssignmentId),
    /// The store refused the caller.
    Unauthorized(String),
    /// The write would break a store-side constraint.
    ConstraintViolation(String),
    /// The store could not be reached or failed internally.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Assignment {id} not found"),
            Self::Unauthorized(msg) => write!(f, "Not authorized: {msg}"),
            Self::ConstraintViolation(msg) => write!(f, "Constraint violation: {msg}"),
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The result of one id inside a bulk store call.
pub type IdResult = (AssignmentId, Result<(), StoreError>);

/// Remote persistence and query service for assignments.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Lists one page of assignments for a canonical query.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn list_assignments(
        &self,
        query: &AllocationQuery,
    ) -> Result<PagedResult<ResourceAssignment>, StoreError>;

    /// Fetches a single assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id, or any read failure.
    async fn get_assignment(&self, id: &AssignmentId) -> Result<ResourceAssignment, StoreError>;

    /// Creates an assignment and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    async fn create_assignment(
        &self,
        fields: &NewAssignment,
    ) -> Result<ResourceAssignment, StoreError>;

    /// Applies a partial update and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    async fn update_assignment(
        &self,
        id: &AssignmentId,
        patch: &AssignmentPatch,
    ) -> Result<ResourceAssignment, StoreError>;

    /// Deletes an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    async fn delete_assignment(&self, id: &AssignmentId) -> Result<(), StoreError>;

    /// Sets one lifecycle flag on every id.
    ///
    /// The default issues one update per id concurrently.
    async fn bulk_update_flag(
        &self,
        ids: &[AssignmentId],
        flag: AssignmentFlag,
        value: bool,
    ) -> Vec<IdResult> {
        let patch = AssignmentPatch::flag(flag, value);
        join_all(ids.iter().map(|id| {
            let patch = &patch;
            async move {
                let result = self.update_assignment(id, patch).await.map(|_| ());
                (id.clone(), result)
            }
        }))
        .await
    }

    /// Deletes every id.
    ///
    /// The default issues one delete per id concurrently.
    async fn bulk_delete(&self, ids: &[AssignmentId]) -> Vec<IdResult> {
        join_all(ids.iter().map(|id| async move {
            let result = self.delete_assignment(id).await;
            (id.clone(), result)
        }))
        .await
    }
}
