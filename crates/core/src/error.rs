// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::store::StoreError;
use staffplan_domain::{AssignmentId, DomainError};

/// Errors surfaced by the planning core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Caller input was malformed. Raised before any remote call.
    Validation(DomainError),
    /// The lifecycle does not allow the transition.
    LifecycleRejected {
        /// The assignment.
        id: AssignmentId,
        /// Why the transition was refused.
        reason: DomainError,
    },
    /// A remote read failed.
    Query(StoreError),
    /// A remote write was rejected or failed.
    Mutation(StoreError),
}

impl CoreError {
    /// Returns whether the error was raised locally, before any remote call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "Validation failed: {err}"),
            Self::LifecycleRejected { reason, .. } => write!(f, "{reason}"),
            Self::Query(err) => write!(f, "Query failed: {err}"),
            Self::Mutation(err) => write!(f, "Mutation failed: {err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AssignmentComplete { id } => Self::LifecycleRejected {
                id: id.clone(),
                reason: DomainError::AssignmentComplete { id },
            },
            other => Self::Validation(other),
        }
    }
}
