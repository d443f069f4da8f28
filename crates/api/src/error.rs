// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use staffplan::{CoreError, StoreError};
use staffplan_audit::AuditReadError;
use staffplan_domain::DomainError;
use thiserror::Error;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Every variant maps to one stable category string, see `category`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or inconsistent input, rejected before any remote call.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A remote read failed.
    #[error("Query failed: {message}")]
    QueryFailed {
        /// A human-readable description of the failure.
        message: String,
    },
    /// A create, update or delete was rejected.
    #[error("Mutation failed: {message}")]
    MutationFailed {
        /// A human-readable description of the failure.
        message: String,
    },
    /// The permission gate does not allow the action.
    #[error("Forbidden: '{action}' requires the {required} permission")]
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The permission required for this action.
        required: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable category of this error.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::QueryFailed { .. } => "query_failed",
            Self::MutationFailed { .. } => "mutation_failed",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    let field: String = match err {
        DomainError::InvalidDate { field, .. } | DomainError::InvalidPercentage { field, .. } => {
            field
        }
        DomainError::ReleaseBeforeStart { .. } => String::from("releaseDate"),
        DomainError::InvalidWindow { .. } => String::from("window"),
        DomainError::InvalidIdentifier(_) => String::from("id"),
        DomainError::InvalidSortDirection(_) => String::from("sortDirection"),
        DomainError::InvalidViewMode(_) => String::from("viewMode"),
        DomainError::DateArithmeticOverflow { .. } => String::from("date"),
        DomainError::AssignmentComplete { .. } => {
            return ApiError::MutationFailed { message };
        }
    };
    ApiError::InvalidInput { field, message }
}

fn translate_store_error(err: StoreError, failed: impl FnOnce(String) -> ApiError) -> ApiError {
    match err {
        StoreError::NotFound(id) => ApiError::NotFound {
            resource_type: String::from("Assignment"),
            message: format!("Assignment {id} does not exist"),
        },
        other => failed(other.to_string()),
    }
}

/// Translates a core error into an API error.
///
/// Remote authorization rejections stay in their query or mutation category;
/// `Forbidden` is reserved for the local permission gate.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::Validation(domain_err) => translate_domain_error(domain_err),
        CoreError::LifecycleRejected { reason, .. } => ApiError::MutationFailed {
            message: reason.to_string(),
        },
        CoreError::Query(store_err) => {
            translate_store_error(store_err, |message| ApiError::QueryFailed { message })
        }
        CoreError::Mutation(store_err) => {
            translate_store_error(store_err, |message| ApiError::MutationFailed { message })
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<AuditReadError> for ApiError {
    fn from(err: AuditReadError) -> Self {
        // The local gate owns `Forbidden`; a refusal by the log is a failed read.
        Self::QueryFailed {
            message: err.to_string(),
        }
    }
}
