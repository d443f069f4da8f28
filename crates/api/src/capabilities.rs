// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Permission gating for allocation actions.
//!
//! Authorization decisions are made elsewhere and arrive as three booleans.
//! Capabilities derived from them are advisory for the UI; every handler
//! still checks the gate before acting.

use crate::error::ApiError;
use crate::request_response::{AllocationCapabilities, Capability};
use staffplan::BulkOperation;
use tracing::debug;

/// The permissions an allocation action can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// View assignments, calendars and history.
    Read,
    /// Create, edit, validate, complete and duplicate assignments.
    Update,
    /// Delete assignments.
    Delete,
}

impl Permission {
    /// Returns the permission name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller's externally decided permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionGate {
    /// May read assignments.
    pub can_read: bool,
    /// May change assignments.
    pub can_update: bool,
    /// May delete assignments.
    pub can_delete: bool,
}

impl PermissionGate {
    /// Creates a gate.
    #[must_use]
    pub const fn new(can_read: bool, can_update: bool, can_delete: bool) -> Self {
        Self {
            can_read,
            can_update,
            can_delete,
        }
    }

    /// A gate allowing everything.
    #[must_use]
    pub const fn full() -> Self {
        Self::new(true, true, true)
    }

    /// A gate allowing reads only.
    #[must_use]
    pub const fn read_only() -> Self {
        Self::new(true, false, false)
    }

    /// Returns whether `permission` is granted.
    #[must_use]
    pub const fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => self.can_read,
            Permission::Update => self.can_update,
            Permission::Delete => self.can_delete,
        }
    }

    /// Checks `permission` for `action`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` if the permission is not granted.
    pub fn require(&self, action: &str, permission: Permission) -> Result<(), ApiError> {
        if self.allows(permission) {
            return Ok(());
        }
        debug!(action, permission = %permission, "Action denied by permission gate");
        Err(ApiError::Forbidden {
            action: action.to_string(),
            required: permission.to_string(),
        })
    }
}

/// The permission a bulk operation requires.
#[must_use]
pub const fn required_permission(operation: BulkOperation) -> Permission {
    match operation {
        BulkOperation::Delete => Permission::Delete,
        BulkOperation::Complete
        | BulkOperation::Validate
        | BulkOperation::Invalidate
        | BulkOperation::DuplicateForward
        | BulkOperation::CopyExact => Permission::Update,
    }
}

/// Computes which allocation actions the UI should expose.
///
/// Nothing is exposed to a caller who cannot read.
#[must_use]
pub const fn compute_capabilities(gate: &PermissionGate) -> AllocationCapabilities {
    let read: bool = gate.can_read;
    let update: bool = read && gate.can_update;
    let delete: bool = read && gate.can_delete;
    AllocationCapabilities {
        can_view: Capability::from_bool(read),
        can_view_history: Capability::from_bool(read),
        can_create: Capability::from_bool(update),
        can_edit: Capability::from_bool(update),
        can_validate: Capability::from_bool(update),
        can_complete: Capability::from_bool(update),
        can_duplicate: Capability::from_bool(update),
        can_delete: Capability::from_bool(delete),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_gate_allows_everything() {
        let caps = compute_capabilities(&PermissionGate::full());
        assert!(caps.can_view.is_allowed());
        assert!(caps.can_edit.is_allowed());
        assert!(caps.can_delete.is_allowed());
    }

    #[test]
    fn test_read_only_gate_exposes_no_mutations() {
        let caps = compute_capabilities(&PermissionGate::read_only());
        assert!(caps.can_view.is_allowed());
        assert!(caps.can_view_history.is_allowed());
        assert_eq!(caps.can_create, Capability::Denied);
        assert_eq!(caps.can_validate, Capability::Denied);
        assert_eq!(caps.can_delete, Capability::Denied);
    }

    #[test]
    fn test_no_read_hides_mutations_too() {
        let caps = compute_capabilities(&PermissionGate::new(false, true, true));
        assert_eq!(caps.can_edit, Capability::Denied);
        assert_eq!(caps.can_delete, Capability::Denied);
    }

    #[test]
    fn test_bulk_delete_requires_delete() {
        assert_eq!(required_permission(BulkOperation::Delete), Permission::Delete);
        assert_eq!(
            required_permission(BulkOperation::DuplicateForward),
            Permission::Update
        );
    }

    #[test]
    fn test_require_reports_action_and_permission() {
        let err = PermissionGate::read_only()
            .require("delete assignment", Permission::Delete)
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Forbidden {
                action: String::from("delete assignment"),
                required: String::from("delete"),
            }
        );
    }
}
