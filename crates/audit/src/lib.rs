// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! Audit trail types.
//!
//! The audit log is written by the store, never by this workspace. Entries
//! are read through `AuditLogReader` and shown as they are.

mod reader;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use staffplan_domain::{AssignmentId, DEFAULT_PAGE_SIZE, page_count};
use std::collections::BTreeSet;
use time::OffsetDateTime;

pub use reader::{AuditLogReader, AuditReadError, StaticAuditLog};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiated a recorded change.
/// This could be a user, a system process, or an import job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "user", "system").
    pub actor_type: String,
    /// Human readable name, when the log resolved one.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self {
            id,
            actor_type,
            display_name: None,
        }
    }
}

/// The kind of change an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// A record was created; there is no `before` snapshot.
    Create,
    /// A record was changed.
    Update,
    /// A record was removed; there is no `after` snapshot.
    Delete,
}

impl AuditAction {
    /// Returns the action name as written in the log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enriched view of a record at one point in time.
///
/// Enriched means foreign keys are already resolved to display values by
/// the log (a profile id next to the employee's name, for instance), so the
/// snapshot is shown without further lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot {
    fields: Map<String, Value>,
}

impl StateSnapshot {
    /// Creates a snapshot from a field map.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Returns a single field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Iterates field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}

/// One field that differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Field name.
    pub field: String,
    /// Value before, `None` if the field did not exist.
    pub before: Option<Value>,
    /// Value after, `None` if the field no longer exists.
    pub after: Option<Value>,
}

/// An immutable audit log entry for one recorded change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Entry identifier assigned by the log.
    pub id: String,
    /// The changed record's identifier.
    pub entity_id: AssignmentId,
    /// Who made the change.
    pub actor: Actor,
    /// What kind of change it was.
    pub action: AuditAction,
    /// The record before the change.
    #[serde(default)]
    pub before: Option<StateSnapshot>,
    /// The record after the change.
    #[serde(default)]
    pub after: Option<StateSnapshot>,
    /// When the change was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl AuditEntry {
    /// Lists the fields that differ between `before` and `after`, ordered
    /// by field name.
    ///
    /// A create lists every field of `after`; a delete every field of
    /// `before`.
    #[must_use]
    pub fn changes(&self) -> Vec<FieldChange> {
        let empty = StateSnapshot::default();
        let before = self.before.as_ref().unwrap_or(&empty);
        let after = self.after.as_ref().unwrap_or(&empty);

        let names: BTreeSet<&String> = before.field_names().chain(after.field_names()).collect();

        names
            .into_iter()
            .filter_map(|name| {
                let old = before.field(name);
                let new = after.field(name);
                (old != new).then(|| FieldChange {
                    field: name.clone(),
                    before: old.cloned(),
                    after: new.cloned(),
                })
            })
            .collect()
    }
}

/// Filter and page parameters for reading the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLogQuery {
    /// Only entries about this record.
    pub entity_id: Option<AssignmentId>,
    /// Only entries by this actor.
    pub actor_id: Option<String>,
    /// Only entries of this kind.
    pub action: Option<AuditAction>,
    /// Earliest recording time, inclusive.
    #[serde(with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    /// Latest recording time, inclusive.
    #[serde(with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
    /// 1-indexed page.
    pub page: u32,
    /// Entries per page.
    pub page_size: u32,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            entity_id: None,
            actor_id: None,
            action: None,
            from: None,
            to: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AuditLogQuery {
    /// The first page of one assignment's history.
    #[must_use]
    pub fn for_assignment(id: AssignmentId) -> Self {
        Self {
            entity_id: Some(id),
            ..Self::default()
        }
    }

    /// Returns whether an entry satisfies every filter.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.entity_id.as_ref().is_none_or(|id| *id == entry.entity_id)
            && self.actor_id.as_ref().is_none_or(|id| *id == entry.actor.id)
            && self.action.is_none_or(|action| action == entry.action)
            && self.from.is_none_or(|from| entry.recorded_at >= from)
            && self.to.is_none_or(|to| entry.recorded_at <= to)
    }
}

/// One page of audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    /// Entries on this page, newest first.
    pub entries: Vec<AuditEntry>,
    /// Entries matching the filters.
    pub total_count: u64,
    /// 1-indexed page.
    pub page: u32,
    /// Entries per page.
    pub page_size: u32,
    /// Number of pages for `total_count`.
    pub page_count: u32,
}

impl AuditPage {
    /// Builds a page for `query`, deriving `page_count`.
    #[must_use]
    pub fn new(entries: Vec<AuditEntry>, total_count: u64, query: &AuditLogQuery) -> Self {
        Self {
            entries,
            total_count,
            page: query.page,
            page_size: query.page_size,
            page_count: page_count(total_count, query.page_size),
        }
    }
}
