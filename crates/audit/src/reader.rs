// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AuditEntry, AuditLogQuery, AuditPage};
use async_trait::async_trait;

/// Errors reported by an audit log reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditReadError {
    /// The caller may not read the log.
    Unauthorized,
    /// The log could not be reached.
    Unavailable(String),
}

impl std::fmt::Display for AuditReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Not authorized to read the audit log"),
            Self::Unavailable(msg) => write!(f, "Audit log unavailable: {msg}"),
        }
    }
}

impl std::error::Error for AuditReadError {}

/// Read access to the externally maintained audit log.
#[async_trait]
pub trait AuditLogReader: Send + Sync {
    /// Reads one page of entries matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log rejects or cannot serve the read.
    async fn read(&self, query: &AuditLogQuery) -> Result<AuditPage, AuditReadError>;
}

/// A reader over a fixed set of entries, such as an exported log file.
#[derive(Debug, Clone, Default)]
pub struct StaticAuditLog {
    entries: Vec<AuditEntry>,
}

impl StaticAuditLog {
    /// Wraps a set of entries in any order.
    #[must_use]
    pub fn new(mut entries: Vec<AuditEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { entries }
    }
}

#[async_trait]
impl AuditLogReader for StaticAuditLog {
    async fn read(&self, query: &AuditLogQuery) -> Result<AuditPage, AuditReadError> {
        let matching: Vec<&AuditEntry> = self
            .entries
            .iter()
            .filter(|entry| query.matches(entry))
            .collect();

        let page_size: usize = usize::try_from(query.page_size.max(1)).unwrap_or(usize::MAX);
        let page: usize = usize::try_from(query.page.max(1) - 1).unwrap_or(usize::MAX);

        let entries: Vec<AuditEntry> = matching
            .iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .map(|entry| (*entry).clone())
            .collect();

        let total: u64 = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        Ok(AuditPage::new(entries, total, query))
    }
}
