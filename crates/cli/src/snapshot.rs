// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Snapshot and audit log files.
//!
//! A snapshot is either a bare JSON array of assignments or an object with
//! an `assignments` array, as exported by the planner. An audit log file is
//! a JSON array of audit entries.

use serde::Deserialize;
use staffplan_audit::AuditEntry;
use staffplan_domain::ResourceAssignment;
use std::path::Path;
use tracing::info;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Bare(Vec<ResourceAssignment>),
    Wrapped { assignments: Vec<ResourceAssignment> },
}

/// Errors reading or writing snapshot files.
#[derive(Debug)]
pub enum SnapshotError {
    /// The file could not be read or written.
    Io {
        /// The file involved.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The file is not valid JSON of the expected shape.
    Format {
        /// The file involved.
        path: String,
        /// The underlying error.
        source: serde_json::Error,
    },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Cannot access '{path}': {source}"),
            Self::Format { path, source } => write!(f, "Invalid JSON in '{path}': {source}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format { source, .. } => Some(source),
        }
    }
}

fn read(path: &Path) -> Result<String, SnapshotError> {
    std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parses snapshot text.
///
/// # Errors
///
/// Returns the JSON error if the text is not a snapshot.
pub fn parse_snapshot(text: &str) -> Result<Vec<ResourceAssignment>, serde_json::Error> {
    let file: SnapshotFile = serde_json::from_str(text)?;
    Ok(match file {
        SnapshotFile::Bare(assignments) | SnapshotFile::Wrapped { assignments } => assignments,
    })
}

/// Loads the assignments of a snapshot file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_snapshot(path: &Path) -> Result<Vec<ResourceAssignment>, SnapshotError> {
    let assignments = parse_snapshot(&read(path)?).map_err(|source| SnapshotError::Format {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), count = assignments.len(), "Loaded assignment snapshot");
    Ok(assignments)
}

/// Writes assignments as a bare JSON array.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_snapshot(path: &Path, assignments: &[ResourceAssignment]) -> Result<(), SnapshotError> {
    let text = serde_json::to_string_pretty(assignments).map_err(|source| {
        SnapshotError::Format {
            path: path.display().to_string(),
            source,
        }
    })?;
    std::fs::write(path, text).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), count = assignments.len(), "Wrote assignment snapshot");
    Ok(())
}

/// Loads an audit log export.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_audit_log(path: &Path) -> Result<Vec<AuditEntry>, SnapshotError> {
    serde_json::from_str(&read(path)?).map_err(|source| SnapshotError::Format {
        path: path.display().to_string(),
        source,
    })
}
