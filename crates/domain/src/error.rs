// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::AssignmentId;

/// Errors that can occur during domain validation.
///
/// Every variant is raised locally, before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A date string is not a valid ISO `yyyy-MM-dd` date.
    InvalidDate {
        /// The filter or field the date was supplied for.
        field: String,
        /// The rejected input.
        value: String,
        /// The parser's error message.
        error: String,
    },
    /// An assignment's release date precedes its start date.
    ReleaseBeforeStart {
        /// The engagement start date.
        start: time::Date,
        /// The offending release date.
        release: time::Date,
    },
    /// A calendar window ends before it starts.
    InvalidWindow {
        /// The window start.
        start: time::Date,
        /// The window end.
        end: time::Date,
    },
    /// A percentage is negative, not finite, or out of representable range.
    InvalidPercentage {
        /// The filter or field the percentage was supplied for.
        field: String,
        /// Description of the problem.
        reason: String,
    },
    /// A required identifier is empty.
    InvalidIdentifier(String),
    /// Sort direction is neither `asc` nor `desc`.
    InvalidSortDirection(String),
    /// Calendar view mode is not one of `day`, `week`, `month`, `quarter`.
    InvalidViewMode(String),
    /// The assignment is complete and no longer accepts validation changes.
    AssignmentComplete {
        /// The completed assignment.
        id: AssignmentId,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate {
                field,
                value,
                error,
            } => {
                write!(
                    f,
                    "Invalid date '{value}' for '{field}': {error} (expected yyyy-MM-dd)"
                )
            }
            Self::ReleaseBeforeStart { start, release } => {
                write!(
                    f,
                    "Release date {release} is before engagement start date {start}"
                )
            }
            Self::InvalidWindow { start, end } => {
                write!(f, "Calendar window ends ({end}) before it starts ({start})")
            }
            Self::InvalidPercentage { field, reason } => {
                write!(f, "Invalid percentage for '{field}': {reason}")
            }
            Self::InvalidIdentifier(msg) => write!(f, "Invalid identifier: {msg}"),
            Self::InvalidSortDirection(value) => {
                write!(
                    f,
                    "Invalid sort direction '{value}'. Must be 'asc' or 'desc'"
                )
            }
            Self::InvalidViewMode(value) => {
                write!(
                    f,
                    "Invalid view mode '{value}'. Must be one of day, week, month, quarter"
                )
            }
            Self::AssignmentComplete { id } => {
                write!(
                    f,
                    "Assignment {id} is complete and cannot change validation state"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
