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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calendar;
mod dates;
mod duplicate;
mod error;
mod lifecycle;
mod query;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use calendar::{
    AllocationStatus, CalendarDay, ProfileLoad, ViewMode, ViewWindow, active_only,
    aggregate_calendar,
};
pub use dates::{
    ISO_DATE, first_day_of_month, first_day_of_next_month, format_iso_date, iso_date,
    last_day_of_month, next_month_span, parse_iso_date,
};
pub use duplicate::{copy_exact, duplicate_forward};
pub use error::DomainError;
pub use lifecycle::{
    CompletionState, LifecycleState, Transition, ValidationState, plan_complete, plan_invalidate,
    plan_validate,
};
pub use query::{
    AdvancedFilters, AllocationFilters, AllocationQuery, BasicFilters, DEFAULT_PAGE_SIZE,
    DateRange, PagedResult, PercentageRange, QueryScope, SortDirection, SortSpec, page_count,
};
pub use types::{
    AssignmentFlag, AssignmentId, AssignmentPatch, BillTypeId, NewAssignment, Percentage,
    ProfileId, ProjectId, ProjectSummary, ResourceAssignment,
};
pub use validation::{validate_interval, validate_new_assignment, validate_patch};
