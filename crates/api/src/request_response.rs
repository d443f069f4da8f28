// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use crate::error::ApiError;
use staffplan::{BulkOperation, BulkOutcome};
use staffplan_audit::{AuditEntry, FieldChange};
use staffplan_domain::{
    AllocationFilters, AssignmentId, AssignmentPatch, BillTypeId, CalendarDay, NewAssignment,
    PagedResult, Percentage, ProfileId, ProjectId, QueryScope, ResourceAssignment, ViewMode,
    iso_date, parse_iso_date,
};
use time::Date;

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_percentage(field: &str, value: f64) -> Result<Percentage, ApiError> {
    Ok(Percentage::parse(field, value)?)
}

fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Ok(parse_iso_date(field, value.trim())?)
}

fn parse_optional_date(field: &str, value: Option<&String>) -> Result<Option<Date>, ApiError> {
    non_empty(value)
        .map(|value| parse_date(field, value))
        .transpose()
}

/// Parses a path or body assignment id.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the id is blank.
pub fn parse_assignment_id(value: &str) -> Result<AssignmentId, ApiError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("id"),
            message: String::from("Assignment id must not be empty"),
        });
    }
    Ok(AssignmentId::new(trimmed))
}

/// API request for one page of assignments.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsRequest {
    /// Raw filter, sort and page state.
    #[serde(flatten)]
    pub filters: AllocationFilters,
    /// The tab scope; unscoped when absent.
    #[serde(default)]
    pub scope: QueryScope,
}

/// API response for one page of assignments.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsResponse {
    /// The assignments on this page.
    pub items: Vec<ResourceAssignment>,
    /// Assignments in scope before filtering.
    pub total_count: u64,
    /// Assignments matching the filters.
    pub filtered_count: u64,
    /// The returned page, 1-based.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Number of pages.
    pub page_count: u32,
    /// Whether the page was served from the cache.
    pub from_cache: bool,
}

impl ListAssignmentsResponse {
    /// Wraps a result page.
    #[must_use]
    pub fn new(page: PagedResult<ResourceAssignment>, from_cache: bool) -> Self {
        Self {
            items: page.items,
            total_count: page.total_count,
            filtered_count: page.filtered_count,
            page: page.page,
            page_size: page.page_size,
            page_count: page.page_count,
            from_cache,
        }
    }
}

/// API request for the calendar view.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRequest {
    /// Raw filter state selecting the assignments. Paging is ignored.
    #[serde(flatten)]
    pub filters: AllocationFilters,
    /// The tab scope; unscoped when absent.
    #[serde(default)]
    pub scope: QueryScope,
    /// The window granularity.
    #[serde(default)]
    pub view_mode: ViewMode,
    /// Any date inside the requested window, `yyyy-MM-dd`.
    pub anchor_date: String,
    /// Whether completed assignments are dropped first.
    #[serde(default)]
    pub active_only: bool,
}

/// API response for the calendar view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    /// The window granularity.
    pub view_mode: ViewMode,
    /// First date of the window.
    #[serde(with = "iso_date")]
    pub window_start: Date,
    /// Last date of the window, inclusive.
    #[serde(with = "iso_date")]
    pub window_end: Date,
    /// Number of days on which at least one employee is over-allocated.
    pub over_allocated_days: usize,
    /// One entry per day of the window.
    pub days: Vec<CalendarDay>,
}

impl CalendarResponse {
    /// Builds the response for a computed calendar.
    #[must_use]
    pub fn new(
        view_mode: ViewMode,
        window_start: Date,
        window_end: Date,
        days: Vec<CalendarDay>,
    ) -> Self {
        let over_allocated_days: usize =
            days.iter().filter(|day| day.over_allocated_count > 0).count();
        Self {
            view_mode,
            window_start,
            window_end,
            over_allocated_days,
            days,
        }
    }
}

/// API request to create an assignment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    /// The employee.
    pub profile_id: String,
    /// The project, if any.
    #[serde(default)]
    pub project_id: Option<String>,
    /// The bill type, if any.
    #[serde(default)]
    pub bill_type_id: Option<String>,
    /// Engagement percentage.
    pub engagement_percentage: f64,
    /// Billing percentage; zero when absent.
    #[serde(default)]
    pub billing_percentage: Option<f64>,
    /// First day, `yyyy-MM-dd`.
    pub engagement_start_date: String,
    /// Last day, `yyyy-MM-dd`; open-ended when absent or empty.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Whether this is speculative capacity.
    #[serde(default)]
    pub is_forecasted: bool,
}

impl CreateAssignmentRequest {
    /// Translates the request into domain fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank profile, a malformed date
    /// or an invalid percentage.
    pub fn into_new_assignment(self) -> Result<NewAssignment, ApiError> {
        let profile_id: &str = self.profile_id.trim();
        if profile_id.is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("profileId"),
                message: String::from("An employee is required"),
            });
        }

        Ok(NewAssignment {
            profile_id: ProfileId::new(profile_id),
            project_id: non_empty(self.project_id.as_ref()).map(ProjectId::new),
            bill_type_id: non_empty(self.bill_type_id.as_ref()).map(BillTypeId::new),
            engagement_percentage: parse_percentage(
                "engagementPercentage",
                self.engagement_percentage,
            )?,
            billing_percentage: self
                .billing_percentage
                .map(|value| parse_percentage("billingPercentage", value))
                .transpose()?
                .unwrap_or_default(),
            engagement_start_date: parse_date("engagementStartDate", &self.engagement_start_date)?,
            release_date: parse_optional_date("releaseDate", self.release_date.as_ref())?,
            is_forecasted: self.is_forecasted,
        })
    }
}

/// API request for an inline edit.
///
/// Absent fields are left unchanged. Nullable fields are cleared with the
/// matching `clear*` flag.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAssignmentRequest {
    /// New employee.
    pub profile_id: Option<String>,
    /// New project.
    pub project_id: Option<String>,
    /// Unassign the project.
    pub clear_project: bool,
    /// New bill type.
    pub bill_type_id: Option<String>,
    /// Clear the bill type.
    pub clear_bill_type: bool,
    /// New engagement percentage.
    pub engagement_percentage: Option<f64>,
    /// New billing percentage.
    pub billing_percentage: Option<f64>,
    /// New start date, `yyyy-MM-dd`.
    pub engagement_start_date: Option<String>,
    /// New release date, `yyyy-MM-dd`.
    pub release_date: Option<String>,
    /// Make the assignment open-ended.
    pub clear_release_date: bool,
    /// New forecast flag.
    pub is_forecasted: Option<bool>,
}

fn set_or_clear<T>(
    field: &str,
    value: Option<T>,
    clear: bool,
) -> Result<Option<Option<T>>, ApiError> {
    match (value, clear) {
        (Some(_), true) => Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("A value cannot be set and cleared in the same edit"),
        }),
        (Some(value), false) => Ok(Some(Some(value))),
        (None, true) => Ok(Some(None)),
        (None, false) => Ok(None),
    }
}

impl UpdateAssignmentRequest {
    /// Translates the request into a patch.
    ///
    /// Lifecycle flags are not editable here; they change only through the
    /// validate and complete actions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for malformed values or a field that
    /// is both set and cleared.
    pub fn into_patch(self) -> Result<AssignmentPatch, ApiError> {
        let profile_id: Option<ProfileId> = match self.profile_id.as_ref() {
            Some(value) => match non_empty(Some(value)) {
                Some(value) => Some(ProfileId::new(value)),
                None => {
                    return Err(ApiError::InvalidInput {
                        field: String::from("profileId"),
                        message: String::from("An employee is required"),
                    });
                }
            },
            None => None,
        };

        Ok(AssignmentPatch {
            profile_id,
            project_id: set_or_clear(
                "projectId",
                non_empty(self.project_id.as_ref()).map(ProjectId::new),
                self.clear_project,
            )?,
            bill_type_id: set_or_clear(
                "billTypeId",
                non_empty(self.bill_type_id.as_ref()).map(BillTypeId::new),
                self.clear_bill_type,
            )?,
            engagement_percentage: self
                .engagement_percentage
                .map(|value| parse_percentage("engagementPercentage", value))
                .transpose()?,
            billing_percentage: self
                .billing_percentage
                .map(|value| parse_percentage("billingPercentage", value))
                .transpose()?,
            engagement_start_date: parse_optional_date(
                "engagementStartDate",
                self.engagement_start_date.as_ref(),
            )?,
            release_date: set_or_clear(
                "releaseDate",
                parse_optional_date("releaseDate", self.release_date.as_ref())?,
                self.clear_release_date,
            )?,
            engagement_complete: None,
            weekly_validation: None,
            is_forecasted: self.is_forecasted,
        })
    }
}

/// API request to mark an assignment complete.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteAssignmentRequest {
    /// New release date, `yyyy-MM-dd`; the current one is kept when absent.
    pub release_date: Option<String>,
}

impl CompleteAssignmentRequest {
    /// Parses the optional release date.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a malformed date.
    pub fn release_date(&self) -> Result<Option<Date>, ApiError> {
        parse_optional_date("releaseDate", self.release_date.as_ref())
    }
}

/// API response carrying one assignment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    /// The assignment after the operation.
    pub assignment: ResourceAssignment,
    /// A success message.
    pub message: String,
}

/// API response for a delete.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssignmentResponse {
    /// The deleted assignment.
    pub id: AssignmentId,
    /// A success message.
    pub message: String,
}

/// API response for a single lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    /// The assignment after the transition.
    pub assignment: ResourceAssignment,
    /// `1` if the assignment changed, `0` if it was already in the target state.
    pub affected: usize,
    /// A success message.
    pub message: String,
}

/// The bulk operations a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    /// Delete the selection.
    Delete,
    /// Complete the selection.
    Complete,
    /// Validate the selection.
    Validate,
    /// Invalidate the selection.
    Invalidate,
    /// Copy the selection onto next month.
    DuplicateForward,
    /// Copy the selection unchanged.
    CopyExact,
}

impl From<BulkAction> for BulkOperation {
    fn from(action: BulkAction) -> Self {
        match action {
            BulkAction::Delete => Self::Delete,
            BulkAction::Complete => Self::Complete,
            BulkAction::Validate => Self::Validate,
            BulkAction::Invalidate => Self::Invalidate,
            BulkAction::DuplicateForward => Self::DuplicateForward,
            BulkAction::CopyExact => Self::CopyExact,
        }
    }
}

/// API request for a bulk operation over a selection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    /// The operation.
    pub operation: BulkAction,
    /// The selected ids.
    pub ids: Vec<AssignmentId>,
}

/// One failed id of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailureInfo {
    /// The selected id.
    pub id: AssignmentId,
    /// Why it failed.
    pub reason: String,
}

/// API response for a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcomeResponse {
    /// The operation performed.
    pub operation: String,
    /// Distinct ids in the selection.
    pub requested: usize,
    /// Ids that were changed.
    pub succeeded_ids: Vec<AssignmentId>,
    /// Ids already in the target state.
    pub skipped_ids: Vec<AssignmentId>,
    /// Ids that failed.
    pub failed: Vec<BulkFailureInfo>,
    /// Records created by duplicate and copy operations.
    pub created_ids: Vec<AssignmentId>,
    /// One-line summary, e.g. `12 of 14 succeeded, 2 failed`.
    pub summary: String,
    /// Whether no id failed.
    pub success: bool,
}

impl From<BulkOutcome> for BulkOutcomeResponse {
    fn from(outcome: BulkOutcome) -> Self {
        let summary: String = outcome.summary();
        let success: bool = outcome.is_success();
        Self {
            operation: outcome.operation.to_string(),
            requested: outcome.requested,
            succeeded_ids: outcome.succeeded_ids,
            skipped_ids: outcome.skipped_ids,
            failed: outcome
                .failed
                .into_iter()
                .map(|failure| BulkFailureInfo {
                    id: failure.id,
                    reason: failure.reason,
                })
                .collect(),
            created_ids: outcome.created_ids,
            summary,
            success,
        }
    }
}

/// API request for one page of an assignment's audit history.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditHistoryRequest {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
}

/// One audit entry, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryInfo {
    /// Entry identifier.
    pub id: String,
    /// Display name of the actor, or its id when it has none.
    pub actor: String,
    /// `create`, `update` or `delete`.
    pub action: String,
    /// When the change was recorded, RFC 3339.
    pub recorded_at: String,
    /// Changed fields.
    pub changes: Vec<FieldChange>,
}

impl AuditEntryInfo {
    /// Flattens an entry. Returns `None` if its timestamp cannot be formatted.
    #[must_use]
    pub fn from_entry(entry: &AuditEntry) -> Option<Self> {
        let recorded_at: String = entry
            .recorded_at
            .format(&time::format_description::well_known::Rfc3339)
            .ok()?;
        Some(Self {
            id: entry.id.clone(),
            actor: entry
                .actor
                .display_name
                .clone()
                .unwrap_or_else(|| entry.actor.id.clone()),
            action: entry.action.to_string(),
            recorded_at,
            changes: entry.changes(),
        })
    }
}

/// API response for an assignment's audit history.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditHistoryResponse {
    /// The assignment the history belongs to.
    pub assignment_id: AssignmentId,
    /// Entries on this page, newest first.
    pub entries: Vec<AuditEntryInfo>,
    /// Entries across all pages.
    pub total_count: u64,
    /// The returned page.
    pub page: u32,
    /// Number of pages.
    pub page_count: u32,
}

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable error category.
    pub category: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            category: err.category().to_string(),
            message: err.to_string(),
        }
    }
}

/// Represents whether a specific action is permitted.
///
/// This enum provides better type safety than raw booleans and serializes
/// to JSON as true/false for API compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(matches!(self, Self::Allowed))
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// Allocation actions the UI may expose to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCapabilities {
    /// View lists and calendars.
    pub can_view: Capability,
    /// View an assignment's audit history.
    pub can_view_history: Capability,
    /// Create assignments.
    pub can_create: Capability,
    /// Edit assignments inline.
    pub can_edit: Capability,
    /// Validate and invalidate assignments.
    pub can_validate: Capability,
    /// Complete assignments.
    pub can_complete: Capability,
    /// Duplicate and copy assignments.
    pub can_duplicate: Capability,
    /// Delete assignments.
    pub can_delete: Capability,
}
