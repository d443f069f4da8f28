// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocation query normalization.
//!
//! UI filter state arrives as loosely-typed optional strings and numbers.
//! `AllocationQuery::normalize` turns it into a canonical value with two
//! guarantees:
//!
//! - every "no filter" spelling (`None`, `""`, whitespace) maps to `None`,
//!   so structurally equal queries compare and hash equal
//! - every malformed value is rejected here, before any remote call
//!
//! `min <= max` is deliberately not checked; range consistency is left to
//! the store.

use crate::dates::{iso_date, parse_iso_date};
use crate::error::DomainError;
use crate::types::{BillTypeId, Percentage, ProfileId, ResourceAssignment};
use serde::{Deserialize, Serialize};
use time::Date;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filters shared by every tab and remembered between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicFilters {
    /// Free text matched against employee, project and client.
    pub search_text: Option<String>,
    /// Strategic business unit.
    pub sbu_id: Option<String>,
    /// Project manager.
    pub manager_id: Option<String>,
    /// Bill type.
    pub bill_type_id: Option<String>,
    /// Free text matched against the project.
    pub project_search: Option<String>,
}

impl BasicFilters {
    /// Returns these filters with text trimmed and blank values dropped, as
    /// they appear in a canonical query.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            search_text: normalize_text(self.search_text.as_ref()),
            sbu_id: normalize_text(self.sbu_id.as_ref()),
            manager_id: normalize_text(self.manager_id.as_ref()),
            bill_type_id: normalize_text(self.bill_type_id.as_ref()),
            project_search: normalize_text(self.project_search.as_ref()),
        }
    }
}

/// Range filters owned by a single tab.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedFilters {
    /// Lower engagement bound.
    pub min_engagement: Option<f64>,
    /// Upper engagement bound.
    pub max_engagement: Option<f64>,
    /// Lower billing bound.
    pub min_billing: Option<f64>,
    /// Upper billing bound.
    pub max_billing: Option<f64>,
    /// Earliest start date (`yyyy-MM-dd`).
    pub start_date_from: Option<String>,
    /// Latest start date (`yyyy-MM-dd`).
    pub start_date_to: Option<String>,
    /// Earliest release date (`yyyy-MM-dd`).
    pub end_date_from: Option<String>,
    /// Latest release date (`yyyy-MM-dd`).
    pub end_date_to: Option<String>,
}

/// Raw filter, sort and page state as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationFilters {
    /// Free text matched against employee, project and client.
    pub search_text: Option<String>,
    /// Strategic business unit.
    pub sbu_id: Option<String>,
    /// Project manager.
    pub manager_id: Option<String>,
    /// Bill type.
    pub bill_type_id: Option<String>,
    /// Free text matched against the project.
    pub project_search: Option<String>,
    /// Lower engagement bound.
    pub min_engagement: Option<f64>,
    /// Upper engagement bound.
    pub max_engagement: Option<f64>,
    /// Lower billing bound.
    pub min_billing: Option<f64>,
    /// Upper billing bound.
    pub max_billing: Option<f64>,
    /// Earliest start date.
    pub start_date_from: Option<String>,
    /// Latest start date.
    pub start_date_to: Option<String>,
    /// Earliest release date.
    pub end_date_from: Option<String>,
    /// Latest release date.
    pub end_date_to: Option<String>,
    /// Opaque sort key, passed through to the store.
    pub sort_field: Option<String>,
    /// `asc` or `desc`.
    pub sort_direction: Option<String>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
}

impl AllocationFilters {
    /// Composes raw filters from a shared basic filter set and a tab's own
    /// advanced filters, sort and pagination.
    #[must_use]
    pub fn compose(
        basic: &BasicFilters,
        advanced: &AdvancedFilters,
        sort: Option<&(String, String)>,
        page: u32,
        page_size: u32,
    ) -> Self {
        Self {
            search_text: basic.search_text.clone(),
            sbu_id: basic.sbu_id.clone(),
            manager_id: basic.manager_id.clone(),
            bill_type_id: basic.bill_type_id.clone(),
            project_search: basic.project_search.clone(),
            min_engagement: advanced.min_engagement,
            max_engagement: advanced.max_engagement,
            min_billing: advanced.min_billing,
            max_billing: advanced.max_billing,
            start_date_from: advanced.start_date_from.clone(),
            start_date_to: advanced.start_date_to.clone(),
            end_date_from: advanced.end_date_from.clone(),
            end_date_to: advanced.end_date_to.clone(),
            sort_field: sort.map(|(field, _)| field.clone()),
            sort_direction: sort.map(|(_, direction)| direction.clone()),
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Parses `asc`/`desc`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSortDirection` for any other value.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(DomainError::InvalidSortDirection(value.to_string())),
        }
    }
}

/// A sort key plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Opaque field reference, possibly into a related entity.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// The fixed subset of assignments a tab works over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryScope {
    /// No scope restriction.
    #[default]
    All,
    /// Assignments on a real, non-forecast project.
    Planned,
    /// Assignments still open for weekly validation.
    Validation,
    /// Forecast assignments and assignments without a project.
    Unplanned,
}

impl QueryScope {
    /// Returns whether the assignment belongs to this scope.
    #[must_use]
    pub const fn admits(&self, assignment: &ResourceAssignment) -> bool {
        match self {
            Self::All => true,
            Self::Planned => assignment.is_planned(),
            Self::Validation => assignment.is_active(),
            Self::Unplanned => !assignment.is_planned(),
        }
    }
}

/// An inclusive percentage range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PercentageRange {
    /// Lower bound.
    pub min: Option<Percentage>,
    /// Upper bound.
    pub max: Option<Percentage>,
}

impl PercentageRange {
    /// Returns whether `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: Percentage) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// An inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest date.
    #[serde(default, with = "iso_date::option")]
    pub from: Option<Date>,
    /// Latest date.
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
}

impl DateRange {
    /// Returns whether the range restricts anything.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Returns whether `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Returns whether an optional end date lies within the range.
    ///
    /// A missing end date is treated as unbounded: it satisfies any lower
    /// bound and no upper bound.
    #[must_use]
    pub fn contains_open_end(&self, date: Option<Date>) -> bool {
        date.map_or(self.to.is_none(), |date| self.contains(date))
    }
}

/// A canonical, hashable allocation query.
///
/// Two queries built from inputs that differ only in how "no filter" is
/// spelled are equal and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationQuery {
    /// Tab scope.
    pub scope: QueryScope,
    /// Trimmed free text.
    pub search_text: Option<String>,
    /// Strategic business unit.
    pub sbu_id: Option<String>,
    /// Project manager.
    pub manager_id: Option<ProfileId>,
    /// Bill type.
    pub bill_type_id: Option<BillTypeId>,
    /// Trimmed project search text.
    pub project_search: Option<String>,
    /// Engagement percentage bounds.
    pub engagement: PercentageRange,
    /// Billing percentage bounds.
    pub billing: PercentageRange,
    /// Start date bounds.
    pub start_date: DateRange,
    /// Release date bounds.
    pub end_date: DateRange,
    /// Sort order, if any.
    pub sort: Option<SortSpec>,
    /// 1-indexed page.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
}

/// Maps every empty spelling of a text filter to `None`.
fn normalize_text(value: Option<&String>) -> Option<String> {
    value
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn normalize_date(field: &str, value: Option<&String>) -> Result<Option<Date>, DomainError> {
    normalize_text(value)
        .map(|text| parse_iso_date(field, &text))
        .transpose()
}

fn normalize_percentage(field: &str, value: Option<f64>) -> Result<Option<Percentage>, DomainError> {
    value.map(|value| Percentage::parse(field, value)).transpose()
}

impl AllocationQuery {
    /// Builds the canonical query for `filters` within `scope`.
    ///
    /// The input is only borrowed; it is never modified. A page of `0` or
    /// no page becomes page 1; a page size of `0` or no page size becomes
    /// `default_page_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A date is not a valid `yyyy-MM-dd` date
    /// - A percentage bound is negative or not finite
    /// - The sort direction is neither `asc` nor `desc`
    pub fn normalize(
        filters: &AllocationFilters,
        scope: QueryScope,
        default_page_size: u32,
    ) -> Result<Self, DomainError> {
        let sort: Option<SortSpec> = match normalize_text(filters.sort_field.as_ref()) {
            Some(field) => {
                let direction: SortDirection = normalize_text(filters.sort_direction.as_ref())
                    .map(|direction| SortDirection::parse(&direction))
                    .transpose()?
                    .unwrap_or_default();
                Some(SortSpec { field, direction })
            }
            None => None,
        };

        let default_page_size: u32 = default_page_size.max(1);

        Ok(Self {
            scope,
            search_text: normalize_text(filters.search_text.as_ref()),
            sbu_id: normalize_text(filters.sbu_id.as_ref()),
            manager_id: normalize_text(filters.manager_id.as_ref()).map(ProfileId::new),
            bill_type_id: normalize_text(filters.bill_type_id.as_ref()).map(BillTypeId::new),
            project_search: normalize_text(filters.project_search.as_ref()),
            engagement: PercentageRange {
                min: normalize_percentage("minEngagement", filters.min_engagement)?,
                max: normalize_percentage("maxEngagement", filters.max_engagement)?,
            },
            billing: PercentageRange {
                min: normalize_percentage("minBilling", filters.min_billing)?,
                max: normalize_percentage("maxBilling", filters.max_billing)?,
            },
            start_date: DateRange {
                from: normalize_date("startDateFrom", filters.start_date_from.as_ref())?,
                to: normalize_date("startDateTo", filters.start_date_to.as_ref())?,
            },
            end_date: DateRange {
                from: normalize_date("endDateFrom", filters.end_date_from.as_ref())?,
                to: normalize_date("endDateTo", filters.end_date_to.as_ref())?,
            },
            sort,
            page: filters.page.filter(|page| *page > 0).unwrap_or(1),
            page_size: filters
                .page_size
                .filter(|size| *size > 0)
                .unwrap_or(default_page_size),
        })
    }

    /// Returns the same query positioned on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Returns the query with pagination and sorting stripped.
    ///
    /// Two queries with the same selection key select the same set of
    /// assignments, which is what calendar memoization is keyed on.
    #[must_use]
    pub fn selection_key(&self) -> Self {
        Self {
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            ..self.clone()
        }
    }

    /// Number of rows preceding the current page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let page: usize = usize::try_from(self.page.saturating_sub(1)).unwrap_or(usize::MAX);
        let size: usize = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        page.saturating_mul(size)
    }

    /// Evaluates the filters against a single assignment.
    ///
    /// Stores that cannot push filters down to a database use this to apply
    /// the same semantics in memory. Text filters are case-insensitive
    /// substring matches.
    #[must_use]
    pub fn matches(&self, assignment: &ResourceAssignment) -> bool {
        if !self.scope.admits(assignment) {
            return false;
        }

        let project_name: Option<&str> = assignment.project.as_ref().map(|p| p.name.as_str());

        if let Some(text) = &self.search_text {
            let haystacks = [
                Some(assignment.profile_id.value()),
                project_name,
                assignment
                    .project
                    .as_ref()
                    .and_then(|project| project.client.as_deref()),
            ];
            if !haystacks.iter().flatten().any(|hay| contains_ci(hay, text)) {
                return false;
            }
        }

        if let Some(text) = &self.project_search {
            let haystacks = [
                assignment.project_id.as_ref().map(|id| id.value()),
                project_name,
            ];
            if !haystacks.iter().flatten().any(|hay| contains_ci(hay, text)) {
                return false;
            }
        }

        let project_sbu: Option<&String> = assignment
            .project
            .as_ref()
            .and_then(|project| project.sbu_id.as_ref());
        if self.sbu_id.is_some() && project_sbu != self.sbu_id.as_ref() {
            return false;
        }

        let project_manager: Option<&ProfileId> = assignment
            .project
            .as_ref()
            .and_then(|project| project.manager_id.as_ref());
        if self.manager_id.is_some() && project_manager != self.manager_id.as_ref() {
            return false;
        }

        if self.bill_type_id.is_some() && assignment.bill_type_id != self.bill_type_id {
            return false;
        }

        self.engagement.contains(assignment.engagement_percentage)
            && self.billing.contains(assignment.billing_percentage)
            && self.start_date.contains(assignment.engagement_start_date)
            && self.end_date.contains_open_end(assignment.release_date)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Rows in the scope before filtering.
    pub total_count: u64,
    /// Rows matching the filters.
    pub filtered_count: u64,
    /// 1-indexed page.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Number of pages for `filtered_count`.
    pub page_count: u32,
}

impl<T> PagedResult<T> {
    /// Builds a page, deriving `page_count` from the counts.
    #[must_use]
    pub fn new(items: Vec<T>, total_count: u64, filtered_count: u64, query: &AllocationQuery) -> Self {
        Self {
            items,
            total_count,
            filtered_count,
            page: query.page,
            page_size: query.page_size,
            page_count: page_count(filtered_count, query.page_size),
        }
    }

    /// Returns whether a later page exists.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.page_count
    }
}

/// `ceil(filtered / page_size)`, saturating at `u32::MAX`.
#[must_use]
pub fn page_count(filtered_count: u64, page_size: u32) -> u32 {
    let size: u64 = u64::from(page_size.max(1));
    u32::try_from(filtered_count.div_ceil(size)).unwrap_or(u32::MAX)
}
