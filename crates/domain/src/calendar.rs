// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Day-by-day capacity aggregation.
//!
//! This module turns a flat list of assignments and a viewing window into
//! one `CalendarDay` per date, summing each employee's engagement and
//! classifying them as over-allocated, available, or exactly allocated.
//!
//! ## Invariants
//!
//! - The output contains every date of the window, in order, exactly once
//! - An assignment contributes to day `d` iff `start <= d <= release`, where
//!   a missing release date is unbounded
//! - `over_allocated_count + available_count + fully_allocated_count()`
//!   equals `distinct_profile_count` for every day
//! - Aggregation is pure: the same inputs always produce the same output
//!
//! ## Usage
//!
//! Callers wanting the capacity planning view pass the output of
//! `active_only` so that completed assignments do not count.

use crate::dates::{first_day_of_month, iso_date, last_day_of_month};
use crate::error::DomainError;
use crate::types::{Percentage, ProfileId, ResourceAssignment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::{Date, Duration, Month};

/// The span of dates a calendar view covers around its anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// The anchor date only.
    Day,
    /// The Sunday-start week containing the anchor.
    Week,
    /// The calendar month containing the anchor.
    #[default]
    Month,
    /// The calendar quarter containing the anchor.
    Quarter,
}

impl ViewMode {
    /// Converts this view mode to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }
}

impl FromStr for ViewMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            _ => Err(DomainError::InvalidViewMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive range of dates to aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewWindow {
    /// First date of the window.
    #[serde(with = "iso_date")]
    start: Date,
    /// Last date of the window, inclusive.
    #[serde(with = "iso_date")]
    end: Date,
}

impl ViewWindow {
    /// Creates an explicit window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWindow` if `end` precedes `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Resolves the window a view mode shows for an anchor date.
    ///
    /// # Errors
    ///
    /// Returns an error if the window would fall outside the supported date
    /// range.
    pub fn resolve(mode: ViewMode, anchor: Date) -> Result<Self, DomainError> {
        let overflow = |what: &str| DomainError::DateArithmeticOverflow {
            operation: format!("resolving the {what} containing {anchor}"),
        };

        match mode {
            ViewMode::Day => Ok(Self {
                start: anchor,
                end: anchor,
            }),
            ViewMode::Week => {
                let back = i64::from(anchor.weekday().number_days_from_sunday());
                let start = anchor
                    .checked_sub(Duration::days(back))
                    .ok_or_else(|| overflow("week"))?;
                let end = start
                    .checked_add(Duration::days(6))
                    .ok_or_else(|| overflow("week"))?;
                Ok(Self { start, end })
            }
            ViewMode::Month => Ok(Self {
                start: first_day_of_month(anchor),
                end: last_day_of_month(anchor)?,
            }),
            ViewMode::Quarter => {
                let first_month: u8 = (anchor.month() as u8 - 1) / 3 * 3 + 1;
                let first_month = Month::try_from(first_month).map_err(|_| overflow("quarter"))?;
                let start = Date::from_calendar_date(anchor.year(), first_month, 1)
                    .map_err(|_| overflow("quarter"))?;
                let last_month = first_month.next().next();
                let last_month_start = Date::from_calendar_date(anchor.year(), last_month, 1)
                    .map_err(|_| overflow("quarter"))?;
                Ok(Self {
                    start,
                    end: last_day_of_month(last_month_start)?,
                })
            }
        }
    }

    /// First date of the window.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last date of the window, inclusive.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns whether `date` lies within the window.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every date of the window in order.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |day| {
            day.next_day().filter(|next| *next <= end)
        })
    }
}

/// How an employee's summed engagement compares to full capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationStatus {
    /// More than 100%.
    OverAllocated,
    /// Exactly 100%.
    FullyAllocated,
    /// Less than 100%.
    Available,
}

impl AllocationStatus {
    /// Classifies a summed engagement.
    #[must_use]
    pub fn classify(total: Percentage) -> Self {
        match total.cmp(&Percentage::FULL) {
            std::cmp::Ordering::Greater => Self::OverAllocated,
            std::cmp::Ordering::Equal => Self::FullyAllocated,
            std::cmp::Ordering::Less => Self::Available,
        }
    }
}

/// One employee's load on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLoad {
    /// The employee.
    pub profile_id: ProfileId,
    /// Sum of engagement over the employee's assignments that day.
    pub total_engagement: Percentage,
    /// Classification of the sum.
    pub status: AllocationStatus,
}

/// The derived capacity picture for a single date. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// The date.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Assignments whose interval contains the date, in input order.
    pub resources: Vec<ResourceAssignment>,
    /// Per-employee sums, ordered by profile id.
    pub profiles: Vec<ProfileLoad>,
    /// Number of distinct employees with an assignment that day.
    pub distinct_profile_count: usize,
    /// Employees above 100%.
    pub over_allocated_count: usize,
    /// Employees below 100%.
    pub available_count: usize,
}

impl CalendarDay {
    /// Employees at exactly 100%. Not tracked separately; derived.
    #[must_use]
    pub const fn fully_allocated_count(&self) -> usize {
        self.distinct_profile_count - self.over_allocated_count - self.available_count
    }

    /// Returns the load for one employee, if they have any assignment that day.
    #[must_use]
    pub fn load_for(&self, profile_id: &ProfileId) -> Option<&ProfileLoad> {
        self.profiles
            .iter()
            .find(|load| &load.profile_id == profile_id)
    }
}

/// Drops completed assignments, leaving the capacity planning projection.
#[must_use]
pub fn active_only(assignments: &[ResourceAssignment]) -> Vec<ResourceAssignment> {
    assignments
        .iter()
        .filter(|assignment| assignment.is_active())
        .cloned()
        .collect()
}

/// Aggregates assignments into one `CalendarDay` per date of the window.
///
/// # Arguments
///
/// * `assignments` - The (already filtered) assignments to aggregate
/// * `window` - The dates to produce
///
/// # Returns
///
/// The days of the window in ascending order. Days without any assignment
/// are still present, with all counts at zero.
///
/// # Complexity
///
/// Assignments not intersecting the window are discarded up front; the
/// remaining work is `O(days × assignments)`.
#[must_use]
pub fn aggregate_calendar(assignments: &[ResourceAssignment], window: &ViewWindow) -> Vec<CalendarDay> {
    let candidates: Vec<&ResourceAssignment> = assignments
        .iter()
        .filter(|assignment| assignment.overlaps(window.start(), window.end()))
        .collect();

    window
        .days()
        .map(|date| aggregate_day(date, &candidates))
        .collect()
}

fn aggregate_day(date: Date, candidates: &[&ResourceAssignment]) -> CalendarDay {
    let resources: Vec<ResourceAssignment> = candidates
        .iter()
        .filter(|assignment| assignment.contains(date))
        .map(|assignment| (*assignment).clone())
        .collect();

    let mut sums: BTreeMap<&ProfileId, Percentage> = BTreeMap::new();
    for assignment in &resources {
        let entry = sums.entry(&assignment.profile_id).or_insert(Percentage::ZERO);
        *entry = entry.saturating_add(assignment.engagement_percentage);
    }

    let profiles: Vec<ProfileLoad> = sums
        .into_iter()
        .map(|(profile_id, total)| ProfileLoad {
            profile_id: profile_id.clone(),
            total_engagement: total,
            status: AllocationStatus::classify(total),
        })
        .collect();

    let over_allocated_count = profiles
        .iter()
        .filter(|load| load.status == AllocationStatus::OverAllocated)
        .count();
    let available_count = profiles
        .iter()
        .filter(|load| load.status == AllocationStatus::Available)
        .count();

    CalendarDay {
        date,
        distinct_profile_count: profiles.len(),
        over_allocated_count,
        available_count,
        resources,
        profiles,
    }
}
