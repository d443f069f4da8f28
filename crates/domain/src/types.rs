// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::dates::iso_date;
use crate::error::DomainError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Declares an opaque, string-backed identifier issued by the remote store.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub fn value(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a resource assignment.
    AssignmentId
);
string_id!(
    /// Identifier of an employee profile.
    ProfileId
);
string_id!(
    /// Identifier of a project.
    ProjectId
);
string_id!(
    /// Identifier of a bill type.
    BillTypeId
);

/// A non-negative percentage with two fractional digits.
///
/// Stored as hundredths of a percent so that sums are exact:
/// `33.33 + 33.33 + 33.34 == 100`. Values above 100 are legal and signal
/// over-commitment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(u32);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);
    /// One employee's nominal full capacity.
    pub const FULL: Self = Self(10_000);

    /// Creates a percentage from hundredths of a percent (`5_000` is 50%).
    #[must_use]
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// Creates a whole-number percentage.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn whole(percent: u16) -> Self {
        Self(percent as u32 * 100)
    }

    /// Parses a caller-supplied percentage, rounding to two fractional digits.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPercentage` if the value is negative,
    /// not finite, or too large to represent.
    pub fn parse(field: &str, value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidPercentage {
                field: field.to_string(),
                reason: format!("{value} is not a finite number"),
            });
        }
        if value < 0.0 {
            return Err(DomainError::InvalidPercentage {
                field: field.to_string(),
                reason: format!("{value} is negative"),
            });
        }
        (value * 100.0)
            .round()
            .to_u32()
            .map(Self)
            .ok_or_else(|| DomainError::InvalidPercentage {
                field: field.to_string(),
                reason: format!("{value} is out of range"),
            })
    }

    /// Returns the value in hundredths of a percent.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Returns the value as a floating point percentage.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Adds two percentages, saturating at the representable maximum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl TryFrom<f64> for Percentage {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::parse("percentage", value)
    }
}

impl From<Percentage> for f64 {
    fn from(value: Percentage) -> Self {
        value.as_f64()
    }
}

impl std::iter::Sum for Percentage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;
        if fraction == 0 {
            write!(f, "{whole}%")
        } else {
            write!(f, "{whole}.{fraction:02}%")
        }
    }
}

/// Display data for the project an assignment belongs to.
///
/// Owned by the remote store; carried along for filtering and display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project name.
    pub name: String,
    /// Client name, if any.
    #[serde(default)]
    pub client: Option<String>,
    /// Project level, if any.
    #[serde(default)]
    pub level: Option<String>,
    /// The project's manager.
    #[serde(default)]
    pub manager_id: Option<ProfileId>,
    /// The strategic business unit owning the project.
    #[serde(default)]
    pub sbu_id: Option<String>,
}

/// A record committing part of an employee's capacity to a project over a
/// date range.
///
/// ## Invariants
///
/// - `engagement_start_date <= release_date` when a release date is present
/// - `release_date = None` means open-ended
/// - a complete assignment is excluded from capacity planning projections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAssignment {
    /// The assignment identifier.
    pub id: AssignmentId,
    /// The employee this capacity belongs to.
    pub profile_id: ProfileId,
    /// The project, or `None` for unassigned/forecast capacity.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// The bill type, if any.
    #[serde(default)]
    pub bill_type_id: Option<BillTypeId>,
    /// Share of the employee's capacity committed.
    pub engagement_percentage: Percentage,
    /// Share of the engagement that is billable.
    #[serde(default)]
    pub billing_percentage: Percentage,
    /// First day of the engagement.
    #[serde(with = "iso_date")]
    pub engagement_start_date: Date,
    /// Last day of the engagement, inclusive. `None` is open-ended.
    #[serde(default, with = "iso_date::option")]
    pub release_date: Option<Date>,
    /// Whether the engagement has been marked complete.
    #[serde(default)]
    pub engagement_complete: bool,
    /// Whether the figures were signed off for the current period.
    #[serde(default)]
    pub weekly_validation: bool,
    /// Whether this is speculative capacity.
    #[serde(default)]
    pub is_forecasted: bool,
    /// Related project data, when the store supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSummary>,
    /// Creation timestamp assigned by the store.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    /// Last update timestamp assigned by the store.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl ResourceAssignment {
    /// Returns whether `date` falls within the assignment's interval.
    ///
    /// An open-ended assignment contains every date on or after its start.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.engagement_start_date <= date && self.release_date.is_none_or(|end| date <= end)
    }

    /// Returns whether the interval intersects `[start, end]`.
    #[must_use]
    pub fn overlaps(&self, start: Date, end: Date) -> bool {
        self.engagement_start_date <= end && self.release_date.is_none_or(|release| release >= start)
    }

    /// Returns whether the assignment counts towards capacity planning.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.engagement_complete
    }

    /// Returns whether the assignment belongs to a real project.
    #[must_use]
    pub const fn is_planned(&self) -> bool {
        self.project_id.is_some() && !self.is_forecasted
    }
}

/// The field set used to create an assignment.
///
/// New assignments always start `Unvalidated` and `Active`, so the flags are
/// not part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    /// The employee.
    pub profile_id: ProfileId,
    /// The project, if any.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// The bill type, if any.
    #[serde(default)]
    pub bill_type_id: Option<BillTypeId>,
    /// Share of the employee's capacity committed.
    pub engagement_percentage: Percentage,
    /// Share of the engagement that is billable.
    #[serde(default)]
    pub billing_percentage: Percentage,
    /// First day of the engagement.
    #[serde(with = "iso_date")]
    pub engagement_start_date: Date,
    /// Last day of the engagement, inclusive.
    #[serde(default, with = "iso_date::option")]
    pub release_date: Option<Date>,
    /// Whether this is speculative capacity.
    #[serde(default)]
    pub is_forecasted: bool,
}

impl NewAssignment {
    /// Materializes the record a store would persist for these fields.
    #[must_use]
    pub fn into_assignment(self, id: AssignmentId, now: OffsetDateTime) -> ResourceAssignment {
        ResourceAssignment {
            id,
            profile_id: self.profile_id,
            project_id: self.project_id,
            bill_type_id: self.bill_type_id,
            engagement_percentage: self.engagement_percentage,
            billing_percentage: self.billing_percentage,
            engagement_start_date: self.engagement_start_date,
            release_date: self.release_date,
            engagement_complete: false,
            weekly_validation: false,
            is_forecasted: self.is_forecasted,
            project: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// The two boolean lifecycle flags a store can update in bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentFlag {
    /// `weeklyValidation`.
    WeeklyValidation,
    /// `engagementComplete`.
    EngagementComplete,
}

impl AssignmentFlag {
    /// Returns the wire name of the flag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WeeklyValidation => "weeklyValidation",
            Self::EngagementComplete => "engagementComplete",
        }
    }
}

impl std::fmt::Display for AssignmentFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial update of an assignment.
///
/// `None` leaves a field unchanged. Nullable fields use a nested option so
/// that `Some(None)` clears the value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentPatch {
    /// New employee.
    pub profile_id: Option<ProfileId>,
    /// New project, or `Some(None)` to unassign.
    pub project_id: Option<Option<ProjectId>>,
    /// New bill type, or `Some(None)` to clear.
    pub bill_type_id: Option<Option<BillTypeId>>,
    /// New engagement percentage.
    pub engagement_percentage: Option<Percentage>,
    /// New billing percentage.
    pub billing_percentage: Option<Percentage>,
    /// New start date.
    pub engagement_start_date: Option<Date>,
    /// New release date, or `Some(None)` to make the assignment open-ended.
    pub release_date: Option<Option<Date>>,
    /// New completion flag.
    pub engagement_complete: Option<bool>,
    /// New validation flag.
    pub weekly_validation: Option<bool>,
    /// New forecast flag.
    pub is_forecasted: Option<bool>,
}

impl AssignmentPatch {
    /// A patch setting a single lifecycle flag.
    #[must_use]
    pub fn flag(flag: AssignmentFlag, value: bool) -> Self {
        match flag {
            AssignmentFlag::WeeklyValidation => Self {
                weekly_validation: Some(value),
                ..Self::default()
            },
            AssignmentFlag::EngagementComplete => Self {
                engagement_complete: Some(value),
                ..Self::default()
            },
        }
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to an assignment in place.
    pub fn apply_to(&self, assignment: &mut ResourceAssignment) {
        if let Some(profile_id) = &self.profile_id {
            assignment.profile_id = profile_id.clone();
        }
        if let Some(project_id) = &self.project_id {
            assignment.project_id.clone_from(project_id);
        }
        if let Some(bill_type_id) = &self.bill_type_id {
            assignment.bill_type_id.clone_from(bill_type_id);
        }
        if let Some(engagement) = self.engagement_percentage {
            assignment.engagement_percentage = engagement;
        }
        if let Some(billing) = self.billing_percentage {
            assignment.billing_percentage = billing;
        }
        if let Some(start) = self.engagement_start_date {
            assignment.engagement_start_date = start;
        }
        if let Some(release) = self.release_date {
            assignment.release_date = release;
        }
        if let Some(complete) = self.engagement_complete {
            assignment.engagement_complete = complete;
        }
        if let Some(validated) = self.weekly_validation {
            assignment.weekly_validation = validated;
        }
        if let Some(forecasted) = self.is_forecasted {
            assignment.is_forecasted = forecasted;
        }
    }
}
