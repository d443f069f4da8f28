// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field derivation for duplicated assignments.
//!
//! Two distinct operations produce a new assignment from an existing one:
//!
//! - `copy_exact` keeps the source's dates
//! - `duplicate_forward` moves the copy onto the calendar month after today
//!
//! Both produce a `NewAssignment`, which never carries lifecycle flags, so
//! the copy always starts `Unvalidated` and `Active` whatever the source's
//! flags were.

use crate::dates::next_month_span;
use crate::error::DomainError;
use crate::types::{NewAssignment, ResourceAssignment};
use time::Date;

/// Derives an identical copy of `source`.
#[must_use]
pub fn copy_exact(source: &ResourceAssignment) -> NewAssignment {
    NewAssignment {
        profile_id: source.profile_id.clone(),
        project_id: source.project_id.clone(),
        bill_type_id: source.bill_type_id.clone(),
        engagement_percentage: source.engagement_percentage,
        billing_percentage: source.billing_percentage,
        engagement_start_date: source.engagement_start_date,
        release_date: source.release_date,
        is_forecasted: source.is_forecasted,
    }
}

/// Derives a copy of `source` spanning the whole calendar month after
/// `today`, regardless of the source's own dates.
///
/// # Errors
///
/// Returns an error if the following month is outside the supported range.
pub fn duplicate_forward(
    source: &ResourceAssignment,
    today: Date,
) -> Result<NewAssignment, DomainError> {
    let (start, end) = next_month_span(today)?;
    Ok(NewAssignment {
        engagement_start_date: start,
        release_date: Some(end),
        ..copy_exact(source)
    })
}
