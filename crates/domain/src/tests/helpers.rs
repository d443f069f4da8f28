// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AssignmentId, Percentage, ProfileId, ProjectId, ResourceAssignment, parse_iso_date};
use time::Date;

pub fn date(value: &str) -> Date {
    parse_iso_date("test", value).unwrap()
}

/// An active, unvalidated assignment on project `PRJ-1`.
pub fn create_test_assignment(
    id: &str,
    profile: &str,
    start: &str,
    release: Option<&str>,
    engagement: u16,
) -> ResourceAssignment {
    ResourceAssignment {
        id: AssignmentId::new(id),
        profile_id: ProfileId::new(profile),
        project_id: Some(ProjectId::new("PRJ-1")),
        bill_type_id: None,
        engagement_percentage: Percentage::whole(engagement),
        billing_percentage: Percentage::whole(engagement),
        engagement_start_date: date(start),
        release_date: release.map(date),
        engagement_complete: false,
        weekly_validation: false,
        is_forecasted: false,
        project: None,
        created_at: None,
        updated_at: None,
    }
}
