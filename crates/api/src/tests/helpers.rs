// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::AllocationService;
use async_trait::async_trait;
use serde_json::json;
use staffplan::{Clock, CoreConfig, ManualClock, SnapshotStore};
use staffplan_audit::{
    AuditAction, AuditEntry, AuditLogQuery, AuditLogReader, AuditPage, AuditReadError,
    StaticAuditLog,
};
use staffplan_domain::{
    AssignmentId, Percentage, ProfileId, ProjectId, ResourceAssignment, parse_iso_date,
};
use std::sync::Arc;
use time::Date;
use time::macros::datetime;

pub fn date(value: &str) -> Date {
    parse_iso_date("test", value).unwrap()
}

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

/// `X`/`Y` overlap for P1 in January, `Z` is validated, `D` is complete.
pub fn create_test_assignments() -> Vec<ResourceAssignment> {
    let x = create_test_assignment("X", "P1", "2024-01-01", Some("2024-01-31"), 60);
    let y = create_test_assignment("Y", "P1", "2024-01-15", Some("2024-02-15"), 50);
    let mut z = create_test_assignment("Z", "P2", "2023-12-01", None, 100);
    z.weekly_validation = true;
    let mut d = create_test_assignment("D", "P3", "2023-06-01", Some("2023-12-31"), 80);
    d.engagement_complete = true;
    vec![x, y, z, d]
}

pub fn audit_entry(id: &str, entity: &str, at: &str) -> AuditEntry {
    serde_json::from_value(json!({
        "id": id,
        "entityId": entity,
        "actor": { "id": "u-1", "actorType": "user", "displayName": "Dana Admin" },
        "action": AuditAction::Update,
        "before": { "engagementPercentage": 50 },
        "after": { "engagementPercentage": 60 },
        "recordedAt": at,
    }))
    .unwrap()
}

/// An audit log that is always down.
pub struct UnavailableAuditLog;

#[async_trait]
impl AuditLogReader for UnavailableAuditLog {
    async fn read(&self, _query: &AuditLogQuery) -> Result<AuditPage, AuditReadError> {
        Err(AuditReadError::Unavailable(String::from("timeout")))
    }
}

pub struct TestContext {
    pub service: AllocationService,
    pub store: Arc<SnapshotStore>,
}

pub fn create_test_context_with_audit(audit: Arc<dyn AuditLogReader>) -> TestContext {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(datetime!(2024-01-15 12:00 UTC)));
    let store = Arc::new(SnapshotStore::new(
        create_test_assignments(),
        Arc::clone(&clock),
    ));
    let service = AllocationService::new(
        Arc::clone(&store) as _,
        audit,
        clock,
        CoreConfig::default(),
    );
    TestContext { service, store }
}

pub fn create_test_context() -> TestContext {
    let audit = StaticAuditLog::new(vec![
        audit_entry("e-1", "X", "2024-01-02T09:00:00Z"),
        audit_entry("e-2", "X", "2024-01-03T09:00:00Z"),
        audit_entry("e-3", "Y", "2024-01-04T09:00:00Z"),
    ]);
    create_test_context_with_audit(Arc::new(audit))
}
