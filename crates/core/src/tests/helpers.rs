// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AssignmentStore, Clock, ManualClock, SnapshotStore, StoreError};
use async_trait::async_trait;
use staffplan_domain::{
    AllocationQuery, AssignmentId, AssignmentPatch, NewAssignment, PagedResult, Percentage,
    ProfileId, ProjectId, ResourceAssignment, parse_iso_date,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::datetime;
use time::{Date, OffsetDateTime};
use tokio::sync::Notify;

/// Search text that makes a list call wait for `FailingStore::release`.
pub const SLOW_SEARCH: &str = "slow";
/// Search text that makes a list call read the unfiltered records, then wait
/// for `FailingStore::release` before answering.
pub const STALE_SEARCH: &str = "stale";
/// Search text that makes a list call fail.
pub const BROKEN_SEARCH: &str = "broken";

pub const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

pub fn date(value: &str) -> Date {
    parse_iso_date("test", value).unwrap()
}

pub fn create_test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(NOW))
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

pub fn ids(values: &[&str]) -> Vec<AssignmentId> {
    values.iter().map(|value| AssignmentId::new(*value)).collect()
}

/// A `SnapshotStore` wrapper that fails chosen ids and counts remote calls.
///
/// Writes to a failing id, and creates for a failing profile, are rejected
/// with a constraint violation. Bulk calls use the trait defaults, so they
/// go through the same per-id checks.
pub struct FailingStore {
    inner: SnapshotStore,
    failing: Mutex<HashSet<String>>,
    gate: Notify,
    pub list_calls: AtomicUsize,
    pub writes: AtomicUsize,
}

impl FailingStore {
    pub fn new(assignments: Vec<ResourceAssignment>) -> Self {
        let clock: Arc<dyn Clock> = create_test_clock();
        Self {
            inner: SnapshotStore::new(assignments, clock),
            failing: Mutex::new(HashSet::new()),
            gate: Notify::new(),
            list_calls: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_on(&self, keys: &[&str]) {
        let mut failing = self.failing.lock().unwrap();
        failing.extend(keys.iter().map(|key| (*key).to_string()));
    }

    /// Lets one waiting slow list call finish.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn snapshot(&self) -> Vec<ResourceAssignment> {
        self.inner.snapshot()
    }

    pub fn find(&self, id: &str) -> Option<ResourceAssignment> {
        self.snapshot()
            .into_iter()
            .find(|assignment| assignment.id.value() == id)
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(StoreError::ConstraintViolation(format!(
                "{key} is locked by another process"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for FailingStore {
    async fn list_assignments(
        &self,
        query: &AllocationQuery,
    ) -> Result<PagedResult<ResourceAssignment>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match query.search_text.as_deref() {
            Some(SLOW_SEARCH) => self.gate.notified().await,
            Some(STALE_SEARCH) => {
                let unfiltered = AllocationQuery {
                    search_text: None,
                    ..query.clone()
                };
                let page = self.inner.list_assignments(&unfiltered).await;
                self.gate.notified().await;
                return page;
            }
            Some(BROKEN_SEARCH) => {
                return Err(StoreError::Unavailable(String::from("connection reset")));
            }
            _ => {}
        }
        self.inner.list_assignments(query).await
    }

    async fn get_assignment(&self, id: &AssignmentId) -> Result<ResourceAssignment, StoreError> {
        self.inner.get_assignment(id).await
    }

    async fn create_assignment(
        &self,
        fields: &NewAssignment,
    ) -> Result<ResourceAssignment, StoreError> {
        self.check(fields.profile_id.value())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create_assignment(fields).await
    }

    async fn update_assignment(
        &self,
        id: &AssignmentId,
        patch: &AssignmentPatch,
    ) -> Result<ResourceAssignment, StoreError> {
        self.check(id.value())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_assignment(id, patch).await
    }

    async fn delete_assignment(&self, id: &AssignmentId) -> Result<(), StoreError> {
        self.check(id.value())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_assignment(id).await
    }
}

/// The assignments used by most scenarios:
///
/// - `X`, `Y`: P1, overlapping in January, 60% + 50%
/// - `Z`: P2, validated, open-ended
/// - `D`: P3, complete
pub fn create_test_assignments() -> Vec<ResourceAssignment> {
    let x = create_test_assignment("X", "P1", "2024-01-01", Some("2024-01-31"), 60);
    let y = create_test_assignment("Y", "P1", "2024-01-15", Some("2024-02-15"), 50);
    let mut z = create_test_assignment("Z", "P2", "2023-12-01", None, 100);
    z.weekly_validation = true;
    let mut d = create_test_assignment("D", "P3", "2023-06-01", Some("2023-12-31"), 80);
    d.engagement_complete = true;
    vec![x, y, z, d]
}

pub fn create_test_store() -> Arc<FailingStore> {
    Arc::new(FailingStore::new(create_test_assignments()))
}
