// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A process-local `AssignmentStore` over a loaded snapshot.
//!
//! Filters are evaluated with `AllocationQuery::matches`. Sorting understands
//! the assignment's own fields and `project.name`; any other sort field falls
//! back to id order.

use crate::clock::Clock;
use crate::store::{AssignmentStore, StoreError};
use async_trait::async_trait;
use staffplan_domain::{
    AllocationQuery, AssignmentId, AssignmentPatch, NewAssignment, PagedResult,
    ResourceAssignment, SortDirection, validate_patch,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};

/// In-memory assignment store.
pub struct SnapshotStore {
    records: Mutex<BTreeMap<AssignmentId, ResourceAssignment>>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl SnapshotStore {
    /// Creates a store holding `assignments`.
    ///
    /// Later records replace earlier ones with the same id.
    #[must_use]
    pub fn new(assignments: Vec<ResourceAssignment>, clock: Arc<dyn Clock>) -> Self {
        let records: BTreeMap<AssignmentId, ResourceAssignment> = assignments
            .into_iter()
            .map(|assignment| (assignment.id.clone(), assignment))
            .collect();
        let next_id: u64 = u64::try_from(records.len())
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        Self {
            records: Mutex::new(records),
            next_id: AtomicU64::new(next_id),
            clock,
        }
    }

    /// Returns every stored assignment in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ResourceAssignment> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<AssignmentId, ResourceAssignment>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_id(&self, records: &BTreeMap<AssignmentId, ResourceAssignment>) -> AssignmentId {
        loop {
            let n: u64 = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
            let id = AssignmentId::new(format!("asg-{n}"));
            if !records.contains_key(&id) {
                return id;
            }
        }
    }
}

fn compare_by(field: &str, a: &ResourceAssignment, b: &ResourceAssignment) -> Ordering {
    let primary: Ordering = match field {
        "profileId" => a.profile_id.cmp(&b.profile_id),
        "projectId" => a.project_id.cmp(&b.project_id),
        "billTypeId" => a.bill_type_id.cmp(&b.bill_type_id),
        "engagementPercentage" => a.engagement_percentage.cmp(&b.engagement_percentage),
        "billingPercentage" => a.billing_percentage.cmp(&b.billing_percentage),
        "engagementStartDate" => a.engagement_start_date.cmp(&b.engagement_start_date),
        "releaseDate" => a.release_date.cmp(&b.release_date),
        "project.name" => a
            .project
            .as_ref()
            .map(|project| &project.name)
            .cmp(&b.project.as_ref().map(|project| &project.name)),
        _ => Ordering::Equal,
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl AssignmentStore for SnapshotStore {
    async fn list_assignments(
        &self,
        query: &AllocationQuery,
    ) -> Result<PagedResult<ResourceAssignment>, StoreError> {
        let records = self.lock();

        let total: usize = records
            .values()
            .filter(|assignment| query.scope.admits(assignment))
            .count();
        let mut matching: Vec<&ResourceAssignment> = records
            .values()
            .filter(|assignment| query.matches(assignment))
            .collect();

        if let Some(sort) = &query.sort {
            matching.sort_by(|a, b| {
                let ordering = compare_by(&sort.field, a, b);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let page_size: usize = usize::try_from(query.page_size).unwrap_or(usize::MAX);
        let items: Vec<ResourceAssignment> = matching
            .iter()
            .skip(query.offset())
            .take(page_size)
            .map(|assignment| (*assignment).clone())
            .collect();

        Ok(PagedResult::new(
            items,
            u64::try_from(total).unwrap_or(u64::MAX),
            u64::try_from(matching.len()).unwrap_or(u64::MAX),
            query,
        ))
    }

    async fn get_assignment(&self, id: &AssignmentId) -> Result<ResourceAssignment, StoreError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn create_assignment(
        &self,
        fields: &NewAssignment,
    ) -> Result<ResourceAssignment, StoreError> {
        let mut records = self.lock();
        let id: AssignmentId = self.issue_id(&records);
        let created: ResourceAssignment = fields.clone().into_assignment(id.clone(), self.clock.now());
        records.insert(id, created.clone());
        Ok(created)
    }

    async fn update_assignment(
        &self,
        id: &AssignmentId,
        patch: &AssignmentPatch,
    ) -> Result<ResourceAssignment, StoreError> {
        let now = self.clock.now();
        let mut records = self.lock();
        let record: &mut ResourceAssignment = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        validate_patch(record, patch)
            .map_err(|err| StoreError::ConstraintViolation(err.to_string()))?;

        patch.apply_to(record);
        record.updated_at = Some(now);
        Ok(record.clone())
    }

    async fn delete_assignment(&self, id: &AssignmentId) -> Result<(), StoreError> {
        self.lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}
