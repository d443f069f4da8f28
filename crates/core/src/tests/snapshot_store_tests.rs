// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_assignments, create_test_clock, date};
use crate::{AssignmentStore, SnapshotStore, StoreError};
use staffplan_domain::{
    AllocationFilters, AllocationQuery, AssignmentId, AssignmentPatch, QueryScope,
};

fn create_snapshot_store() -> SnapshotStore {
    SnapshotStore::new(create_test_assignments(), create_test_clock())
}

fn query(filters: &AllocationFilters, scope: QueryScope) -> AllocationQuery {
    AllocationQuery::normalize(filters, scope, 10).unwrap()
}

#[tokio::test]
async fn test_sort_descending_by_engagement() {
    let store = create_snapshot_store();
    let filters = AllocationFilters {
        sort_field: Some(String::from("engagementPercentage")),
        sort_direction: Some(String::from("desc")),
        ..AllocationFilters::default()
    };

    let page = store
        .list_assignments(&query(&filters, QueryScope::All))
        .await
        .unwrap();

    let order: Vec<&str> = page.items.iter().map(|a| a.id.value()).collect();
    assert_eq!(order, vec!["Z", "D", "X", "Y"]);
}

#[tokio::test]
async fn test_total_and_filtered_counts() {
    let store = create_snapshot_store();
    let filters = AllocationFilters {
        search_text: Some(String::from("p1")),
        page_size: Some(1),
        ..AllocationFilters::default()
    };

    let page = store
        .list_assignments(&query(&filters, QueryScope::Validation))
        .await
        .unwrap();

    // D is complete and outside the validation scope.
    assert_eq!(page.total_count, 3);
    assert_eq!(page.filtered_count, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page_count, 2);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let store = create_snapshot_store();
    let filters = AllocationFilters {
        page: Some(3),
        page_size: Some(2),
        ..AllocationFilters::default()
    };

    let page = store
        .list_assignments(&query(&filters, QueryScope::All))
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.filtered_count, 4);
}

#[tokio::test]
async fn test_update_rejects_inconsistent_interval() {
    let store = create_snapshot_store();
    let patch = AssignmentPatch {
        release_date: Some(Some(date("2023-01-01"))),
        ..AssignmentPatch::default()
    };

    let result = store.update_assignment(&AssignmentId::new("X"), &patch).await;

    assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let store = create_snapshot_store();

    let result = store.get_assignment(&AssignmentId::new("nope")).await;

    assert_eq!(
        result.unwrap_err(),
        StoreError::NotFound(AssignmentId::new("nope"))
    );
}
