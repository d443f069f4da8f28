// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{FailingStore, create_test_store, date};
use crate::{AllocationCache, AssignmentEditor, CoreError, StoreError};
use staffplan_domain::{
    AllocationFilters, AllocationQuery, AssignmentId, AssignmentPatch, DomainError,
    NewAssignment, PagedResult, Percentage, ProfileId, ProjectId, QueryScope,
};
use std::sync::Arc;

fn editor(store: &Arc<FailingStore>, cache: &Arc<AllocationCache>) -> AssignmentEditor {
    AssignmentEditor::new(Arc::clone(store) as _, Arc::clone(cache))
}

fn new_assignment(start: &str, release: Option<&str>) -> NewAssignment {
    NewAssignment {
        profile_id: ProfileId::new("P4"),
        project_id: Some(ProjectId::new("PRJ-2")),
        bill_type_id: None,
        engagement_percentage: Percentage::whole(40),
        billing_percentage: Percentage::whole(40),
        engagement_start_date: date(start),
        release_date: release.map(date),
        is_forecasted: false,
    }
}

#[tokio::test]
async fn test_create_starts_unvalidated_and_active() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));

    let created = editor
        .create(&new_assignment("2024-02-01", Some("2024-02-29")))
        .await
        .unwrap();

    assert!(!created.weekly_validation);
    assert!(!created.engagement_complete);
    assert_eq!(created.profile_id, ProfileId::new("P4"));
    assert_eq!(store.snapshot().len(), 5);
}

#[tokio::test]
async fn test_create_with_release_before_start_writes_nothing() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));

    let result = editor
        .create(&new_assignment("2024-02-01", Some("2024-01-31")))
        .await;

    assert!(matches!(
        result,
        Err(CoreError::Validation(DomainError::ReleaseBeforeStart { .. }))
    ));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_empty_patch_does_not_write() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));

    let current = editor
        .update(&AssignmentId::new("X"), &AssignmentPatch::default())
        .await
        .unwrap();

    assert_eq!(current, store.find("X").unwrap());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_moving_start_past_release_is_rejected() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));
    let patch = AssignmentPatch {
        engagement_start_date: Some(date("2024-02-10")),
        ..AssignmentPatch::default()
    };

    let result = editor.update(&AssignmentId::new("X"), &patch).await;

    assert!(result.unwrap_err().is_validation());
    assert_eq!(store.write_count(), 0);
    assert_eq!(
        store.find("X").unwrap().engagement_start_date,
        date("2024-01-01")
    );
}

#[tokio::test]
async fn test_reopening_an_assignment() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));
    let patch = AssignmentPatch {
        release_date: Some(None),
        engagement_percentage: Some(Percentage::whole(25)),
        ..AssignmentPatch::default()
    };

    let updated = editor
        .update(&AssignmentId::new("X"), &patch)
        .await
        .unwrap();

    assert_eq!(updated.release_date, None);
    assert_eq!(updated.engagement_percentage, Percentage::whole(25));
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn test_edit_evicts_cached_pages() {
    let store = create_test_store();
    let cache = Arc::new(AllocationCache::new());
    let query =
        AllocationQuery::normalize(&AllocationFilters::default(), QueryScope::All, 10).unwrap();
    cache.store_result(
        query.clone(),
        PagedResult::new(store.snapshot(), 4, 4, &query),
        cache.epoch(),
    );
    let patch = AssignmentPatch {
        engagement_percentage: Some(Percentage::whole(70)),
        ..AssignmentPatch::default()
    };

    editor(&store, &cache)
        .update(&AssignmentId::new("Y"), &patch)
        .await
        .unwrap();

    assert!(cache.result(&query).is_none());
}

#[tokio::test]
async fn test_delete_missing_id_is_a_mutation_error() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));

    let result = editor.delete(&AssignmentId::new("missing")).await;

    assert_eq!(
        result.unwrap_err(),
        CoreError::Mutation(StoreError::NotFound(AssignmentId::new("missing")))
    );
    assert_eq!(store.snapshot().len(), 4);
}

#[tokio::test]
async fn test_delete_removes_the_record() {
    let store = create_test_store();
    let editor = editor(&store, &Arc::new(AllocationCache::new()));

    editor.delete(&AssignmentId::new("Z")).await.unwrap();

    assert!(store.find("Z").is_none());
}
