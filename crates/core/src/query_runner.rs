// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocation query execution.
//!
//! List queries are supersede-and-discard: every `run` takes a ticket from a
//! generation counter, and a result that arrives after a newer ticket was
//! issued is dropped rather than cached or returned.

use crate::cache::{AllocationCache, CalendarKey};
use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::store::AssignmentStore;
use staffplan_domain::{
    AllocationFilters, AllocationQuery, CalendarDay, PagedResult, QueryScope, ResourceAssignment,
    ViewWindow, active_only, aggregate_calendar,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// The result of running a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome<T> {
    /// Fetched from the store for this call.
    Fresh(T),
    /// Served from the cache without a remote call.
    Cached(T),
    /// A newer query was issued while this one was in flight; its result
    /// was discarded.
    Superseded,
}

impl<T> QueryOutcome<T> {
    /// Returns the result unless it was superseded.
    #[must_use]
    pub fn into_result(self) -> Option<T> {
        match self {
            Self::Fresh(value) | Self::Cached(value) => Some(value),
            Self::Superseded => None,
        }
    }

    /// Returns whether the result was discarded.
    #[must_use]
    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Runs canonical queries against the store for one query context.
///
/// Each tab owns a runner so that a newer query in one tab never discards an
/// in-flight query of another. The cache is shared.
pub struct AllocationQueryRunner {
    store: Arc<dyn AssignmentStore>,
    cache: Arc<AllocationCache>,
    config: CoreConfig,
    generation: AtomicU64,
}

impl AllocationQueryRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(
        store: Arc<dyn AssignmentStore>,
        cache: Arc<AllocationCache>,
        config: CoreConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Normalizes raw filters with the configured default page size.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for malformed input.
    pub fn normalize(
        &self,
        filters: &AllocationFilters,
        scope: QueryScope,
    ) -> Result<AllocationQuery, CoreError> {
        Ok(AllocationQuery::normalize(
            filters,
            scope,
            self.config.default_page_size,
        )?)
    }

    /// Runs one page of a query.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Query` if the store read fails. A failure of a
    /// superseded query is discarded like its result.
    pub async fn run(
        &self,
        query: &AllocationQuery,
    ) -> Result<QueryOutcome<PagedResult<ResourceAssignment>>, CoreError> {
        let ticket: u64 = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(page) = self.cache.result(query) {
            debug!(page = query.page, "Query served from cache");
            return Ok(QueryOutcome::Cached(page));
        }

        let epoch: u64 = self.cache.epoch();
        let result = self.store.list_assignments(query).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding superseded query result");
            return Ok(QueryOutcome::Superseded);
        }

        let page = result.map_err(CoreError::Query)?;
        self.cache.store_result(query.clone(), page.clone(), epoch);
        Ok(QueryOutcome::Fresh(page))
    }

    /// Fetches every assignment selected by `query`, ignoring its paging.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Query` if any page read fails.
    pub async fn fetch_all(
        &self,
        query: &AllocationQuery,
    ) -> Result<Vec<ResourceAssignment>, CoreError> {
        let mut page_query: AllocationQuery = AllocationQuery {
            page: 1,
            page_size: self.config.fetch_page_size.max(1),
            ..query.clone()
        };

        let mut assignments: Vec<ResourceAssignment> = Vec::new();
        loop {
            let page = self
                .store
                .list_assignments(&page_query)
                .await
                .map_err(CoreError::Query)?;
            let last: bool = page.items.is_empty() || page.page >= page.page_count;
            assignments.extend(page.items);
            if last {
                break;
            }
            page_query.page += 1;
        }
        Ok(assignments)
    }

    /// Returns the calendar for the assignments selected by `query` over
    /// `window`, memoized by selection and window.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Query` if the assignments cannot be fetched.
    pub async fn calendar(
        &self,
        query: &AllocationQuery,
        window: ViewWindow,
        active: bool,
    ) -> Result<Arc<Vec<CalendarDay>>, CoreError> {
        let key = CalendarKey::new(query, window, active);
        if let Some(days) = self.cache.calendar(&key) {
            debug!(start = %window.start(), end = %window.end(), "Calendar served from cache");
            return Ok(days);
        }

        let epoch: u64 = self.cache.epoch();
        let fetched: Vec<ResourceAssignment> = self.fetch_all(query).await?;
        let source: Vec<ResourceAssignment> = if active {
            active_only(&fetched)
        } else {
            fetched
        };

        let days = Arc::new(aggregate_calendar(&source, &window));
        self.cache.store_calendar(key, &source, Arc::clone(&days), epoch);
        Ok(days)
    }
}
