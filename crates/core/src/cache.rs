// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query result and calendar memoization.
//!
//! The cache is the only shared mutable state in the core. Its locks are
//! never held across an `.await`.
//!
//! Every invalidation advances an epoch. Readers capture the epoch before
//! their store call and pass it back when caching; a result read before an
//! invalidation is dropped instead of cached.

use staffplan_domain::{
    AllocationQuery, CalendarDay, PagedResult, ProfileId, ResourceAssignment, ViewWindow,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Identifies one memoized calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarKey {
    /// The selection the assignments were fetched with.
    pub selection: AllocationQuery,
    /// The requested window.
    pub window: ViewWindow,
    /// Whether completed assignments were dropped first.
    pub active_only: bool,
}

impl CalendarKey {
    /// Builds the key, reducing `query` to its selection.
    #[must_use]
    pub fn new(query: &AllocationQuery, window: ViewWindow, active_only: bool) -> Self {
        Self {
            selection: query.selection_key(),
            window,
            active_only,
        }
    }
}

#[derive(Debug)]
struct CalendarEntry {
    days: Arc<Vec<CalendarDay>>,
    profiles: BTreeSet<ProfileId>,
}

/// Shared cache of query pages and calendars.
#[derive(Debug, Default)]
pub struct AllocationCache {
    results: Mutex<HashMap<AllocationQuery, PagedResult<ResourceAssignment>>>,
    calendars: Mutex<HashMap<CalendarKey, CalendarEntry>>,
    epoch: AtomicU64,
}

impl AllocationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a cached page.
    #[must_use]
    pub fn result(&self, query: &AllocationQuery) -> Option<PagedResult<ResourceAssignment>> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
            .cloned()
    }

    /// The current invalidation epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Caches a page read at `epoch`, unless an invalidation happened since.
    pub fn store_result(
        &self,
        query: AllocationQuery,
        page: PagedResult<ResourceAssignment>,
        epoch: u64,
    ) {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if self.epoch() != epoch {
            debug!(epoch, "Dropping page read before an invalidation");
            return;
        }
        results.insert(query, page);
    }

    /// Returns a memoized calendar.
    #[must_use]
    pub fn calendar(&self, key: &CalendarKey) -> Option<Arc<Vec<CalendarDay>>> {
        self.calendars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|entry| Arc::clone(&entry.days))
    }

    /// Memoizes a calendar computed from `source` read at `epoch`, unless an
    /// invalidation happened since.
    pub fn store_calendar(
        &self,
        key: CalendarKey,
        source: &[ResourceAssignment],
        days: Arc<Vec<CalendarDay>>,
        epoch: u64,
    ) {
        let profiles: BTreeSet<ProfileId> = source
            .iter()
            .map(|assignment| assignment.profile_id.clone())
            .collect();
        let mut calendars = self.calendars.lock().unwrap_or_else(PoisonError::into_inner);
        if self.epoch() != epoch {
            debug!(epoch, "Dropping calendar computed before an invalidation");
            return;
        }
        calendars.insert(key, CalendarEntry { days, profiles });
    }

    fn advance_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Evicts every query page and every calendar computed from an
    /// assignment of one of `profiles`.
    ///
    /// Pages are always dropped: a flag change can move a record between
    /// tab scopes.
    pub fn invalidate_profiles(&self, profiles: &[ProfileId]) {
        {
            let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
            self.advance_epoch();
            results.clear();
        }

        let mut calendars = self.calendars.lock().unwrap_or_else(PoisonError::into_inner);
        let before: usize = calendars.len();
        calendars.retain(|_, entry| !profiles.iter().any(|id| entry.profiles.contains(id)));
        debug!(
            profiles = profiles.len(),
            evicted = before - calendars.len(),
            "Invalidated cached calendars by profile"
        );
    }

    /// Evicts everything.
    pub fn invalidate_all(&self) {
        {
            let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
            self.advance_epoch();
            results.clear();
        }
        self.calendars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Invalidated all cached results");
    }

    /// Number of cached pages.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of memoized calendars.
    #[must_use]
    pub fn calendar_count(&self) -> usize {
        self.calendars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
