// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::clock::Clock;
use staffplan_domain::BasicFilters;
use std::sync::{Arc, Mutex, PoisonError};
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Remembers the basic filters shared by every tab.
pub trait FilterMemory: Send + Sync {
    /// Returns the remembered filters, if any are still valid.
    fn get(&self) -> Option<BasicFilters>;

    /// Remembers `filters`, restarting the expiry period.
    fn set(&self, filters: BasicFilters);

    /// Forgets the remembered filters.
    fn clear(&self);

    /// Forgets the remembered filters if they have expired.
    ///
    /// Returns whether anything was forgotten.
    fn expire(&self) -> bool;
}

#[derive(Debug)]
struct Remembered {
    filters: BasicFilters,
    stored_at: OffsetDateTime,
}

/// Process-local filter memory with a time-to-live.
pub struct InMemoryFilterMemory {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<Remembered>>,
}

impl InMemoryFilterMemory {
    /// Creates an empty memory whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    fn is_expired(&self, remembered: &Remembered) -> bool {
        self.clock.now() - remembered.stored_at >= self.ttl
    }
}

impl FilterMemory for InMemoryFilterMemory {
    fn get(&self) -> Option<BasicFilters> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|remembered| !self.is_expired(remembered))
            .map(|remembered| remembered.filters.clone())
    }

    fn set(&self, filters: BasicFilters) {
        let stored_at = self.clock.now();
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Remembered { filters, stored_at });
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn expire(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|remembered| self.is_expired(remembered)) {
            *slot = None;
            debug!("Remembered filters expired");
            return true;
        }
        false
    }
}
