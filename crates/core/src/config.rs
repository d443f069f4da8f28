// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffplan_domain::DEFAULT_PAGE_SIZE;
use time::Duration;

/// Rows requested per page when a whole selection is fetched.
pub const FETCH_ALL_PAGE_SIZE: u32 = 500;

/// Runtime settings of the planning core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    /// Page size used when a query does not name one.
    pub default_page_size: u32,
    /// How long remembered basic filters stay valid.
    pub filter_memory_ttl: Duration,
    /// Page size used when fetching a whole selection for the calendar.
    pub fetch_page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            filter_memory_ttl: Duration::hours(24),
            fetch_page_size: FETCH_ALL_PAGE_SIZE,
        }
    }
}
