// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-tab query contexts over one shared set of basic filters.
//!
//! The basic filters live in `FilterMemory` and are shared by every tab.
//! Advanced filters, sort and pagination belong to a single tab. Changing
//! the basic filters sends every tab back to page 1.

use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::filter_memory::FilterMemory;
use staffplan_domain::{
    AdvancedFilters, AllocationFilters, AllocationQuery, BasicFilters, QueryScope,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
struct TabState {
    advanced: AdvancedFilters,
    sort: Option<(String, String)>,
    page: u32,
    page_size: u32,
}

/// The three allocation tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Assignments on real projects.
    Planned,
    /// Assignments awaiting weekly validation.
    Validation,
    /// Forecast and unassigned capacity.
    Unplanned,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: [Self; 3] = [Self::Planned, Self::Validation, Self::Unplanned];

    /// The fixed scope this tab adds to its queries.
    #[must_use]
    pub const fn scope(self) -> QueryScope {
        match self {
            Self::Planned => QueryScope::Planned,
            Self::Validation => QueryScope::Validation,
            Self::Unplanned => QueryScope::Unplanned,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Planned => 0,
            Self::Validation => 1,
            Self::Unplanned => 2,
        }
    }
}

/// The independent query context of one tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabContext {
    tab: Tab,
    state: TabState,
}

impl TabContext {
    /// Creates a context on page 1 with no advanced filters.
    #[must_use]
    pub fn new(tab: Tab, page_size: u32) -> Self {
        Self {
            tab,
            state: TabState {
                page: 1,
                page_size,
                ..TabState::default()
            },
        }
    }

    /// The tab this context belongs to.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    /// Current page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.state.page
    }

    /// Current advanced filters.
    #[must_use]
    pub const fn advanced(&self) -> &AdvancedFilters {
        &self.state.advanced
    }

    /// Replaces the advanced filters and returns to page 1.
    pub fn set_advanced(&mut self, advanced: AdvancedFilters) {
        self.state.advanced = advanced;
        self.state.page = 1;
    }

    /// Sets the sort field and direction and returns to page 1.
    pub fn set_sort(&mut self, field: impl Into<String>, direction: impl Into<String>) {
        self.state.sort = Some((field.into(), direction.into()));
        self.state.page = 1;
    }

    /// Moves to another page.
    pub fn set_page(&mut self, page: u32) {
        self.state.page = page.max(1);
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.state.page_size = page_size;
        self.state.page = 1;
    }

    /// Builds the canonical query for this tab over `basic`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for malformed filters.
    pub fn query(
        &self,
        basic: &BasicFilters,
        default_page_size: u32,
    ) -> Result<AllocationQuery, CoreError> {
        let filters = AllocationFilters::compose(
            basic,
            &self.state.advanced,
            self.state.sort.as_ref(),
            self.state.page,
            self.state.page_size,
        );
        Ok(AllocationQuery::normalize(
            &filters,
            self.tab.scope(),
            default_page_size,
        )?)
    }
}

/// The contexts of all tabs plus the shared basic filters.
pub struct TabSet {
    memory: Arc<dyn FilterMemory>,
    config: CoreConfig,
    contexts: [TabContext; 3],
}

impl TabSet {
    /// Creates a tab set reading its basic filters from `memory`.
    #[must_use]
    pub fn new(memory: Arc<dyn FilterMemory>, config: CoreConfig) -> Self {
        let contexts = Tab::ALL.map(|tab| TabContext::new(tab, config.default_page_size));
        Self {
            memory,
            config,
            contexts,
        }
    }

    /// The shared basic filters, or none if the remembered set expired.
    #[must_use]
    pub fn basic(&self) -> BasicFilters {
        self.memory.expire();
        self.memory.get().unwrap_or_default()
    }

    /// Replaces the shared basic filters.
    ///
    /// Every tab returns to page 1 when the filters actually change; blank
    /// and absent values count as the same filter.
    pub fn set_basic(&mut self, filters: BasicFilters) {
        if self.basic().normalized() != filters.normalized() {
            debug!("Basic filters changed, resetting pagination");
            for context in &mut self.contexts {
                context.set_page(1);
            }
        }
        self.memory.set(filters);
    }

    /// Forgets the shared basic filters.
    pub fn clear_basic(&mut self) {
        self.memory.clear();
        for context in &mut self.contexts {
            context.set_page(1);
        }
    }

    /// One tab's context.
    #[must_use]
    pub const fn context(&self, tab: Tab) -> &TabContext {
        &self.contexts[tab.index()]
    }

    /// One tab's context, mutably.
    pub fn context_mut(&mut self, tab: Tab) -> &mut TabContext {
        &mut self.contexts[tab.index()]
    }

    /// Builds the canonical query of one tab.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for malformed filters.
    pub fn query(&self, tab: Tab) -> Result<AllocationQuery, CoreError> {
        self.context(tab)
            .query(&self.basic(), self.config.default_page_size)
    }
}
