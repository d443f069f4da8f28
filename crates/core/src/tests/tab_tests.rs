// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_clock;
use crate::{CoreConfig, InMemoryFilterMemory, ManualClock, Tab, TabSet};
use staffplan_domain::{AdvancedFilters, BasicFilters, Percentage, QueryScope};
use std::sync::Arc;
use time::Duration;

fn create_tab_set() -> (TabSet, Arc<ManualClock>) {
    let clock = create_test_clock();
    let config = CoreConfig::default();
    let memory = InMemoryFilterMemory::new(config.filter_memory_ttl, Arc::clone(&clock) as _);
    (TabSet::new(Arc::new(memory), config), clock)
}

fn search(text: &str) -> BasicFilters {
    BasicFilters {
        search_text: Some(text.to_string()),
        ..BasicFilters::default()
    }
}

#[test]
fn test_basic_filters_are_shared_by_every_tab() {
    let (mut tabs, _clock) = create_tab_set();

    tabs.set_basic(search("alice"));

    for tab in Tab::ALL {
        let query = tabs.query(tab).unwrap();
        assert_eq!(query.search_text.as_deref(), Some("alice"));
        assert_eq!(query.scope, tab.scope());
    }
}

#[test]
fn test_changing_basic_filters_resets_every_page() {
    let (mut tabs, _clock) = create_tab_set();
    tabs.context_mut(Tab::Planned).set_page(3);
    tabs.context_mut(Tab::Unplanned).set_page(2);

    tabs.set_basic(search("alice"));

    for tab in Tab::ALL {
        assert_eq!(tabs.context(tab).page(), 1);
    }
}

#[test]
fn test_setting_the_same_basic_filters_keeps_pages() {
    let (mut tabs, _clock) = create_tab_set();
    tabs.set_basic(search("alice"));
    tabs.context_mut(Tab::Validation).set_page(4);

    tabs.set_basic(search("alice"));

    assert_eq!(tabs.context(Tab::Validation).page(), 4);
}

#[test]
fn test_blank_basic_filters_match_absent_ones() {
    let (mut tabs, _clock) = create_tab_set();
    tabs.context_mut(Tab::Planned).set_page(3);

    tabs.set_basic(BasicFilters {
        search_text: Some(String::from("  ")),
        sbu_id: Some(String::new()),
        ..BasicFilters::default()
    });

    assert_eq!(tabs.context(Tab::Planned).page(), 3);

    tabs.set_basic(search(" alice "));
    tabs.context_mut(Tab::Planned).set_page(2);
    tabs.set_basic(search("alice"));

    assert_eq!(tabs.context(Tab::Planned).page(), 2);
}

#[test]
fn test_advanced_filters_are_per_tab() {
    let (mut tabs, _clock) = create_tab_set();

    tabs.context_mut(Tab::Planned).set_advanced(AdvancedFilters {
        min_engagement: Some(50.0),
        ..AdvancedFilters::default()
    });

    let planned = tabs.query(Tab::Planned).unwrap();
    let validation = tabs.query(Tab::Validation).unwrap();
    assert_eq!(planned.engagement.min, Some(Percentage::whole(50)));
    assert_eq!(validation.engagement.min, None);
    assert_ne!(planned.scope, QueryScope::Validation);
}

#[test]
fn test_remembered_filters_expire() {
    let (mut tabs, clock) = create_tab_set();
    tabs.set_basic(search("alice"));

    clock.advance(Duration::hours(25));

    assert_eq!(tabs.basic(), BasicFilters::default());
    assert_eq!(tabs.query(Tab::Planned).unwrap().search_text, None);
}

#[test]
fn test_malformed_advanced_filter_fails_only_that_tab() {
    let (mut tabs, _clock) = create_tab_set();

    tabs.context_mut(Tab::Unplanned).set_advanced(AdvancedFilters {
        start_date_from: Some(String::from("2024-13-01")),
        ..AdvancedFilters::default()
    });

    assert!(tabs.query(Tab::Unplanned).unwrap_err().is_validation());
    assert!(tabs.query(Tab::Planned).is_ok());
}

#[test]
fn test_sort_change_returns_to_first_page() {
    let (mut tabs, _clock) = create_tab_set();
    let context = tabs.context_mut(Tab::Planned);
    context.set_page(5);

    context.set_sort("releaseDate", "desc");

    let query = tabs.query(Tab::Planned).unwrap();
    assert_eq!(query.page, 1);
    assert_eq!(query.sort.unwrap().field, "releaseDate");
}
