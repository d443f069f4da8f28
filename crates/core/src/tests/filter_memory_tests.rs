// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_clock;
use crate::{FilterMemory, InMemoryFilterMemory};
use staffplan_domain::BasicFilters;
use std::sync::Arc;
use time::Duration;

fn filters(search: &str) -> BasicFilters {
    BasicFilters {
        search_text: Some(search.to_string()),
        ..BasicFilters::default()
    }
}

#[test]
fn test_remembers_until_ttl() {
    let clock = create_test_clock();
    let memory = InMemoryFilterMemory::new(Duration::hours(24), Arc::clone(&clock) as _);

    memory.set(filters("alice"));
    clock.advance(Duration::hours(23));
    assert_eq!(memory.get(), Some(filters("alice")));
    assert!(!memory.expire());

    clock.advance(Duration::hours(1));
    assert_eq!(memory.get(), None);
    assert!(memory.expire());
    assert!(!memory.expire());
}

#[test]
fn test_set_restarts_the_expiry_period() {
    let clock = create_test_clock();
    let memory = InMemoryFilterMemory::new(Duration::minutes(30), Arc::clone(&clock) as _);

    memory.set(filters("alice"));
    clock.advance(Duration::minutes(20));
    memory.set(filters("bob"));
    clock.advance(Duration::minutes(20));

    assert_eq!(memory.get(), Some(filters("bob")));
}

#[test]
fn test_clear_forgets_immediately() {
    let clock = create_test_clock();
    let memory = InMemoryFilterMemory::new(Duration::hours(1), Arc::clone(&clock) as _);

    memory.set(filters("alice"));
    memory.clear();

    assert_eq!(memory.get(), None);
}
