// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod bulk;
mod cache;
mod clock;
mod config;
mod edits;
mod error;
mod filter_memory;
mod lifecycle;
mod memory;
mod query_runner;
mod store;
mod tabs;

#[cfg(test)]
mod tests;

pub use bulk::{BulkFailure, BulkOperation, BulkOperationCoordinator, BulkOutcome};
pub use cache::{AllocationCache, CalendarKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CoreConfig, FETCH_ALL_PAGE_SIZE};
pub use edits::AssignmentEditor;
pub use error::CoreError;
pub use filter_memory::{FilterMemory, InMemoryFilterMemory};
pub use lifecycle::{TransitionOutcome, ValidationLifecycle};
pub use memory::SnapshotStore;
pub use query_runner::{AllocationQueryRunner, QueryOutcome};
pub use store::{AssignmentStore, IdResult, StoreError};
pub use tabs::{Tab, TabContext, TabSet};
