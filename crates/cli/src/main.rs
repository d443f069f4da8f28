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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod snapshot;

use clap::{Parser, Subcommand, ValueEnum};
use staffplan::{
    AllocationCache, AllocationQueryRunner, AssignmentStore, Clock, CoreConfig,
    InMemoryFilterMemory, QueryOutcome, SnapshotStore, SystemClock, Tab, TabSet,
};
use staffplan_api::{
    AllocationService, AuditHistoryRequest, BulkAction, BulkRequest, CalendarRequest,
    ListAssignmentsResponse, PermissionGate,
};
use staffplan_audit::{AuditLogReader, StaticAuditLog};
use staffplan_domain::{
    AdvancedFilters, AllocationFilters, AssignmentId, BasicFilters, DEFAULT_PAGE_SIZE,
    QueryScope, ViewMode, format_iso_date,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Staffplan - calendar and query views over a staff allocation snapshot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the assignment snapshot (JSON array, or an object with an `assignments` array)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Path to an audit log export (JSON). History is empty without one.
    #[arg(short, long)]
    audit_log: Option<PathBuf>,

    /// Rows per page when a query does not name a page size
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Minutes remembered basic filters stay valid
    #[arg(long, default_value_t = 1440)]
    filter_ttl_minutes: u32,

    #[command(subcommand)]
    command: Command,
}

/// Filters shared by every tab.
#[derive(clap::Args, Debug, Clone, Default)]
struct BasicArgs {
    /// Free text matched against employee, project and client
    #[arg(long)]
    search: Option<String>,

    /// Strategic business unit id
    #[arg(long)]
    sbu: Option<String>,

    /// Reporting manager profile id
    #[arg(long)]
    manager: Option<String>,

    /// Bill type id
    #[arg(long)]
    bill_type: Option<String>,

    /// Project name or code
    #[arg(long)]
    project: Option<String>,
}

impl From<BasicArgs> for BasicFilters {
    fn from(args: BasicArgs) -> Self {
        Self {
            search_text: args.search,
            sbu_id: args.sbu,
            manager_id: args.manager,
            bill_type_id: args.bill_type,
            project_search: args.project,
        }
    }
}

/// Range filters of one tab.
#[derive(clap::Args, Debug, Clone, Default)]
struct AdvancedArgs {
    /// Minimum engagement percentage
    #[arg(long)]
    min_engagement: Option<f64>,

    /// Maximum engagement percentage
    #[arg(long)]
    max_engagement: Option<f64>,

    /// Minimum billing percentage
    #[arg(long)]
    min_billing: Option<f64>,

    /// Maximum billing percentage
    #[arg(long)]
    max_billing: Option<f64>,

    /// Earliest engagement start date (yyyy-MM-dd)
    #[arg(long)]
    start_from: Option<String>,

    /// Latest engagement start date (yyyy-MM-dd)
    #[arg(long)]
    start_to: Option<String>,

    /// Earliest release date (yyyy-MM-dd)
    #[arg(long)]
    end_from: Option<String>,

    /// Latest release date (yyyy-MM-dd)
    #[arg(long)]
    end_to: Option<String>,
}

impl From<AdvancedArgs> for AdvancedFilters {
    fn from(args: AdvancedArgs) -> Self {
        Self {
            min_engagement: args.min_engagement,
            max_engagement: args.max_engagement,
            min_billing: args.min_billing,
            max_billing: args.max_billing,
            start_date_from: args.start_from,
            start_date_to: args.start_to,
            end_date_from: args.end_from,
            end_date_to: args.end_to,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScopeArg {
    #[default]
    All,
    Planned,
    Validation,
    Unplanned,
}

impl From<ScopeArg> for QueryScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::All => Self::All,
            ScopeArg::Planned => Self::Planned,
            ScopeArg::Validation => Self::Validation,
            ScopeArg::Unplanned => Self::Unplanned,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TabArg {
    Planned,
    Validation,
    Unplanned,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Planned => Self::Planned,
            TabArg::Validation => Self::Validation,
            TabArg::Unplanned => Self::Unplanned,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum BulkArg {
    Delete,
    Complete,
    Validate,
    Invalidate,
    DuplicateForward,
    CopyExact,
}

impl From<BulkArg> for BulkAction {
    fn from(operation: BulkArg) -> Self {
        match operation {
            BulkArg::Delete => Self::Delete,
            BulkArg::Complete => Self::Complete,
            BulkArg::Validate => Self::Validate,
            BulkArg::Invalidate => Self::Invalidate,
            BulkArg::DuplicateForward => Self::DuplicateForward,
            BulkArg::CopyExact => Self::CopyExact,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the per-day allocation calendar
    #[command(visible_alias = "cal")]
    Calendar {
        /// Window granularity: day, week, month or quarter
        #[arg(long, default_value = "month")]
        view: ViewMode,

        /// Any date inside the window (yyyy-MM-dd); today when omitted
        #[arg(long)]
        anchor: Option<String>,

        /// Drop completed assignments before aggregating
        #[arg(long)]
        active_only: bool,

        /// Tab scope of the selection
        #[arg(long, value_enum, default_value_t = ScopeArg::All)]
        scope: ScopeArg,

        #[command(flatten)]
        basic: BasicArgs,

        #[command(flatten)]
        advanced: AdvancedArgs,
    },

    /// Print one page of a tab
    #[command(visible_alias = "ls")]
    List {
        /// The tab to query
        #[arg(long, value_enum, default_value_t = TabArg::Planned)]
        tab: TabArg,

        /// Sort field, e.g. engagementStartDate or project.name
        #[arg(long)]
        sort_field: Option<String>,

        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        sort_direction: String,

        /// Page number, 1-based
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[command(flatten)]
        basic: BasicArgs,

        #[command(flatten)]
        advanced: AdvancedArgs,
    },

    /// Run one operation over a selection of assignments
    Bulk {
        /// The operation
        #[arg(long, value_enum)]
        operation: BulkArg,

        /// Where to write the updated snapshot; the input is left untouched
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Selected assignment ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Print an assignment's audit history
    History {
        /// The assignment id
        id: String,

        /// Page number, 1-based
        #[arg(long)]
        page: Option<u32>,

        /// Entries per page
        #[arg(long)]
        page_size: Option<u32>,
    },
}

/// Everything a command runs against.
struct Planner {
    store: Arc<SnapshotStore>,
    service: AllocationService,
    tabs: TabSet,
    runner: AllocationQueryRunner,
    clock: Arc<dyn Clock>,
}

impl Planner {
    fn new(
        store: Arc<SnapshotStore>,
        audit: Arc<dyn AuditLogReader>,
        config: CoreConfig,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let shared: Arc<dyn AssignmentStore> = Arc::clone(&store) as Arc<dyn AssignmentStore>;
        let memory = Arc::new(InMemoryFilterMemory::new(
            config.filter_memory_ttl,
            Arc::clone(&clock),
        ));
        Self {
            service: AllocationService::new(
                Arc::clone(&shared),
                audit,
                Arc::clone(&clock),
                config,
            ),
            tabs: TabSet::new(memory, config),
            runner: AllocationQueryRunner::new(shared, Arc::new(AllocationCache::new()), config),
            store,
            clock,
        }
    }

    /// Runs one command and returns its JSON output.
    async fn execute(
        &mut self,
        command: Command,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let gate = PermissionGate::full();

        match command {
            Command::Calendar {
                view,
                anchor,
                active_only,
                scope,
                basic,
                advanced,
            } => {
                let request = CalendarRequest {
                    filters: AllocationFilters::compose(
                        &basic.into(),
                        &advanced.into(),
                        None,
                        1,
                        DEFAULT_PAGE_SIZE,
                    ),
                    scope: scope.into(),
                    view_mode: view,
                    anchor_date: anchor.unwrap_or_else(|| format_iso_date(self.clock.today())),
                    active_only,
                };
                let response = self.service.calendar(&gate, &request).await?;
                info!(
                    start = %response.window_start,
                    end = %response.window_end,
                    over_allocated_days = response.over_allocated_days,
                    "Computed calendar"
                );
                Ok(serde_json::to_value(response)?)
            }
            Command::List {
                tab,
                sort_field,
                sort_direction,
                page,
                basic,
                advanced,
            } => {
                let tab: Tab = tab.into();
                self.tabs.set_basic(basic.into());
                let context = self.tabs.context_mut(tab);
                context.set_advanced(advanced.into());
                if let Some(field) = sort_field {
                    context.set_sort(field, sort_direction);
                }
                context.set_page(page);

                let query = self.tabs.query(tab)?;
                let response = match self.runner.run(&query).await? {
                    QueryOutcome::Fresh(page) => ListAssignmentsResponse::new(page, false),
                    QueryOutcome::Cached(page) => ListAssignmentsResponse::new(page, true),
                    QueryOutcome::Superseded => {
                        return Err("List query was superseded".into());
                    }
                };
                Ok(serde_json::to_value(response)?)
            }
            Command::Bulk {
                operation,
                output,
                ids,
            } => {
                let request = BulkRequest {
                    operation: operation.into(),
                    ids: ids.into_iter().map(AssignmentId::new).collect(),
                };
                let response = self.service.bulk(&gate, &request).await?;
                if !response.failed.is_empty() {
                    warn!(failed = response.failed.len(), "Bulk operation partially failed");
                }
                if let Some(path) = output {
                    snapshot::save_snapshot(&path, &self.store.snapshot())?;
                }
                Ok(serde_json::to_value(response)?)
            }
            Command::History {
                id,
                page,
                page_size,
            } => {
                let request = AuditHistoryRequest { page, page_size };
                let response = self.service.audit_history(&gate, &id, &request).await?;
                Ok(serde_json::to_value(response)?)
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CoreConfig {
        default_page_size: args.page_size.max(1),
        filter_memory_ttl: time::Duration::minutes(i64::from(args.filter_ttl_minutes)),
        ..CoreConfig::default()
    };

    let assignments = snapshot::load_snapshot(&args.snapshot)?;
    let audit_entries = match &args.audit_log {
        Some(path) => snapshot::load_audit_log(path)?,
        None => Vec::new(),
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(SnapshotStore::new(assignments, clock));
    let audit: Arc<dyn AuditLogReader> = Arc::new(StaticAuditLog::new(audit_entries));
    let mut planner = Planner::new(store, audit, config);

    let output = planner.execute(args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
