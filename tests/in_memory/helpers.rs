//! Shared test helpers for in-memory repository integration tests.

use baton::analytics::services::AnalyticsService;
use baton::workflow::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{Role, Task},
    services::{CompletionRequest, DelegationRequest, DelegationService, StatusService},
};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::runtime::Runtime;

/// Deterministic clock advancing one second per reading.
#[derive(Debug)]
pub struct TickClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TickClock {
    pub fn new() -> Self {
        let base = Utc
            .with_ymd_and_hms(2026, 3, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        Self {
            base,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for TickClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::seconds(tick)
    }
}

pub type Tracker = DelegationService<InMemoryWorkflowRepository, TickClock>;
pub type Projector = StatusService<InMemoryWorkflowRepository, TickClock>;
pub type Aggregator = AnalyticsService<InMemoryWorkflowRepository>;

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Provides a fresh in-memory repository for each test.
#[fixture]
pub fn repo() -> Arc<InMemoryWorkflowRepository> {
    Arc::new(InMemoryWorkflowRepository::new())
}

/// Provides a deterministic clock for each test.
#[fixture]
pub fn clock() -> Arc<TickClock> {
    Arc::new(TickClock::new())
}

/// Builds the tracker service over the shared repository and clock.
pub fn tracker(repo: &Arc<InMemoryWorkflowRepository>, clock: &Arc<TickClock>) -> Tracker {
    DelegationService::new(Arc::clone(repo), Arc::clone(clock))
}

/// Builds the status projector over the shared repository and clock.
pub fn projector(repo: &Arc<InMemoryWorkflowRepository>, clock: &Arc<TickClock>) -> Projector {
    StatusService::new(Arc::clone(repo), Arc::clone(clock))
}

/// Builds the analytics aggregator over the shared repository.
pub fn aggregator(repo: &Arc<InMemoryWorkflowRepository>) -> Aggregator {
    AnalyticsService::new(Arc::clone(repo))
}

/// Drives one task through the full pipeline: intake hands off to
/// architecture, the work moves forward to review, review rejects once,
/// implementation fixes it, and the chain unwinds back to a terminal
/// close-out by intake.
pub fn drive_full_pipeline(rt: &Runtime, tracker: &Tracker, name: &str) -> Task {
    let task = rt
        .block_on(tracker.create_task(name))
        .expect("task creation should succeed");
    let task_id = task.id();

    let forward = [
        (Role::Intake, Role::Architecture),
        (Role::Architecture, Role::Implementation),
        (Role::Implementation, Role::Review),
    ];
    for (from, to) in forward {
        rt.block_on(tracker.delegate(DelegationRequest::new(task_id, from, to)))
            .expect("forward delegation should succeed");
    }

    rt.block_on(tracker.complete(CompletionRequest::rejected(
        task_id,
        Role::Review,
        "tests are missing",
    )))
    .expect("review rejection should succeed");

    rt.block_on(tracker.delegate(DelegationRequest::new(
        task_id,
        Role::Implementation,
        Role::Review,
    )))
    .expect("fix-up delegation should succeed");

    let unwinds = [
        Role::Review,
        Role::Implementation,
        Role::Architecture,
        Role::Intake,
    ];
    let mut latest = None;
    for role in unwinds {
        let result = rt
            .block_on(tracker.complete(CompletionRequest::completed(task_id, role)))
            .expect("completion should succeed");
        latest = Some(result.task);
    }
    latest.expect("the unwind produced a task state")
}
