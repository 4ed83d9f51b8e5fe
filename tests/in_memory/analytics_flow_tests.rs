//! Cross-task analytics tests over the in-memory adapter.

use super::helpers::{
    TickClock, aggregator, clock, drive_full_pipeline, repo, runtime, tracker,
};
use baton::workflow::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{HistoryFilter, Role},
};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[rstest]
fn common_paths_rank_the_busiest_edges_first(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let analytics = aggregator(&repo);

    drive_full_pipeline(&rt, &service, "First rollout");
    drive_full_pipeline(&rt, &service, "Second rollout");

    let result = rt
        .block_on(analytics.delegation_analytics(&HistoryFilter::default()))
        .expect("aggregation should succeed");

    assert_eq!(result.excluded_tasks, 0);
    let top = result.common_paths.first().expect("top path exists");
    // Each pipeline crosses implementation -> review twice (initial and
    // fix-up), so that edge leads with four crossings over two tasks.
    assert_eq!(top.from_role, Role::Implementation);
    assert_eq!(top.to_role, Role::Review);
    assert_eq!(top.count, 4);
}

#[rstest]
fn hotspots_collect_rejection_reasons_across_tasks(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let analytics = aggregator(&repo);

    drive_full_pipeline(&rt, &service, "First rollout");
    drive_full_pipeline(&rt, &service, "Second rollout");

    let result = rt
        .block_on(analytics.delegation_analytics(&HistoryFilter::default()))
        .expect("aggregation should succeed");

    let hotspot = result.hotspots.first().expect("hotspot exists");
    assert_eq!(hotspot.from_role, Role::Review);
    assert_eq!(hotspot.to_role, Role::Implementation);
    assert_eq!(hotspot.count, 2);
    // The identical reason from both tasks is deduplicated.
    assert_eq!(hotspot.reasons, ["tests are missing"]);
}

#[rstest]
fn role_metrics_aggregate_over_every_tracked_task(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let analytics = aggregator(&repo);

    drive_full_pipeline(&rt, &service, "First rollout");
    drive_full_pipeline(&rt, &service, "Second rollout");

    let report = rt
        .block_on(analytics.role_metrics(&HistoryFilter::default()))
        .expect("aggregation should succeed");

    assert_eq!(report.excluded_tasks, 0);
    let intake = report
        .metrics
        .iter()
        .find(|metric| metric.role == Role::Intake)
        .expect("intake metric exists");
    // Intake only receives the final accepted unwind of each chain.
    assert_eq!(intake.tasks_received, 2);
    assert!((intake.success_rate - 1.0).abs() < f64::EPSILON);

    let implementation = report
        .metrics
        .iter()
        .find(|metric| metric.role == Role::Implementation)
        .expect("implementation metric exists");
    assert_eq!(implementation.tasks_received, 2);
    assert!(implementation.average_completion_time.is_some());
    assert!(implementation.workload_share > 0.0);
}

#[rstest]
fn a_window_before_any_activity_yields_zero_valued_aggregates(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let analytics = aggregator(&repo);

    drive_full_pipeline(&rt, &service, "Only rollout");

    let cutoff = Utc
        .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    let filter = HistoryFilter::default().with_end_date(cutoff);

    let result = rt
        .block_on(analytics.delegation_analytics(&filter))
        .expect("aggregation should succeed");
    assert!(result.common_paths.is_empty());
    assert!(result.hotspots.is_empty());
    assert!(result.bottlenecks.is_empty());
    assert_eq!(result.excluded_tasks, 0);

    let report = rt
        .block_on(analytics.role_metrics(&filter))
        .expect("aggregation should succeed");
    assert!(report.metrics.iter().all(|metric| metric.tasks_received == 0));
}
