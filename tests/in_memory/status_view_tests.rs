//! Status projection tests over tracked tasks.

use super::helpers::{TickClock, clock, drive_full_pipeline, projector, repo, runtime, tracker};
use baton::workflow::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{BlockerKind, Role, UnitProgress},
    services::{CompletionRequest, DelegationRequest},
};
use rstest::rstest;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[rstest]
fn projection_tracks_the_current_stage_and_estimate(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let status = projector(&repo, &clock);

    let task = rt
        .block_on(service.create_task("Index the audit trail"))
        .expect("task creation should succeed");
    rt.block_on(service.delegate(DelegationRequest::new(
        task.id(),
        Role::Intake,
        Role::Architecture,
    )))
    .expect("delegation should succeed");
    rt.block_on(service.delegate(DelegationRequest::new(
        task.id(),
        Role::Architecture,
        Role::Implementation,
    )))
    .expect("delegation should succeed");

    let view = rt
        .block_on(status.status(task.id()))
        .expect("projection should succeed");

    assert_eq!(view.current_stage, Some(Role::Implementation));
    assert!((view.completion_percentage - 0.6).abs() < f64::EPSILON);
    assert!(view.time_in_current_stage.is_some());
    assert!(view.blockers.is_empty());
}

#[rstest]
fn supplied_unit_counts_override_the_stage_estimate(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let status = projector(&repo, &clock);

    let task = rt
        .block_on(service.create_task("Partition the metrics store"))
        .expect("task creation should succeed");
    rt.block_on(service.delegate(DelegationRequest::new(
        task.id(),
        Role::Intake,
        Role::Architecture,
    )))
    .expect("delegation should succeed");

    let view = rt
        .block_on(status.status_with_units(task.id(), UnitProgress::new(7, 10)))
        .expect("projection should succeed");

    assert!((view.completion_percentage - 0.7).abs() < f64::EPSILON);
}

#[rstest]
fn repeated_rejections_surface_as_blockers(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let status = projector(&repo, &clock);

    let task = rt
        .block_on(service.create_task("Stabilize the importer"))
        .expect("task creation should succeed");
    for round in 0..3 {
        rt.block_on(service.delegate(DelegationRequest::new(
            task.id(),
            Role::Intake,
            Role::Architecture,
        )))
        .expect("delegation should succeed");
        let reason = format!("attempt {round} is incomplete");
        rt.block_on(service.complete(CompletionRequest::rejected(
            task.id(),
            Role::Architecture,
            reason,
        )))
        .expect("rejection should succeed");
    }

    let view = rt
        .block_on(status.status(task.id()))
        .expect("projection should succeed");

    assert!(
        view.blockers
            .iter()
            .any(|blocker| blocker.kind == BlockerKind::RepeatedRejection)
    );
    assert!(
        view.blockers
            .iter()
            .any(|blocker| blocker.kind == BlockerKind::ReworkOutstanding)
    );
}

#[rstest]
fn completed_tasks_project_as_fully_done(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);
    let status = projector(&repo, &clock);

    let task = drive_full_pipeline(&rt, &service, "Finish the rollout");

    let view = rt
        .block_on(status.status(task.id()))
        .expect("projection should succeed");

    assert_eq!(view.current_stage, None);
    assert!((view.completion_percentage - 1.0).abs() < f64::EPSILON);
    assert_eq!(view.time_in_current_stage, None);
}
