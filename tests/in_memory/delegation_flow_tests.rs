//! Delegation chain round-trip tests over the in-memory adapter.

use super::helpers::{TickClock, clock, drive_full_pipeline, repo, runtime, tracker};
use baton::workflow::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{DelegationOutcome, Role, TaskStatus},
    ports::WorkflowRepository,
    services::{CompletionRequest, DelegationRequest},
};
use rstest::rstest;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[rstest]
fn full_pipeline_unwinds_to_a_terminal_close_out(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);

    let task = drive_full_pipeline(&rt, &service, "Ship the exporter rewrite");

    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(task.current_owner(), None);
    assert!(task.completed_at().is_some());

    let history = rt
        .block_on(repo.history_for_task(task.id()))
        .expect("history lookup should succeed");
    assert_eq!(history.len(), 8);
}

#[rstest]
fn stored_histories_uphold_the_ordering_and_linkage_invariants(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);

    let task = drive_full_pipeline(&rt, &service, "Harden the webhook retries");
    let history = rt
        .block_on(repo.history_for_task(task.id()))
        .expect("history lookup should succeed");

    for window in history.windows(2) {
        let [previous, current] = window else {
            continue;
        };
        assert!(current.delegated_at() > previous.delegated_at());
        assert_eq!(current.from_role(), previous.to_role());
    }
}

#[rstest]
fn delegation_round_trip_restores_the_delegator(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);

    let task = rt
        .block_on(service.create_task("Document the ingest API"))
        .expect("task creation should succeed");
    rt.block_on(service.delegate(DelegationRequest::new(
        task.id(),
        Role::Intake,
        Role::Architecture,
    )))
    .expect("delegation should succeed");
    let result = rt
        .block_on(service.complete(CompletionRequest::completed(task.id(), Role::Architecture)))
        .expect("completion should succeed");

    assert_eq!(result.task.current_owner(), Some(Role::Intake));
    let history = rt
        .block_on(repo.history_for_task(task.id()))
        .expect("history lookup should succeed");
    assert_eq!(history.len(), 2);
    let unwind = history.last().expect("unwind record exists");
    assert_eq!(unwind.outcome(), DelegationOutcome::Accepted);
}

#[rstest]
fn redelegation_round_trip_preserves_the_reason_verbatim(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);

    let task = rt
        .block_on(service.create_task("Tune the queue consumers"))
        .expect("task creation should succeed");
    rt.block_on(service.delegate(DelegationRequest::new(
        task.id(),
        Role::Intake,
        Role::Architecture,
    )))
    .expect("delegation should succeed");
    let result = rt
        .block_on(service.complete(CompletionRequest::rejected(
            task.id(),
            Role::Architecture,
            "missing diagram",
        )))
        .expect("rejection should succeed");

    assert_eq!(result.task.current_owner(), Some(Role::Intake));
    assert_eq!(result.task.status(), TaskStatus::NeedsChanges);
    let record = result.record.expect("rejection appends a record");
    assert_eq!(record.outcome(), DelegationOutcome::Rejected);
    assert_eq!(record.rejection_reason(), Some("missing diagram"));
}

#[rstest]
fn histories_of_different_tasks_stay_separate(
    runtime: io::Result<Runtime>,
    repo: Arc<InMemoryWorkflowRepository>,
    clock: Arc<TickClock>,
) {
    let rt = runtime.expect("runtime");
    let service = tracker(&repo, &clock);

    let first = drive_full_pipeline(&rt, &service, "First stream");
    let second = rt
        .block_on(service.create_task("Second stream"))
        .expect("task creation should succeed");
    rt.block_on(service.delegate(DelegationRequest::new(
        second.id(),
        Role::Intake,
        Role::Research,
    )))
    .expect("delegation should succeed");

    let first_history = rt
        .block_on(repo.history_for_task(first.id()))
        .expect("history lookup should succeed");
    let second_history = rt
        .block_on(repo.history_for_task(second.id()))
        .expect("history lookup should succeed");

    assert_eq!(first_history.len(), 8);
    assert_eq!(second_history.len(), 1);
    assert!(
        second_history
            .iter()
            .all(|record| record.task_id() == second.id())
    );
}
