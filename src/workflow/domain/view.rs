//! Point-in-time workflow status projection.
//!
//! [`project`] is a pure function: identical inputs (including `now`)
//! produce an identical view, so upstream callers can cache or diff the
//! result.

use super::{DelegationChain, DelegationOutcome, Role, Task, TaskStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;

/// Category of a derived workflow blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockerKind {
    /// A role keeps receiving rejected work within the current chain.
    RepeatedRejection,
    /// The task is paused.
    PausedTask,
    /// A rejection returned the task and rework is outstanding.
    ReworkOutstanding,
}

impl BlockerKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RepeatedRejection => "repeated_rejection",
            Self::PausedTask => "paused_task",
            Self::ReworkOutstanding => "rework_outstanding",
        }
    }
}

impl fmt::Display for BlockerKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Severity of a derived workflow blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockerSeverity {
    /// Informational; progress is possible.
    Low,
    /// Progress is degraded.
    Medium,
    /// Progress is effectively stalled.
    High,
}

/// One derived blocker entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    /// Blocker category.
    pub kind: BlockerKind,
    /// Human-readable description.
    pub description: String,
    /// Derived severity.
    pub severity: BlockerSeverity,
}

/// Sub-unit completion counts supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitProgress {
    completed: u32,
    total: u32,
}

impl UnitProgress {
    /// Creates a progress report of `completed` out of `total` units.
    #[must_use]
    pub const fn new(completed: u32, total: u32) -> Self {
        Self { completed, total }
    }

    /// Returns the completion ratio clamped to `[0, 1]`.
    #[must_use]
    pub fn ratio(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (f64::from(self.completed) / f64::from(self.total)).clamp(0.0, 1.0)
    }
}

/// Tuning knobs for blocker derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockerPolicy {
    max_redelegations: usize,
}

impl BlockerPolicy {
    /// Creates the default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_redelegations: 2,
        }
    }

    /// Sets the number of received rejections a role tolerates before it
    /// is flagged.
    #[must_use]
    pub const fn with_max_redelegations(mut self, max: usize) -> Self {
        self.max_redelegations = max;
        self
    }

    /// Returns the tolerated rejection count.
    #[must_use]
    pub const fn max_redelegations(&self) -> usize {
        self.max_redelegations
    }
}

impl Default for BlockerPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only summary of a task's position in the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTransitionView {
    /// Role currently owning the task, if any.
    pub current_stage: Option<Role>,
    /// Forward progress in `[0, 1]`.
    pub completion_percentage: f64,
    /// Time since the current owner received the task.
    pub time_in_current_stage: Option<Duration>,
    /// Derived blockers, deterministic in content and order.
    pub blockers: Vec<Blocker>,
}

/// Projects a task and its replayed chain into a transition view.
///
/// When `units` is supplied the completion percentage is the unit ratio;
/// otherwise it is estimated from the current stage's pipeline position.
#[must_use]
pub fn project(
    task: &Task,
    chain: &DelegationChain,
    units: Option<UnitProgress>,
    policy: &BlockerPolicy,
    now: DateTime<Utc>,
) -> WorkflowTransitionView {
    WorkflowTransitionView {
        current_stage: task.current_owner(),
        completion_percentage: completion_percentage(task, units),
        time_in_current_stage: time_in_current_stage(task, chain, now),
        blockers: derive_blockers(task, chain, policy),
    }
}

fn completion_percentage(task: &Task, units: Option<UnitProgress>) -> f64 {
    if task.status() == TaskStatus::Completed {
        return 1.0;
    }
    if let Some(progress) = units {
        return progress.ratio();
    }
    task.current_owner().map_or(0.0, |role| {
        stage_fraction(role.stage_index(), Role::PIPELINE.len())
    })
}

fn stage_fraction(index: usize, stages: usize) -> f64 {
    if stages == 0 {
        return 0.0;
    }
    index as f64 / stages as f64
}

fn time_in_current_stage(
    task: &Task,
    chain: &DelegationChain,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let owner = task.current_owner()?;
    chain
        .records()
        .iter()
        .rev()
        .find(|record| record.to_role() == owner)
        .map(|record| now - record.delegated_at())
}

fn derive_blockers(task: &Task, chain: &DelegationChain, policy: &BlockerPolicy) -> Vec<Blocker> {
    let mut rejections_by_role: HashMap<Role, usize> = HashMap::new();
    for record in chain.records() {
        if record.outcome() == DelegationOutcome::Rejected {
            *rejections_by_role.entry(record.to_role()).or_insert(0) += 1;
        }
    }

    let mut blockers = Vec::new();
    for role in Role::PIPELINE {
        let count = rejections_by_role.get(&role).copied().unwrap_or(0);
        if count > policy.max_redelegations() {
            blockers.push(Blocker {
                kind: BlockerKind::RepeatedRejection,
                description: format!(
                    "{role} received {count} rejections in the current chain"
                ),
                severity: rejection_severity(count, policy.max_redelegations()),
            });
        }
    }

    match task.status() {
        TaskStatus::Paused => blockers.push(Blocker {
            kind: BlockerKind::PausedTask,
            description: "task is paused".to_owned(),
            severity: BlockerSeverity::Low,
        }),
        TaskStatus::NeedsChanges => blockers.push(Blocker {
            kind: BlockerKind::ReworkOutstanding,
            description: "a rejection returned the task and rework is outstanding".to_owned(),
            severity: BlockerSeverity::Low,
        }),
        _ => {}
    }

    blockers
}

const fn rejection_severity(count: usize, threshold: usize) -> BlockerSeverity {
    if count >= threshold * 2 {
        BlockerSeverity::High
    } else {
        BlockerSeverity::Medium
    }
}
