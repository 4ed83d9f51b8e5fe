//! Task aggregate root and its status state machine.

use super::{ParseTaskStatusError, Role, TaskId, TaskName, WorkflowDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but no delegation has been recorded.
    NotStarted,
    /// Task is owned by a role and being worked.
    InProgress,
    /// Task is awaiting review.
    NeedsReview,
    /// Task has been completed.
    Completed,
    /// A rejection returned the task for rework.
    NeedsChanges,
    /// Task work is temporarily paused.
    Paused,
    /// Task has been abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::NeedsReview => "needs_review",
            Self::Completed => "completed",
            Self::NeedsChanges => "needs_changes",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the status accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::NotStarted, Self::InProgress | Self::Cancelled)
                | (
                    Self::InProgress,
                    Self::NeedsReview
                        | Self::NeedsChanges
                        | Self::Paused
                        | Self::Completed
                        | Self::Cancelled
                )
                | (
                    Self::NeedsReview,
                    Self::InProgress | Self::NeedsChanges | Self::Completed | Self::Cancelled
                )
                | (
                    Self::NeedsChanges,
                    Self::InProgress | Self::Paused | Self::Completed | Self::Cancelled
                )
                | (Self::Paused, Self::InProgress | Self::Cancelled)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "needs_review" => Ok(Self::NeedsReview),
            "completed" => Ok(Self::Completed),
            "needs_changes" => Ok(Self::NeedsChanges),
            "paused" => Ok(Self::Paused),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task aggregate root.
///
/// The current owner is a projection over the delegation chain: it is
/// updated atomically with every appended delegation record and is `None`
/// only before the first delegation or after a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: TaskName,
    status: TaskStatus,
    current_owner: Option<Role>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task name.
    pub name: TaskName,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted current owner, if any.
    pub current_owner: Option<Role>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted completion timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task with no owner and `not_started` status.
    #[must_use]
    pub fn new(name: TaskName, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            name,
            status: TaskStatus::NotStarted,
            current_owner: None,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            status: data.status,
            current_owner: data.current_owner,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the role currently owning the task, if any.
    #[must_use]
    pub const fn current_owner(&self) -> Option<Role> {
        self.current_owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, if the task completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Validates that the task still accepts mutations.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] when the status is
    /// terminal.
    pub const fn ensure_active(&self) -> Result<(), WorkflowDomainError> {
        if self.status.is_terminal() {
            return Err(WorkflowDomainError::TaskTerminal {
                task_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Records a forward delegation: ownership moves to `to_role` and the
    /// task is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for terminal tasks and
    /// [`WorkflowDomainError::InvalidStatusChange`] when the status matrix
    /// forbids re-entering `in_progress`.
    pub fn record_delegation(
        &mut self,
        to_role: Role,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.set_status(TaskStatus::InProgress)?;
        self.current_owner = Some(to_role);
        self.touch(clock);
        Ok(())
    }

    /// Hands ownership back to the delegator after a successful completion.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for terminal tasks and
    /// [`WorkflowDomainError::InvalidStatusChange`] when the status matrix
    /// forbids re-entering `in_progress`.
    pub fn hand_back(
        &mut self,
        delegator: Role,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.set_status(TaskStatus::InProgress)?;
        self.current_owner = Some(delegator);
        self.touch(clock);
        Ok(())
    }

    /// Returns ownership after a rejection and marks the task for rework.
    ///
    /// When no delegator exists the rejecting role keeps ownership; only
    /// the status changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for terminal tasks and
    /// [`WorkflowDomainError::InvalidStatusChange`] when the status matrix
    /// forbids `needs_changes`.
    pub fn hand_back_rejected(
        &mut self,
        delegator: Option<Role>,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.set_status(TaskStatus::NeedsChanges)?;
        if let Some(role) = delegator {
            self.current_owner = Some(role);
        }
        self.touch(clock);
        Ok(())
    }

    /// Completes the task terminally: status `completed`, owner cleared,
    /// completion timestamp set.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for already-terminal
    /// tasks and [`WorkflowDomainError::InvalidStatusChange`] when the
    /// status matrix forbids completion.
    pub fn close_out(&mut self, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        self.set_status(TaskStatus::Completed)?;
        self.current_owner = None;
        self.completed_at = Some(clock.utc());
        self.touch(clock);
        Ok(())
    }

    /// Pauses the task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for terminal tasks and
    /// [`WorkflowDomainError::InvalidStatusChange`] when the current status
    /// cannot be paused.
    pub fn pause(&mut self, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        self.set_status(TaskStatus::Paused)?;
        self.touch(clock);
        Ok(())
    }

    /// Resumes a paused task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for terminal tasks and
    /// [`WorkflowDomainError::InvalidStatusChange`] when the current status
    /// is not `paused`.
    pub fn resume(&mut self, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        if self.status != TaskStatus::Paused {
            return Err(WorkflowDomainError::InvalidStatusChange {
                task_id: self.id,
                from: self.status,
                to: TaskStatus::InProgress,
            });
        }
        self.set_status(TaskStatus::InProgress)?;
        self.touch(clock);
        Ok(())
    }

    /// Cancels the task terminally and clears the owner.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::TaskTerminal`] for already-terminal
    /// tasks.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        self.set_status(TaskStatus::Cancelled)?;
        self.current_owner = None;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    /// Moves to `target` status through the transition matrix.
    ///
    /// A same-status move is accepted without consulting the matrix; the
    /// delegation operations re-enter `in_progress` repeatedly.
    fn set_status(&mut self, target: TaskStatus) -> Result<(), WorkflowDomainError> {
        self.ensure_active()?;
        if self.status == target {
            return Ok(());
        }
        if !self.status.can_transition_to(target) {
            return Err(WorkflowDomainError::InvalidStatusChange {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}
