//! Service layer for recording delegations and completions.
//!
//! The tracker validates each handoff against the role graph and the
//! task's replayed chain, then updates the ownership projection atomically
//! with the appended record. Callers must serialize mutations per task;
//! concurrent unserialized calls for one task identifier are a contract
//! violation, not a tolerated race.

use crate::workflow::{
    domain::{
        DelegationChain, DelegationRecord, Role, Task, TaskId, TaskName, WorkflowDomainError,
    },
    ports::{WorkflowRepository, WorkflowRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for recording a forward delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRequest {
    task_id: TaskId,
    from_role: Role,
    to_role: Role,
    message: Option<String>,
    force: bool,
}

impl DelegationRequest {
    /// Creates a delegation request with required fields.
    #[must_use]
    pub const fn new(task_id: TaskId, from_role: Role, to_role: Role) -> Self {
        Self {
            task_id,
            from_role,
            to_role,
            message: None,
            force: false,
        }
    }

    /// Attaches a free-text handoff message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Bypasses the ownership and transition-graph preconditions.
    ///
    /// The appended record still becomes part of the chain and must keep
    /// it replayable.
    #[must_use]
    pub const fn with_override(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Outcome reported by the current owner when settling its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The stage finished cleanly; ownership unwinds to the delegator.
    Completed,
    /// The work is rejected back to the delegator.
    Rejected {
        /// Reason recorded verbatim on the redelegation record.
        reason: String,
    },
}

/// Request payload for settling the current owner's stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    task_id: TaskId,
    role: Role,
    outcome: CompletionOutcome,
    notes: Option<String>,
}

impl CompletionRequest {
    /// Creates a clean-completion request.
    #[must_use]
    pub const fn completed(task_id: TaskId, role: Role) -> Self {
        Self {
            task_id,
            role,
            outcome: CompletionOutcome::Completed,
            notes: None,
        }
    }

    /// Creates a rejection request carrying the reason.
    #[must_use]
    pub fn rejected(task_id: TaskId, role: Role, reason: impl Into<String>) -> Self {
        Self {
            task_id,
            role,
            outcome: CompletionOutcome::Rejected {
                reason: reason.into(),
            },
            notes: None,
        }
    }

    /// Attaches free-text notes to the resulting record.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Result of one tracker mutation.
///
/// `record` is `None` when the mutation settled without appending — the
/// terminal close-out and the no-delegator rejection fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The task with its updated ownership projection.
    pub task: Task,
    /// The appended delegation record, if one was created.
    pub record: Option<DelegationRecord>,
}

/// Service-level errors for tracker operations.
#[derive(Debug, Error)]
pub enum WorkflowServiceError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),
}

/// Result type for tracker service operations.
pub type WorkflowServiceResult<T> = Result<T, WorkflowServiceError>;

/// Delegation chain tracker service.
#[derive(Clone)]
pub struct DelegationService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> DelegationService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new delegation tracker service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates and stores a new task with no owner.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError`] when the name is invalid or the
    /// repository rejects the store.
    pub async fn create_task(&self, name: impl Into<String>) -> WorkflowServiceResult<Task> {
        let name = TaskName::new(name)?;
        let task = Task::new(name, &*self.clock);
        self.repository.store_task(&task).await?;
        Ok(task)
    }

    /// Records a forward delegation and moves ownership to the receiver.
    ///
    /// The first delegation of a not-yet-started task accepts any
    /// `from_role` as the initiating role; afterwards `from_role` must be
    /// the current owner and the edge must be in the delegation graph,
    /// unless the request carries an override.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::TaskNotFound`] for unknown tasks,
    /// [`WorkflowDomainError::TaskTerminal`] for terminal tasks,
    /// [`WorkflowDomainError::OwnershipMismatch`] when `from_role` is not
    /// the owner, and [`WorkflowDomainError::InvalidTransition`] when the
    /// edge is not in the graph.
    pub async fn delegate(
        &self,
        request: DelegationRequest,
    ) -> WorkflowServiceResult<TransitionResult> {
        let DelegationRequest {
            task_id,
            from_role,
            to_role,
            message,
            force,
        } = request;

        let mut task = self.load_task(task_id).await?;
        task.ensure_active()?;
        if !force {
            if let Some(owner) = task.current_owner()
                && owner != from_role
            {
                return Err(WorkflowDomainError::OwnershipMismatch {
                    task_id: task.id(),
                    expected: Some(owner),
                    actual: from_role,
                }
                .into());
            }
            from_role.ensure_can_delegate_to(to_role)?;
        }

        let chain = self.load_chain(&task).await?;
        self.settle_receipt(&chain, from_role).await?;

        let mut record =
            DelegationRecord::handoff(task.id(), from_role, to_role, &*self.clock);
        if let Some(text) = message {
            record = record.with_message(text);
        }
        task.record_delegation(to_role, &*self.clock)?;

        self.repository.update_task(&task).await?;
        self.repository.append_record(&record).await?;

        Ok(TransitionResult {
            task,
            record: Some(record),
        })
    }

    /// Settles the current owner's stage and unwinds the chain.
    ///
    /// The delegator is the top of the task's delegation stack, popped in
    /// last-in-first-out order. With no outstanding delegator, a clean
    /// completion closes the task out terminally and a rejection leaves
    /// the owner in place with rework outstanding; neither appends a
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::TaskNotFound`] for unknown tasks,
    /// [`WorkflowDomainError::TaskTerminal`] for terminal tasks (repeated
    /// completion is refused, never ignored), and
    /// [`WorkflowDomainError::OwnershipMismatch`] when `role` is not the
    /// current owner.
    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> WorkflowServiceResult<TransitionResult> {
        let CompletionRequest {
            task_id,
            role,
            outcome,
            notes,
        } = request;

        let mut task = self.load_task(task_id).await?;
        task.ensure_active()?;
        if task.current_owner() != Some(role) {
            return Err(WorkflowDomainError::OwnershipMismatch {
                task_id: task.id(),
                expected: task.current_owner(),
                actual: role,
            }
            .into());
        }

        let chain = self.load_chain(&task).await?;
        self.settle_receipt(&chain, role).await?;

        let record = match (chain.current_delegator(), outcome) {
            (Some(delegator), CompletionOutcome::Completed) => {
                let mut entry =
                    DelegationRecord::completion(task.id(), role, delegator, &*self.clock);
                if let Some(text) = notes {
                    entry = entry.with_message(text);
                }
                task.hand_back(delegator, &*self.clock)?;
                Some(entry)
            }
            (Some(delegator), CompletionOutcome::Rejected { reason }) => {
                let mut entry = DelegationRecord::rejection(
                    task.id(),
                    role,
                    delegator,
                    reason,
                    &*self.clock,
                );
                if let Some(text) = notes {
                    entry = entry.with_message(text);
                }
                task.hand_back_rejected(Some(delegator), &*self.clock)?;
                Some(entry)
            }
            (None, CompletionOutcome::Completed) => {
                task.close_out(&*self.clock)?;
                None
            }
            (None, CompletionOutcome::Rejected { .. }) => {
                task.hand_back_rejected(None, &*self.clock)?;
                None
            }
        };

        self.repository.update_task(&task).await?;
        if let Some(entry) = &record {
            self.repository.append_record(entry).await?;
        }

        Ok(TransitionResult { task, record })
    }

    /// Pauses a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError`] when the task is unknown or the
    /// status matrix forbids pausing.
    pub async fn pause(&self, task_id: TaskId) -> WorkflowServiceResult<Task> {
        self.mutate(task_id, |task, clock| task.pause(clock)).await
    }

    /// Resumes a paused task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError`] when the task is unknown or not
    /// paused.
    pub async fn resume(&self, task_id: TaskId) -> WorkflowServiceResult<Task> {
        self.mutate(task_id, |task, clock| task.resume(clock)).await
    }

    /// Cancels a task terminally.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError`] when the task is unknown or
    /// already terminal.
    pub async fn cancel(&self, task_id: TaskId) -> WorkflowServiceResult<Task> {
        self.mutate(task_id, |task, clock| task.cancel(clock)).await
    }

    async fn mutate(
        &self,
        task_id: TaskId,
        operation: impl FnOnce(&mut Task, &C) -> Result<(), WorkflowDomainError> + Send,
    ) -> WorkflowServiceResult<Task> {
        let mut task = self.load_task(task_id).await?;
        operation(&mut task, self.clock.as_ref())?;
        self.repository.update_task(&task).await?;
        Ok(task)
    }

    async fn load_task(&self, task_id: TaskId) -> WorkflowServiceResult<Task> {
        self.repository
            .find_task(task_id)
            .await?
            .ok_or(WorkflowServiceError::TaskNotFound(task_id))
    }

    async fn load_chain(&self, task: &Task) -> WorkflowServiceResult<DelegationChain> {
        let records = self.repository.history_for_task(task.id()).await?;
        Ok(DelegationChain::replay(task.id(), records)?)
    }

    /// Stamps the settlement timestamp on the record that delivered
    /// ownership to the acting role, if it is still open.
    async fn settle_receipt(
        &self,
        chain: &DelegationChain,
        actor: Role,
    ) -> WorkflowServiceResult<()> {
        if let Some(receipt) = chain.latest_receipt()
            && receipt.to_role() == actor
            && receipt.completed_at().is_none()
        {
            self.repository
                .finalize_record(receipt.id(), self.clock.utc())
                .await?;
        }
        Ok(())
    }
}
