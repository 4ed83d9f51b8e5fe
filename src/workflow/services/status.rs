//! Service layer for projecting workflow status views.

use crate::workflow::{
    domain::{
        BlockerPolicy, DelegationChain, TaskId, UnitProgress, WorkflowTransitionView, project,
    },
    ports::WorkflowRepository,
    services::delegation::{WorkflowServiceError, WorkflowServiceResult},
};
use mockable::Clock;
use std::sync::Arc;

/// Workflow status projector service.
///
/// Projection itself is pure; this service only resolves the task and its
/// chain through the repository and supplies the clock reading.
#[derive(Clone)]
pub struct StatusService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: BlockerPolicy,
}

impl<R, C> StatusService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a status service with the default blocker policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            policy: BlockerPolicy::default(),
        }
    }

    /// Replaces the blocker policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: BlockerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Projects the current transition view for a task.
    ///
    /// The completion percentage is estimated from the current stage's
    /// pipeline position.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::TaskNotFound`] for unknown tasks and
    /// [`WorkflowServiceError::Domain`] when the stored chain is malformed.
    pub async fn status(&self, task_id: TaskId) -> WorkflowServiceResult<WorkflowTransitionView> {
        self.project_view(task_id, None).await
    }

    /// Projects the transition view using caller-supplied sub-unit counts
    /// for the completion percentage.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowServiceError::TaskNotFound`] for unknown tasks and
    /// [`WorkflowServiceError::Domain`] when the stored chain is malformed.
    pub async fn status_with_units(
        &self,
        task_id: TaskId,
        units: UnitProgress,
    ) -> WorkflowServiceResult<WorkflowTransitionView> {
        self.project_view(task_id, Some(units)).await
    }

    async fn project_view(
        &self,
        task_id: TaskId,
        units: Option<UnitProgress>,
    ) -> WorkflowServiceResult<WorkflowTransitionView> {
        let task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(WorkflowServiceError::TaskNotFound(task_id))?;
        let records = self.repository.history_for_task(task_id).await?;
        let chain = DelegationChain::replay(task_id, records)?;
        Ok(project(&task, &chain, units, &self.policy, self.clock.utc()))
    }
}
