//! Repository port for task and delegation-log persistence.

use crate::workflow::domain::{
    DelegationId, DelegationRecord, HistoryFilter, Task, TaskId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow repository operations.
pub type WorkflowRepositoryResult<T> = Result<T, WorkflowRepositoryError>;

/// Persistence contract for tasks and their delegation logs.
///
/// The task update and record append/finalize issued by one tracker
/// mutation are assumed atomic together; implementations must not expose
/// a task whose projection disagrees with its log.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateTask`] when the task
    /// identifier already exists.
    async fn store_task(&self, task: &Task) -> WorkflowRepositoryResult<()>;

    /// Persists changes to an existing task (owner, status, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn update_task(&self, task: &Task) -> WorkflowRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> WorkflowRepositoryResult<Option<Task>>;

    /// Appends a delegation record to its task's log.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateRecord`] when the record
    /// identifier already exists.
    async fn append_record(&self, record: &DelegationRecord) -> WorkflowRepositoryResult<()>;

    /// Stamps the settlement timestamp on a stored record.
    ///
    /// An already-stamped record keeps its original timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::RecordNotFound`] when the record
    /// does not exist.
    async fn finalize_record(
        &self,
        id: DelegationId,
        completed_at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()>;

    /// Returns one task's delegation records ordered by `delegated_at`.
    async fn history_for_task(
        &self,
        task_id: TaskId,
    ) -> WorkflowRepositoryResult<Vec<DelegationRecord>>;

    /// Returns all records matching the filter, ordered by `delegated_at`.
    async fn history_matching(
        &self,
        filter: &HistoryFilter,
    ) -> WorkflowRepositoryResult<Vec<DelegationRecord>>;
}

/// Errors returned by workflow repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A record with the same identifier already exists.
    #[error("duplicate delegation record: {0}")]
    DuplicateRecord(DelegationId),

    /// The delegation record was not found.
    #[error("delegation record not found: {0}")]
    RecordNotFound(DelegationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
