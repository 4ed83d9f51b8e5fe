//! In-memory workflow repository for tests and embedders without durable
//! storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{DelegationId, DelegationRecord, HistoryFilter, Task, TaskId},
    ports::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};

/// Thread-safe in-memory workflow repository.
///
/// All writes happen under one lock, which satisfies the port's
/// task-update-plus-record-append atomicity contract for serialized
/// callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRepository {
    state: Arc<RwLock<InMemoryWorkflowState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkflowState {
    tasks: HashMap<TaskId, Task>,
    records: Vec<DelegationRecord>,
}

impl InMemoryWorkflowRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> WorkflowRepositoryError {
    WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn ordered(mut records: Vec<DelegationRecord>) -> Vec<DelegationRecord> {
    records.sort_by_key(DelegationRecord::delegated_at);
    records
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn store_task(&self, task: &Task) -> WorkflowRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(WorkflowRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> WorkflowRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(WorkflowRepositoryError::TaskNotFound(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> WorkflowRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn append_record(&self, record: &DelegationRecord) -> WorkflowRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.records.iter().any(|stored| stored.id() == record.id()) {
            return Err(WorkflowRepositoryError::DuplicateRecord(record.id()));
        }
        state.records.push(record.clone());
        Ok(())
    }

    async fn finalize_record(
        &self,
        id: DelegationId,
        completed_at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let record = state
            .records
            .iter_mut()
            .find(|stored| stored.id() == id)
            .ok_or(WorkflowRepositoryError::RecordNotFound(id))?;
        record.finalize(completed_at);
        Ok(())
    }

    async fn history_for_task(
        &self,
        task_id: TaskId,
    ) -> WorkflowRepositoryResult<Vec<DelegationRecord>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let records = state
            .records
            .iter()
            .filter(|record| record.task_id() == task_id)
            .cloned()
            .collect();
        Ok(ordered(records))
    }

    async fn history_matching(
        &self,
        filter: &HistoryFilter,
    ) -> WorkflowRepositoryResult<Vec<DelegationRecord>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let records = state
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        Ok(ordered(records))
    }
}
