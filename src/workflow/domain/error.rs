//! Error types for workflow domain validation and parsing.

use super::{Role, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while validating workflow domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The requested role edge is not in the delegation graph.
    #[error("illegal delegation from {from} to {to}")]
    InvalidTransition {
        /// The delegating role.
        from: Role,
        /// The requested receiving role.
        to: Role,
    },

    /// The task reached a terminal status and accepts no further mutation.
    #[error("task {task_id} is terminal ({status}) and accepts no further transitions")]
    TaskTerminal {
        /// The task identifier.
        task_id: TaskId,
        /// The terminal status the task holds.
        status: TaskStatus,
    },

    /// The acting role is not the task's current owner.
    #[error("role {actual} does not own task {task_id} (current owner: {expected:?})")]
    OwnershipMismatch {
        /// The task identifier.
        task_id: TaskId,
        /// The owner on record, if any.
        expected: Option<Role>,
        /// The role that attempted the operation.
        actual: Role,
    },

    /// The requested status change is not in the task status matrix.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStatusChange {
        /// The task identifier.
        task_id: TaskId,
        /// The status on record.
        from: TaskStatus,
        /// The requested status.
        to: TaskStatus,
    },

    /// Replaying a stored delegation chain detected an invariant violation.
    #[error("malformed delegation history for task {task_id}: {detail}")]
    MalformedHistory {
        /// The task identifier.
        task_id: TaskId,
        /// Description of the violated invariant.
        detail: String,
    },

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,
}

/// Error returned while parsing roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing delegation outcomes from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown delegation outcome: {0}")]
pub struct ParseOutcomeError(pub String);
