//! Domain model for role-delegation workflow tracking.
//!
//! The workflow domain models the fixed role registry and its delegation
//! graph, the task aggregate with its status state machine, the immutable
//! delegation log, the replayed delegation chain with its explicit LIFO
//! stack, and the pure status projection — all free of infrastructure
//! concerns.

mod chain;
mod delegation;
mod error;
mod filter;
mod ids;
mod role;
mod task;
mod view;

pub use chain::{ChainFrame, DelegationChain};
pub use delegation::{DelegationOutcome, DelegationRecord, PersistedDelegationData};
pub use error::{
    ParseOutcomeError, ParseRoleError, ParseTaskStatusError, WorkflowDomainError,
};
pub use filter::HistoryFilter;
pub use ids::{DelegationId, TaskId, TaskName};
pub use role::{Role, RoleProfile, RoutingContext};
pub use task::{PersistedTaskData, Task, TaskStatus};
pub use view::{
    Blocker, BlockerKind, BlockerPolicy, BlockerSeverity, UnitProgress, WorkflowTransitionView,
    project,
};
