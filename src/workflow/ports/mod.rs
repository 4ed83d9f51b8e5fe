//! Port contracts for the workflow module.

pub mod repository;

pub use repository::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult};
