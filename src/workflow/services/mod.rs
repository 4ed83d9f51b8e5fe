//! Orchestration services for the workflow module.

pub mod delegation;
pub mod status;

pub use delegation::{
    CompletionOutcome, CompletionRequest, DelegationRequest, DelegationService, TransitionResult,
    WorkflowServiceError, WorkflowServiceResult,
};
pub use status::StatusService;
