//! In-memory adapter implementations for the workflow ports.

mod repository;

pub use repository::InMemoryWorkflowRepository;
