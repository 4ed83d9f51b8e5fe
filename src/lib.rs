//! Baton: task role-delegation tracking and workflow analytics.
//!
//! This crate provides the core state machine for tracking work items as
//! they move through a fixed sequence of specialist roles, recording every
//! handoff, and deriving operational analytics from the delegation
//! history.
//!
//! # Architecture
//!
//! Baton follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the persistent-store
//!   collaborator
//! - **Adapters**: Concrete implementations of ports (in-memory)
//!
//! # Modules
//!
//! - [`workflow`]: Role registry, delegation chain tracking, and status
//!   projection
//! - [`analytics`]: Cross-task delegation metrics and bottleneck detection

pub mod analytics;
pub mod workflow;
