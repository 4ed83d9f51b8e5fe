//! Role-delegation workflow tracking.
//!
//! This module implements the task role-delegation state machine: the
//! fixed role registry and its delegation graph, the task aggregate with
//! its ownership projection, the append-only delegation log with its
//! explicit LIFO unwind stack, and the pure status projector. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
