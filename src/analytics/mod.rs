//! Delegation analytics.
//!
//! This module derives operational statistics from delegation histories:
//! per-role efficiency and quality metrics, common transition paths,
//! redelegation hotspots, and bottleneck stages. Aggregation is pure over
//! already-committed record collections; the service layer only resolves
//! records through the workflow repository port.
//!
//! - Domain types and pure aggregation in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
