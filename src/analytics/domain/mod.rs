//! Domain model for delegation analytics.
//!
//! Holds the derived metric value types and the pure aggregation
//! functions that compute them from delegation record collections.

mod aggregate;
mod metrics;

pub use aggregate::{
    bottlenecks, common_paths, delegation_efficiency, quality_score, redelegation_hotspots,
    role_metrics, speed_score,
};
pub use metrics::{
    AnalyticsConfig, BottleneckStage, DelegationAnalytics, RedelegationHotspot, RoleMetric,
    RoleMetricsReport, TransitionPath,
};
