//! Derived analytics value types.

use crate::workflow::domain::Role;
use chrono::Duration;

/// Tuning knobs for the analytics aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsConfig {
    top_paths: usize,
    bottleneck_multiplier: f64,
    bottleneck_top: usize,
}

impl AnalyticsConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top_paths: 10,
            bottleneck_multiplier: 1.5,
            bottleneck_top: 5,
        }
    }

    /// Sets the number of transition paths returned.
    #[must_use]
    pub const fn with_top_paths(mut self, top_paths: usize) -> Self {
        self.top_paths = top_paths;
        self
    }

    /// Sets the multiple of the global average hold time above which a
    /// role is flagged as a bottleneck.
    #[must_use]
    pub const fn with_bottleneck_multiplier(mut self, multiplier: f64) -> Self {
        self.bottleneck_multiplier = multiplier;
        self
    }

    /// Sets the number of bottleneck stages returned.
    #[must_use]
    pub const fn with_bottleneck_top(mut self, bottleneck_top: usize) -> Self {
        self.bottleneck_top = bottleneck_top;
        self
    }

    /// Returns the number of transition paths returned.
    #[must_use]
    pub const fn top_paths(&self) -> usize {
        self.top_paths
    }

    /// Returns the bottleneck threshold multiplier.
    #[must_use]
    pub const fn bottleneck_multiplier(&self) -> f64 {
        self.bottleneck_multiplier
    }

    /// Returns the number of bottleneck stages returned.
    #[must_use]
    pub const fn bottleneck_top(&self) -> usize {
        self.bottleneck_top
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-role statistics over a filtered set of delegation records.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleMetric {
    /// The role the statistics describe.
    pub role: Role,
    /// Distinct tasks that delegated work to the role.
    pub tasks_received: usize,
    /// Distinct tasks in which the role completed its stage cleanly.
    pub tasks_completed: usize,
    /// Mean time between receiving work and releasing it, when known.
    pub average_completion_time: Option<Duration>,
    /// Accepted share of received delegations, in `[0, 1]`.
    pub success_rate: f64,
    /// Success rate penalized by redelegations, in `[0, 100]` points.
    pub delegation_efficiency: f64,
    /// Share of all record receipts attributed to the role, in `[0, 1]`.
    pub workload_share: f64,
    /// Weighted composite of success, speed, and efficiency, in points.
    pub quality_score: f64,
}

impl RoleMetric {
    /// Creates an all-zero metric for a role with no recorded activity.
    #[must_use]
    pub const fn empty(role: Role) -> Self {
        Self {
            role,
            tasks_received: 0,
            tasks_completed: 0,
            average_completion_time: None,
            success_rate: 0.0,
            delegation_efficiency: 0.0,
            workload_share: 0.0,
            quality_score: 0.0,
        }
    }
}

/// Frequency of one `(from, to)` transition pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPath {
    /// The delegating role.
    pub from_role: Role,
    /// The receiving role.
    pub to_role: Role,
    /// Occurrences within the aggregated records.
    pub count: usize,
}

/// Rejection cluster on one `(from, to)` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedelegationHotspot {
    /// The rejecting role.
    pub from_role: Role,
    /// The role the work reverted to.
    pub to_role: Role,
    /// Rejections recorded on this edge.
    pub count: usize,
    /// Distinct rejection reasons in first-seen order.
    pub reasons: Vec<String>,
}

/// A role whose average hold time exceeds the bottleneck threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottleneckStage {
    /// The flagged role.
    pub role: Role,
    /// Mean hold time across the role's settled receipts.
    pub average_hold: Duration,
    /// Threshold the average exceeded.
    pub threshold: Duration,
}

/// Cross-task delegation analytics.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegationAnalytics {
    /// Most frequent transition pairs, descending.
    pub common_paths: Vec<TransitionPath>,
    /// Rejection clusters, descending by count.
    pub hotspots: Vec<RedelegationHotspot>,
    /// Slowest stages above the threshold, descending.
    pub bottlenecks: Vec<BottleneckStage>,
    /// Tasks excluded because their stored history failed replay.
    pub excluded_tasks: usize,
}

/// Per-role metrics together with the malformed-history exclusion count.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleMetricsReport {
    /// One metric per registry role, in pipeline order.
    pub metrics: Vec<RoleMetric>,
    /// Tasks excluded because their stored history failed replay.
    pub excluded_tasks: usize,
}
