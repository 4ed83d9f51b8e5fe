//! Service layer for cross-task delegation analytics.
//!
//! The aggregator fetches filtered records through the repository port,
//! re-validates each involved task's full chain, and feeds only replayable
//! histories to the pure aggregation functions. A malformed history never
//! aborts the aggregation; the task is excluded and counted.

use crate::analytics::domain::{
    AnalyticsConfig, DelegationAnalytics, RoleMetricsReport, bottlenecks, common_paths,
    redelegation_hotspots, role_metrics,
};
use crate::workflow::{
    domain::{DelegationChain, DelegationRecord, HistoryFilter, TaskId},
    ports::{WorkflowRepository, WorkflowRepositoryError},
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),
}

/// Result type for analytics service operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Delegation analytics aggregator service.
#[derive(Clone)]
pub struct AnalyticsService<R>
where
    R: WorkflowRepository,
{
    repository: Arc<R>,
    config: AnalyticsConfig,
}

impl<R> AnalyticsService<R>
where
    R: WorkflowRepository,
{
    /// Creates an aggregator with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            config: AnalyticsConfig::default(),
        }
    }

    /// Replaces the aggregator configuration.
    #[must_use]
    pub fn with_config(mut self, config: AnalyticsConfig) -> Self {
        self.config = config;
        self
    }

    /// Computes per-role metrics over the records matching the filter.
    ///
    /// An empty match yields all-zero metrics for every registry role.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Repository`] when record retrieval fails.
    pub async fn role_metrics(
        &self,
        filter: &HistoryFilter,
    ) -> AnalyticsResult<RoleMetricsReport> {
        let (records, excluded_tasks) = self.validated_records(filter).await?;
        Ok(RoleMetricsReport {
            metrics: role_metrics(&records),
            excluded_tasks,
        })
    }

    /// Computes transition paths, redelegation hotspots, and bottleneck
    /// stages over the records matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Repository`] when record retrieval fails.
    pub async fn delegation_analytics(
        &self,
        filter: &HistoryFilter,
    ) -> AnalyticsResult<DelegationAnalytics> {
        let (records, excluded_tasks) = self.validated_records(filter).await?;
        Ok(DelegationAnalytics {
            common_paths: common_paths(&records, self.config.top_paths()),
            hotspots: redelegation_hotspots(&records),
            bottlenecks: bottlenecks(&records, &self.config),
            excluded_tasks,
        })
    }

    /// Fetches matching records and drops those belonging to tasks whose
    /// full stored history fails replay.
    ///
    /// Validation always runs against the complete per-task history, so a
    /// narrow filter cannot make an intact chain look malformed.
    async fn validated_records(
        &self,
        filter: &HistoryFilter,
    ) -> AnalyticsResult<(Vec<DelegationRecord>, usize)> {
        let matched = self.repository.history_matching(filter).await?;

        let mut involved: Vec<TaskId> = Vec::new();
        for record in &matched {
            if !involved.contains(&record.task_id()) {
                involved.push(record.task_id());
            }
        }

        let mut valid: HashSet<TaskId> = HashSet::new();
        let mut excluded_tasks = 0_usize;
        for task_id in involved {
            let history = self.repository.history_for_task(task_id).await?;
            if DelegationChain::replay(task_id, history).is_ok() {
                valid.insert(task_id);
            } else {
                excluded_tasks += 1;
            }
        }

        let records = matched
            .into_iter()
            .filter(|record| valid.contains(&record.task_id()))
            .collect();
        Ok((records, excluded_tasks))
    }
}
