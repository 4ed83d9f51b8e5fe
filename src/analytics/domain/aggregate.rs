//! Pure aggregation functions over delegation records.
//!
//! Every function here is a pure function of its input collection; the
//! aggregator service is responsible for fetching and chain-validating the
//! records it feeds in.

use super::{
    AnalyticsConfig, BottleneckStage, RedelegationHotspot, RoleMetric, TransitionPath,
};
use crate::workflow::domain::{DelegationOutcome, DelegationRecord, Role, TaskId};
use chrono::Duration;
use std::collections::{HashMap, HashSet};

const MILLISECONDS_PER_HOUR: f64 = 3_600_000.0;

/// Computes per-role statistics, one metric per registry role in pipeline
/// order. Roles without recorded activity yield all-zero metrics.
#[must_use]
pub fn role_metrics(records: &[DelegationRecord]) -> Vec<RoleMetric> {
    Role::PIPELINE
        .iter()
        .map(|&role| metric_for_role(role, records))
        .collect()
}

fn metric_for_role(role: Role, records: &[DelegationRecord]) -> RoleMetric {
    let received: Vec<&DelegationRecord> = records
        .iter()
        .filter(|record| record.to_role() == role)
        .collect();
    if received.is_empty() {
        return RoleMetric::empty(role);
    }

    let accepted = received
        .iter()
        .filter(|record| record.outcome() == DelegationOutcome::Accepted)
        .count();
    let rejected = received
        .iter()
        .filter(|record| record.outcome().is_rejection())
        .count();
    let success_rate = fraction(accepted, received.len());
    let redelegation_rate = fraction(rejected, received.len());
    let efficiency = delegation_efficiency(success_rate, redelegation_rate);

    let tasks_received: HashSet<TaskId> =
        received.iter().map(|record| record.task_id()).collect();
    let tasks_completed: HashSet<TaskId> = records
        .iter()
        .filter(|record| {
            record.from_role() == role && record.outcome() == DelegationOutcome::Accepted
        })
        .map(DelegationRecord::task_id)
        .collect();

    let holds = settled_holds(received.iter().copied());
    let average = mean_duration(&holds);
    let speed = average.map_or(0.0, |hold| speed_score(hours(hold)));

    RoleMetric {
        role,
        tasks_received: tasks_received.len(),
        tasks_completed: tasks_completed.len(),
        average_completion_time: average,
        success_rate,
        delegation_efficiency: efficiency,
        workload_share: fraction(received.len(), records.len()),
        quality_score: quality_score(success_rate, speed, efficiency),
    }
}

/// Computes the most frequent `(from, to)` transition pairs.
///
/// Sorted by count descending; ties keep first-seen order. At most `top`
/// paths are returned.
#[must_use]
pub fn common_paths(records: &[DelegationRecord], top: usize) -> Vec<TransitionPath> {
    let mut order: Vec<(Role, Role)> = Vec::new();
    let mut counts: HashMap<(Role, Role), usize> = HashMap::new();
    for record in records {
        let key = (record.from_role(), record.to_role());
        if !counts.contains_key(&key) {
            order.push(key);
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut paths: Vec<TransitionPath> = order
        .into_iter()
        .map(|(from_role, to_role)| TransitionPath {
            from_role,
            to_role,
            count: counts.get(&(from_role, to_role)).copied().unwrap_or(0),
        })
        .collect();
    paths.sort_by(|left, right| right.count.cmp(&left.count));
    paths.truncate(top);
    paths
}

/// Groups rejections by `(from, to)` edge with deduplicated reasons.
///
/// Sorted by count descending; ties keep first-seen order. Reasons keep
/// insertion order.
#[must_use]
pub fn redelegation_hotspots(records: &[DelegationRecord]) -> Vec<RedelegationHotspot> {
    let mut order: Vec<(Role, Role)> = Vec::new();
    let mut clusters: HashMap<(Role, Role), (usize, Vec<String>)> = HashMap::new();
    for record in records.iter().filter(|r| r.outcome().is_rejection()) {
        let key = (record.from_role(), record.to_role());
        if !clusters.contains_key(&key) {
            order.push(key);
        }
        let (count, reasons) = clusters.entry(key).or_default();
        *count += 1;
        if let Some(reason) = record.rejection_reason()
            && !reasons.iter().any(|seen| seen == reason)
        {
            reasons.push(reason.to_owned());
        }
    }

    let mut hotspots: Vec<RedelegationHotspot> = order
        .into_iter()
        .filter_map(|(from_role, to_role)| {
            clusters
                .get(&(from_role, to_role))
                .map(|(count, reasons)| RedelegationHotspot {
                    from_role,
                    to_role,
                    count: *count,
                    reasons: reasons.clone(),
                })
        })
        .collect();
    hotspots.sort_by(|left, right| right.count.cmp(&left.count));
    hotspots
}

/// Flags roles whose mean hold time exceeds the global mean scaled by the
/// configured multiplier.
///
/// Sorted by average hold descending; at most `bottleneck_top` stages are
/// returned. Without settled receipts the result is empty.
#[must_use]
pub fn bottlenecks(records: &[DelegationRecord], config: &AnalyticsConfig) -> Vec<BottleneckStage> {
    let all_holds = settled_holds(records.iter());
    let Some(global_mean) = mean_duration(&all_holds) else {
        return Vec::new();
    };
    let threshold = scale_duration(global_mean, config.bottleneck_multiplier());

    let mut flagged: Vec<BottleneckStage> = Role::PIPELINE
        .iter()
        .filter_map(|&role| {
            let holds = settled_holds(records.iter().filter(|r| r.to_role() == role));
            mean_duration(&holds)
                .filter(|average| *average > threshold)
                .map(|average_hold| BottleneckStage {
                    role,
                    average_hold,
                    threshold,
                })
        })
        .collect();
    flagged.sort_by(|left, right| right.average_hold.cmp(&left.average_hold));
    flagged.truncate(config.bottleneck_top());
    flagged
}

/// Success rate penalized by 20 points per unit of redelegation rate,
/// floored at zero. Rates are fractions in `[0, 1]`; the result is in
/// points.
#[must_use]
pub fn delegation_efficiency(success_rate: f64, redelegation_rate: f64) -> f64 {
    (success_rate * 100.0 - 20.0 * redelegation_rate).max(0.0)
}

/// Linear speed decay normalized to a 24-hour baseline, floored at zero.
#[must_use]
pub fn speed_score(average_completion_hours: f64) -> f64 {
    (100.0 - (average_completion_hours / 24.0) * 100.0).max(0.0)
}

/// Weighted composite of success, speed, and efficiency, all on the 0-100
/// point scale.
#[must_use]
pub fn quality_score(success_rate: f64, speed: f64, efficiency: f64) -> f64 {
    0.4 * (success_rate * 100.0) + 0.3 * speed + 0.3 * efficiency
}

fn settled_holds<'a>(records: impl Iterator<Item = &'a DelegationRecord>) -> Vec<Duration> {
    records
        .filter_map(|record| {
            record
                .completed_at()
                .map(|done| done - record.delegated_at())
        })
        .collect()
}

fn mean_duration(holds: &[Duration]) -> Option<Duration> {
    if holds.is_empty() {
        return None;
    }
    let total_ms: i64 = holds.iter().map(Duration::num_milliseconds).sum();
    let mean_ms = total_ms as f64 / holds.len() as f64;
    Some(Duration::milliseconds(mean_ms.round() as i64))
}

fn scale_duration(duration: Duration, factor: f64) -> Duration {
    let scaled_ms = duration.num_milliseconds() as f64 * factor;
    Duration::milliseconds(scaled_ms.round() as i64)
}

fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLISECONDS_PER_HOUR
}
