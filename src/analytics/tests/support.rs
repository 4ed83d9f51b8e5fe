//! Shared helpers for analytics unit tests.

use crate::workflow::domain::{
    DelegationId, DelegationOutcome, DelegationRecord, PersistedDelegationData, Role, TaskId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Fixed reference timestamp for deterministic tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Builds a stored-form delegation record with explicit timestamps.
pub fn stored_record(
    task_id: TaskId,
    from_role: Role,
    to_role: Role,
    outcome: DelegationOutcome,
    delegated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    rejection_reason: Option<&str>,
) -> DelegationRecord {
    DelegationRecord::from_persisted(PersistedDelegationData {
        id: DelegationId::new(),
        task_id,
        from_role,
        to_role,
        delegated_at,
        completed_at,
        outcome,
        rejection_reason: rejection_reason.map(str::to_owned),
        message: None,
    })
}

/// Builds a settled receipt held for the given number of hours.
pub fn settled_receipt(
    task_id: TaskId,
    from_role: Role,
    to_role: Role,
    offset_minutes: i64,
    held_hours: i64,
) -> DelegationRecord {
    let delegated_at = base_time() + Duration::minutes(offset_minutes);
    stored_record(
        task_id,
        from_role,
        to_role,
        DelegationOutcome::Pending,
        delegated_at,
        Some(delegated_at + Duration::hours(held_hours)),
        None,
    )
}
