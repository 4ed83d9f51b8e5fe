//! Shared helpers for workflow unit tests.

use crate::workflow::domain::{
    DelegationId, DelegationOutcome, DelegationRecord, PersistedDelegationData, Role, TaskId,
};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Deterministic clock advancing one second per reading.
#[derive(Debug)]
pub struct TickClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            base: base_time(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for TickClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::seconds(tick)
    }
}

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
