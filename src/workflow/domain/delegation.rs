//! Delegation log entries: the immutable record of every role-to-role
//! handoff, completion, and rejection.

use super::{DelegationId, ParseOutcomeError, Role, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state outcome carried by a delegation record.
///
/// Records are created already carrying their ultimate outcome: forward
/// handoffs stay `pending`, chain unwinds are `accepted`, redelegations
/// are `rejected`. The outcome is never rewritten after the append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationOutcome {
    /// Forward handoff; the receiving role has not settled it yet.
    Pending,
    /// The receiving role completed cleanly and returned ownership.
    Accepted,
    /// The receiving role rejected the work back up the chain.
    Rejected,
}

impl DelegationOutcome {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether this outcome denotes a redelegation.
    #[must_use]
    pub const fn is_rejection(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

impl fmt::Display for DelegationOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DelegationOutcome {
    type Error = ParseOutcomeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseOutcomeError(value.to_owned())),
        }
    }
}

/// Immutable log entry for one ownership transfer.
///
/// The only post-construction write is [`DelegationRecord::finalize`],
/// which stamps `completed_at` once the receiving role itself hands off or
/// completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRecord {
    id: DelegationId,
    task_id: TaskId,
    from_role: Role,
    to_role: Role,
    delegated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    outcome: DelegationOutcome,
    rejection_reason: Option<String>,
    message: Option<String>,
}

/// Parameter object for reconstructing a persisted delegation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDelegationData {
    /// Persisted record identifier.
    pub id: DelegationId,
    /// Persisted task identifier.
    pub task_id: TaskId,
    /// Persisted delegating role.
    pub from_role: Role,
    /// Persisted receiving role.
    pub to_role: Role,
    /// Persisted transfer timestamp.
    pub delegated_at: DateTime<Utc>,
    /// Persisted settlement timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted outcome.
    pub outcome: DelegationOutcome,
    /// Persisted rejection reason, if any.
    pub rejection_reason: Option<String>,
    /// Persisted free-text handoff message, if any.
    pub message: Option<String>,
}

impl DelegationRecord {
    /// Creates a forward handoff record with a `pending` outcome.
    #[must_use]
    pub fn handoff(
        task_id: TaskId,
        from_role: Role,
        to_role: Role,
        clock: &impl Clock,
    ) -> Self {
        Self::build(task_id, from_role, to_role, DelegationOutcome::Pending, None, clock)
    }

    /// Creates a chain-unwind record for a clean completion.
    #[must_use]
    pub fn completion(
        task_id: TaskId,
        from_role: Role,
        to_role: Role,
        clock: &impl Clock,
    ) -> Self {
        Self::build(task_id, from_role, to_role, DelegationOutcome::Accepted, None, clock)
    }

    /// Creates a redelegation record carrying the rejection reason.
    #[must_use]
    pub fn rejection(
        task_id: TaskId,
        from_role: Role,
        to_role: Role,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self::build(
            task_id,
            from_role,
            to_role,
            DelegationOutcome::Rejected,
            Some(reason.into()),
            clock,
        )
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedDelegationData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            from_role: data.from_role,
            to_role: data.to_role,
            delegated_at: data.delegated_at,
            completed_at: data.completed_at,
            outcome: data.outcome,
            rejection_reason: data.rejection_reason,
            message: data.message,
        }
    }

    /// Attaches a free-text handoff message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> DelegationId {
        self.id
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the delegating role.
    #[must_use]
    pub const fn from_role(&self) -> Role {
        self.from_role
    }

    /// Returns the receiving role.
    #[must_use]
    pub const fn to_role(&self) -> Role {
        self.to_role
    }

    /// Returns the transfer timestamp.
    #[must_use]
    pub const fn delegated_at(&self) -> DateTime<Utc> {
        self.delegated_at
    }

    /// Returns the settlement timestamp, if stamped.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the record outcome.
    #[must_use]
    pub const fn outcome(&self) -> DelegationOutcome {
        self.outcome
    }

    /// Returns the rejection reason, if the record is a redelegation.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Returns the free-text handoff message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Stamps the settlement timestamp once the receiving role acts.
    ///
    /// A record that is already stamped keeps its original timestamp; the
    /// receiving role may regain and release ownership several times across
    /// redelegation cycles.
    pub fn finalize(&mut self, completed_at: DateTime<Utc>) {
        if self.completed_at.is_none() {
            self.completed_at = Some(completed_at);
        }
    }

    fn build(
        task_id: TaskId,
        from_role: Role,
        to_role: Role,
        outcome: DelegationOutcome,
        rejection_reason: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: DelegationId::new(),
            task_id,
            from_role,
            to_role,
            delegated_at: clock.utc(),
            completed_at: None,
            outcome,
            rejection_reason,
            message: None,
        }
    }
}
