//! Replayed delegation chain with an explicit LIFO delegation stack.
//!
//! The stack replaces the source-of-truth question "who delegated to the
//! current owner?" with an explicit push/pop contract: forward handoffs
//! push the delegating role, completions and rejections pop it. Replay
//! validates the stored record ordering and linkage invariants while
//! rebuilding the stack.

use super::{DelegationOutcome, DelegationRecord, Role, TaskId, WorkflowDomainError};

/// One entry of the delegation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainFrame {
    role: Role,
    record_index: usize,
}

impl ChainFrame {
    /// Returns the role that delegated and awaits the unwind.
    #[must_use]
    pub const fn role(self) -> Role {
        self.role
    }

    /// Returns the index of the handoff record that opened this frame.
    #[must_use]
    pub const fn record_index(self) -> usize {
        self.record_index
    }
}

/// Validated, ordered view of one task's delegation records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationChain {
    task_id: TaskId,
    records: Vec<DelegationRecord>,
    stack: Vec<ChainFrame>,
}

impl DelegationChain {
    /// Replays stored records into a validated chain.
    ///
    /// Validated invariants:
    ///
    /// - every record belongs to `task_id`;
    /// - `delegated_at` is strictly increasing;
    /// - each record's `from_role` equals the `to_role` of its predecessor
    ///   (every record transfers ownership to its receiver);
    /// - `accepted`/`rejected` records unwind the top frame of the stack,
    ///   so a rejection always reverts to a role that delegated earlier in
    ///   the chain;
    /// - `rejected` records carry a rejection reason.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::MalformedHistory`] naming the violated
    /// invariant.
    pub fn replay(
        task_id: TaskId,
        records: Vec<DelegationRecord>,
    ) -> Result<Self, WorkflowDomainError> {
        let mut stack: Vec<ChainFrame> = Vec::new();
        let mut previous: Option<&DelegationRecord> = None;

        for (record_index, record) in records.iter().enumerate() {
            validate_membership(task_id, record)?;
            validate_ordering(task_id, previous, record)?;
            validate_linkage(task_id, previous, record)?;

            match record.outcome() {
                DelegationOutcome::Pending => {
                    stack.push(ChainFrame {
                        role: record.from_role(),
                        record_index,
                    });
                }
                DelegationOutcome::Accepted | DelegationOutcome::Rejected => {
                    unwind_frame(task_id, &mut stack, record)?;
                }
            }

            previous = Some(record);
        }

        Ok(Self {
            task_id,
            records,
            stack,
        })
    }

    /// Returns the task this chain belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the ordered delegation records.
    #[must_use]
    pub fn records(&self) -> &[DelegationRecord] {
        &self.records
    }

    /// Returns the number of records in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the chain holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the rebuilt delegation stack, oldest frame first.
    #[must_use]
    pub fn stack(&self) -> &[ChainFrame] {
        &self.stack
    }

    /// Returns the role the most recent record transferred ownership to.
    #[must_use]
    pub fn current_receiver(&self) -> Option<Role> {
        self.records.last().map(DelegationRecord::to_role)
    }

    /// Returns the role that delegated to the current owner, if any.
    ///
    /// This is the top of the stack: the last-in delegator is the first
    /// role ownership unwinds to.
    #[must_use]
    pub fn current_delegator(&self) -> Option<Role> {
        self.stack.last().map(|frame| frame.role)
    }

    /// Returns the most recent record, the one that delivered ownership to
    /// the current owner.
    #[must_use]
    pub fn latest_receipt(&self) -> Option<&DelegationRecord> {
        self.records.last()
    }
}

fn malformed(task_id: TaskId, detail: impl Into<String>) -> WorkflowDomainError {
    WorkflowDomainError::MalformedHistory {
        task_id,
        detail: detail.into(),
    }
}

fn validate_membership(
    task_id: TaskId,
    record: &DelegationRecord,
) -> Result<(), WorkflowDomainError> {
    if record.task_id() != task_id {
        return Err(malformed(
            task_id,
            format!("record {} belongs to task {}", record.id(), record.task_id()),
        ));
    }
    if record.outcome().is_rejection() && record.rejection_reason().is_none() {
        return Err(malformed(
            task_id,
            format!("rejected record {} carries no rejection reason", record.id()),
        ));
    }
    Ok(())
}

fn validate_ordering(
    task_id: TaskId,
    previous: Option<&DelegationRecord>,
    record: &DelegationRecord,
) -> Result<(), WorkflowDomainError> {
    let Some(prior) = previous else {
        return Ok(());
    };
    if record.delegated_at() <= prior.delegated_at() {
        return Err(malformed(
            task_id,
            format!(
                "record {} at {} does not advance past {}",
                record.id(),
                record.delegated_at(),
                prior.delegated_at()
            ),
        ));
    }
    Ok(())
}

fn validate_linkage(
    task_id: TaskId,
    previous: Option<&DelegationRecord>,
    record: &DelegationRecord,
) -> Result<(), WorkflowDomainError> {
    let Some(prior) = previous else {
        return Ok(());
    };
    if record.from_role() != prior.to_role() {
        return Err(malformed(
            task_id,
            format!(
                "record {} departs from {} but ownership was at {}",
                record.id(),
                record.from_role(),
                prior.to_role()
            ),
        ));
    }
    Ok(())
}

fn unwind_frame(
    task_id: TaskId,
    stack: &mut Vec<ChainFrame>,
    record: &DelegationRecord,
) -> Result<(), WorkflowDomainError> {
    let Some(frame) = stack.pop() else {
        return Err(malformed(
            task_id,
            format!(
                "record {} unwinds to {} but no delegation is outstanding",
                record.id(),
                record.to_role()
            ),
        ));
    };
    if frame.role != record.to_role() {
        return Err(malformed(
            task_id,
            format!(
                "record {} unwinds to {} but the outstanding delegator is {}",
                record.id(),
                record.to_role(),
                frame.role
            ),
        ));
    }
    Ok(())
}
