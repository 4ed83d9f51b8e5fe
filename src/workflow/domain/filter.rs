//! Criteria structure for selecting delegation records.

use super::{DelegationRecord, Role, TaskId};
use chrono::{DateTime, Utc};

/// Plain criteria for delegation-history queries.
///
/// The default filter matches every record. Date bounds are inclusive and
/// apply to `delegated_at`; the role criterion matches either endpoint of
/// a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    role: Option<Role>,
    task_id: Option<TaskId>,
}

impl HistoryFilter {
    /// Creates a filter matching every record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start_date: None,
            end_date: None,
            role: None,
            task_id: None,
        }
    }

    /// Restricts matches to records delegated at or after `start`.
    #[must_use]
    pub const fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Restricts matches to records delegated at or before `end`.
    #[must_use]
    pub const fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Restricts matches to records touching `role` at either endpoint.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Restricts matches to records of one task.
    #[must_use]
    pub const fn with_task_id(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Returns the inclusive lower date bound, if set.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Returns the inclusive upper date bound, if set.
    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Returns the role criterion, if set.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns the task criterion, if set.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns whether the record satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &DelegationRecord) -> bool {
        if let Some(start) = self.start_date
            && record.delegated_at() < start
        {
            return false;
        }
        if let Some(end) = self.end_date
            && record.delegated_at() > end
        {
            return false;
        }
        if let Some(role) = self.role
            && record.from_role() != role
            && record.to_role() != role
        {
            return false;
        }
        if let Some(task_id) = self.task_id
            && record.task_id() != task_id
        {
            return false;
        }
        true
    }
}
