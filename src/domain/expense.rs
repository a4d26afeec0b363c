use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, ValidationError};

pub type ExpenseId = Uuid;

/// Member name -> share of the expense in cents.
pub type Split = BTreeMap<String, Cents>;

/// A group member, identified only by a case-sensitive, non-empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyMemberName);
        }
        Ok(Self { name })
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How the cost of a new expense is apportioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Equal shares across every current member, rounding leftovers onto the
    /// last members in group order.
    Equal,
    /// Caller-provided shares. Members left out owe nothing.
    Custom(Split),
}

/// One recorded expense. Immutable once created; corrections go through undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    /// Amount in cents (always positive)
    pub amount: Cents,
    pub paid_by: String,
    pub split: Split,
    /// Creation time, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
}

impl Expense {
    /// Build an expense without validation. Use `Group::build_expense` to get
    /// a checked one.
    pub fn new(
        description: impl Into<String>,
        amount: Cents,
        paid_by: impl Into<String>,
        split: Split,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            paid_by: paid_by.into(),
            split,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    /// Share owed by `member`, zero when they are not part of the split.
    pub fn share_of(&self, member: &str) -> Cents {
        self.split.get(member).copied().unwrap_or(0)
    }

    /// Sum of all shares. Saturates instead of overflowing on unchecked input.
    pub fn split_total(&self) -> Cents {
        self.split
            .values()
            .fold(0, |total: Cents, share| total.saturating_add(*share))
    }

    /// The content-based identity used for duplicate detection.
    pub fn same_entry_as(&self, other: &Expense) -> bool {
        self.description == other.description
            && self.amount == other.amount
            && self.paid_by == other.paid_by
            && self.timestamp == other.timestamp
    }
}
