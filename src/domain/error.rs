use std::fmt;

use chrono::{DateTime, Utc};

use super::{Cents, MAX_AMOUNT, format_cents};

/// Reasons an input is refused before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyGroupName,
    EmptyMemberName,
    DuplicateMember(String),
    EmptyDescription,
    NonPositiveAmount(Cents),
    AmountTooLarge(Cents),
    UnknownPayer(String),
    UnknownMember(String),
    NegativeShare { member: String, share: Cents },
    SplitMismatch { amount: Cents, split_total: Cents },
    NoMembers,
    InvalidMonth(u32),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyGroupName => write!(f, "group name must not be empty"),
            ValidationError::EmptyMemberName => write!(f, "member name must not be empty"),
            ValidationError::DuplicateMember(name) => {
                write!(f, "member '{}' already exists", name)
            }
            ValidationError::EmptyDescription => write!(f, "description must not be empty"),
            ValidationError::NonPositiveAmount(amount) => {
                write!(f, "amount must be positive, got {}", format_cents(*amount))
            }
            ValidationError::AmountTooLarge(amount) => write!(
                f,
                "amount {} exceeds the limit of {}",
                format_cents(*amount),
                format_cents(MAX_AMOUNT)
            ),
            ValidationError::UnknownPayer(name) => {
                write!(f, "payer '{}' is not a member of this group", name)
            }
            ValidationError::UnknownMember(name) => {
                write!(f, "'{}' is not a member of this group", name)
            }
            ValidationError::NegativeShare { member, share } => write!(
                f,
                "share for '{}' must not be negative, got {}",
                member,
                format_cents(*share)
            ),
            ValidationError::SplitMismatch {
                amount,
                split_total,
            } => write!(
                f,
                "split total {} doesn't match amount {}",
                format_cents(*split_total),
                format_cents(*amount)
            ),
            ValidationError::NoMembers => write!(f, "group has no members to split between"),
            ValidationError::InvalidMonth(month) => {
                write!(f, "month must be between 1 and 12, got {}", month)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Recoverable failures of ledger operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    Validation(ValidationError),
    /// Same description, amount, payer and timestamp as a recorded expense.
    /// Second-granularity timestamps make this an approximate check.
    DuplicateEntry {
        description: String,
        amount: Cents,
        paid_by: String,
        timestamp: DateTime<Utc>,
    },
    EmptyHistory,
    /// Undo popped an entry that no longer exists in the expense list.
    HistoryOutOfSync { description: String },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Validation(err) => write!(f, "invalid input: {}", err),
            LedgerError::DuplicateEntry {
                description,
                amount,
                paid_by,
                timestamp,
            } => write!(
                f,
                "duplicate expense: '{}' of {} paid by {} at {}",
                description,
                format_cents(*amount),
                paid_by,
                timestamp.format("%Y-%m-%d %H:%M:%S")
            ),
            LedgerError::EmptyHistory => write!(f, "nothing to undo"),
            LedgerError::HistoryOutOfSync { description } => write!(
                f,
                "undo history is out of sync: expense '{}' is not in the ledger",
                description
            ),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Validation(err)
    }
}
