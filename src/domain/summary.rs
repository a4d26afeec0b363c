use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, Expense, Member, ValidationError};

/// What one member paid and owed over a set of expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTotals {
    pub member: String,
    pub paid: Cents,
    pub owed: Cents,
}

impl MemberTotals {
    /// Paid minus owed; positive means the member is owed money.
    pub fn net(&self) -> Cents {
        self.paid.saturating_sub(self.owed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub expense_count: usize,
    pub members: Vec<MemberTotals>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member: String,
    pub paid: Cents,
    pub owed: Cents,
    pub net: Cents,
}

/// One member's part in a single expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLine {
    pub member: String,
    pub share: Cents,
    pub is_payer: bool,
}

/// A single expense with every member's share spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub description: String,
    pub amount: Cents,
    pub paid_by: String,
    pub timestamp: DateTime<Utc>,
    pub shares: Vec<ShareLine>,
}

/// Paid and owed totals per member for expenses dated in `month`/`year`.
/// Months are UTC calendar months, matching the stored timestamps.
pub fn monthly_summary(
    members: &[Member],
    expenses: &[Expense],
    month: u32,
    year: i32,
) -> Result<MonthlySummary, ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(month));
    }

    let in_month: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.timestamp.month() == month && e.timestamp.year() == year)
        .collect();

    let members = members
        .iter()
        .map(|m| totals_for(&m.name, in_month.iter().copied()))
        .collect();

    Ok(MonthlySummary {
        month,
        year,
        expense_count: in_month.len(),
        members,
    })
}

/// Lifetime totals for one member across the full history.
pub fn member_summary(
    members: &[Member],
    expenses: &[Expense],
    member: &str,
) -> Result<MemberSummary, ValidationError> {
    if !members.iter().any(|m| m.name == member) {
        return Err(ValidationError::UnknownMember(member.to_string()));
    }

    let totals = totals_for(member, expenses.iter());
    Ok(MemberSummary {
        net: totals.net(),
        member: totals.member,
        paid: totals.paid,
        owed: totals.owed,
    })
}

/// Every expense in order, with each member's share (zero when not in the split).
pub fn expense_breakdown(members: &[Member], expenses: &[Expense]) -> Vec<ExpenseBreakdown> {
    expenses
        .iter()
        .map(|e| ExpenseBreakdown {
            description: e.description.clone(),
            amount: e.amount,
            paid_by: e.paid_by.clone(),
            timestamp: e.timestamp,
            shares: members
                .iter()
                .map(|m| ShareLine {
                    member: m.name.clone(),
                    share: e.share_of(&m.name),
                    is_payer: m.name == e.paid_by,
                })
                .collect(),
        })
        .collect()
}

fn totals_for<'a>(member: &str, expenses: impl Iterator<Item = &'a Expense>) -> MemberTotals {
    let (paid, owed) = expenses.fold((0, 0), |(paid, owed): (Cents, Cents), e| {
        let paid = if e.paid_by == member {
            paid.saturating_add(e.amount)
        } else {
            paid
        };
        (paid, owed.saturating_add(e.share_of(member)))
    });
    MemberTotals {
        member: member.to_string(),
        paid,
        owed,
    }
}
