use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{
    Cents, Expense, ExpenseBreakdown, Group, Member, MemberBalance, MemberSummary,
    MonthlySummary, SettlementPlan, SplitMode, format_cents,
};
use crate::storage::Repository;

use super::AppError;

/// Input for recording a new expense.
pub struct NewExpense {
    pub description: String,
    pub amount: Cents,
    pub paid_by: String,
    pub split: SplitMode,
    pub timestamp: DateTime<Utc>,
}

/// One open group. Mutations are applied in memory, then persisted; when
/// storage fails the in-memory change is taken back before the error returns.
pub struct GroupSession<'a> {
    repo: &'a Repository,
    group: Group,
}

impl<'a> GroupSession<'a> {
    pub(crate) fn new(repo: &'a Repository, group: Group) -> Self {
        Self { repo, group }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn name(&self) -> &str {
        self.group.name()
    }

    // ========================
    // Mutations
    // ========================

    /// Add a member to the group.
    pub async fn add_member(&mut self, name: &str) -> Result<Member, AppError> {
        let member = self.group.add_member(name)?.clone();

        if let Err(err) = self.repo.add_member(self.group.name(), &member.name).await {
            self.group.rollback_member(&member.name);
            warn!(group = self.group.name(), member = %member.name, "member rolled back");
            return Err(AppError::Persistence(err));
        }

        info!(group = self.group.name(), member = %member.name, "member added");
        Ok(member)
    }

    /// Validate, record and persist a new expense.
    pub async fn add_expense(&mut self, new: NewExpense) -> Result<Expense, AppError> {
        let expense = self.group.build_expense(
            &new.description,
            new.amount,
            &new.paid_by,
            new.split,
            new.timestamp,
        )?;
        self.record_expense(expense).await
    }

    /// Record an already built expense. It is validated again against the group.
    pub async fn record_expense(&mut self, expense: Expense) -> Result<Expense, AppError> {
        let recorded = self.group.add_expense(expense)?.clone();

        if let Err(err) = self.repo.save_expense(self.group.name(), &recorded).await {
            self.group.rollback_add(recorded.id);
            warn!(
                group = self.group.name(),
                expense = %recorded.description,
                "expense rolled back after storage failure"
            );
            return Err(AppError::Persistence(err));
        }

        info!(
            group = self.group.name(),
            expense = %recorded.description,
            amount = %format_cents(recorded.amount),
            paid_by = %recorded.paid_by,
            "expense recorded"
        );
        Ok(recorded)
    }

    /// Remove the most recently added expense and return it.
    pub async fn undo(&mut self) -> Result<Expense, AppError> {
        let undone = self.group.undo()?;

        if let Err(err) = self
            .repo
            .delete_expense(self.group.name(), &undone.expense)
            .await
        {
            warn!(
                group = self.group.name(),
                expense = %undone.expense.description,
                "undo rolled back after storage failure"
            );
            self.group.rollback_undo(undone);
            return Err(AppError::Persistence(err));
        }

        info!(
            group = self.group.name(),
            expense = %undone.expense.description,
            amount = %format_cents(undone.expense.amount),
            "expense undone"
        );
        Ok(undone.expense)
    }

    // ========================
    // Views
    // ========================

    pub fn balances(&self) -> Vec<MemberBalance> {
        self.group.balances()
    }

    /// Propose settle-up payments. Leftover residue is logged, not fatal.
    pub fn settle_up(&self) -> SettlementPlan {
        let plan = self.group.settle_up();
        for leftover in &plan.residue {
            warn!(
                group = self.group.name(),
                member = %leftover.member,
                balance = %format_cents(leftover.balance),
                "unsettled residue"
            );
        }
        plan
    }

    pub fn history(&self) -> &[Expense] {
        self.group.expenses()
    }

    pub fn monthly_summary(&self, month: u32, year: i32) -> Result<MonthlySummary, AppError> {
        Ok(self.group.monthly_summary(month, year)?)
    }

    pub fn member_summary(&self, member: &str) -> Result<MemberSummary, AppError> {
        Ok(self.group.member_summary(member)?)
    }

    pub fn expense_breakdown(&self) -> Vec<ExpenseBreakdown> {
        self.group.expense_breakdown()
    }
}
