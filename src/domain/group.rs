use chrono::{DateTime, Utc};

use super::{
    Cents, Expense, ExpenseBreakdown, ExpenseId, LedgerError, MAX_AMOUNT, Member, MemberBalance,
    MemberSummary, MonthlySummary, SettlementPlan, Split, SplitMode, ValidationError,
    compute_balances, expense_breakdown, member_summary, monthly_summary, plan_settlement,
    split_evenly,
};

/// An expense removed by `Group::undo`, with the position it held so a failed
/// storage delete can put it back exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undone {
    pub expense: Expense,
    pub position: usize,
}

/// A named group: its members, its expense ledger and the undo history.
///
/// `history` mirrors `expenses` in insertion order and only exists to support
/// undoing the most recent addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    members: Vec<Member>,
    expenses: Vec<Expense>,
    history: Vec<Expense>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyGroupName);
        }
        Ok(Self {
            name,
            members: Vec::new(),
            expenses: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Rebuild a group from stored members and expenses (both in insertion
    /// order). The undo history is rebuilt from the expenses.
    pub fn restore(
        name: impl Into<String>,
        members: Vec<Member>,
        expenses: Vec<Expense>,
    ) -> Result<Self, ValidationError> {
        let mut group = Self::new(name)?;
        for member in members {
            group.add_member(&member.name)?;
        }
        group.history = expenses.clone();
        group.expenses = expenses;
        Ok(group)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Full expense history in insertion order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn history(&self) -> &[Expense] {
        &self.history
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    // ========================
    // Membership
    // ========================

    pub fn add_member(&mut self, name: &str) -> Result<&Member, ValidationError> {
        let member = Member::new(name)?;
        if self.is_member(&member.name) {
            return Err(ValidationError::DuplicateMember(member.name));
        }
        self.members.push(member);
        Ok(&self.members[self.members.len() - 1])
    }

    /// Drop the most recently added member if it is `name` and no expense
    /// references it. Used to roll back a member whose storage write failed.
    pub fn rollback_member(&mut self, name: &str) -> bool {
        let referenced = self
            .expenses
            .iter()
            .any(|e| e.paid_by == name || e.split.contains_key(name));
        match self.members.last() {
            Some(last) if last.name == name && !referenced => {
                self.members.pop();
                true
            }
            _ => false,
        }
    }

    // ========================
    // Expenses
    // ========================

    /// Build a validated expense from raw input without recording it.
    pub fn build_expense(
        &self,
        description: &str,
        amount: Cents,
        paid_by: &str,
        mode: SplitMode,
        timestamp: DateTime<Utc>,
    ) -> Result<Expense, ValidationError> {
        let split = match mode {
            SplitMode::Equal => self.equal_split(amount)?,
            SplitMode::Custom(split) => split,
        };
        let expense = Expense::new(description.trim(), amount, paid_by, split, timestamp);
        self.validate(&expense)?;
        Ok(expense)
    }

    fn equal_split(&self, amount: Cents) -> Result<Split, ValidationError> {
        if self.members.is_empty() {
            return Err(ValidationError::NoMembers);
        }
        if amount <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        let shares = split_evenly(amount, self.members.len());
        Ok(self
            .members
            .iter()
            .map(|m| m.name.clone())
            .zip(shares)
            .collect())
    }

    /// Check an expense against this group: positive amount, known payer,
    /// known non-negative split members and a split total equal to the amount.
    pub fn validate(&self, expense: &Expense) -> Result<(), ValidationError> {
        if expense.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if expense.amount <= 0 {
            return Err(ValidationError::NonPositiveAmount(expense.amount));
        }
        if expense.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(expense.amount));
        }
        if !self.is_member(&expense.paid_by) {
            return Err(ValidationError::UnknownPayer(expense.paid_by.clone()));
        }
        for (member, share) in &expense.split {
            if !self.is_member(member) {
                return Err(ValidationError::UnknownMember(member.clone()));
            }
            if *share < 0 {
                return Err(ValidationError::NegativeShare {
                    member: member.clone(),
                    share: *share,
                });
            }
            if *share > MAX_AMOUNT {
                return Err(ValidationError::AmountTooLarge(*share));
            }
        }
        let split_total = expense.split_total();
        if split_total != expense.amount {
            return Err(ValidationError::SplitMismatch {
                amount: expense.amount,
                split_total,
            });
        }
        Ok(())
    }

    /// Record a new expense at the end of the ledger and the undo history.
    pub fn add_expense(&mut self, expense: Expense) -> Result<&Expense, LedgerError> {
        self.validate(&expense)?;
        if self.expenses.iter().any(|e| e.same_entry_as(&expense)) {
            return Err(LedgerError::DuplicateEntry {
                description: expense.description,
                amount: expense.amount,
                paid_by: expense.paid_by,
                timestamp: expense.timestamp,
            });
        }
        self.history.push(expense.clone());
        self.expenses.push(expense);
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    /// Take back the last `add_expense` whose storage write failed.
    pub fn rollback_add(&mut self, id: ExpenseId) -> Option<Expense> {
        match (self.history.last(), self.expenses.last()) {
            (Some(h), Some(e)) if h.id == id && e.id == id => {
                self.history.pop();
                self.expenses.pop()
            }
            _ => None,
        }
    }

    /// Remove the most recently added expense.
    pub fn undo(&mut self) -> Result<Undone, LedgerError> {
        let last = self.history.pop().ok_or(LedgerError::EmptyHistory)?;
        match self.expenses.iter().position(|e| *e == last) {
            Some(position) => {
                let expense = self.expenses.remove(position);
                Ok(Undone { expense, position })
            }
            None => {
                let description = last.description.clone();
                self.history.push(last);
                Err(LedgerError::HistoryOutOfSync { description })
            }
        }
    }

    /// Put back an undone expense whose storage delete failed.
    pub fn rollback_undo(&mut self, undone: Undone) {
        let position = undone.position.min(self.expenses.len());
        self.history.push(undone.expense.clone());
        self.expenses.insert(position, undone.expense);
    }

    // ========================
    // Views
    // ========================

    pub fn balances(&self) -> Vec<MemberBalance> {
        compute_balances(&self.members, &self.expenses)
    }

    pub fn settle_up(&self) -> SettlementPlan {
        plan_settlement(&self.balances())
    }

    pub fn monthly_summary(&self, month: u32, year: i32) -> Result<MonthlySummary, LedgerError> {
        Ok(monthly_summary(&self.members, &self.expenses, month, year)?)
    }

    pub fn member_summary(&self, member: &str) -> Result<MemberSummary, LedgerError> {
        Ok(member_summary(&self.members, &self.expenses, member)?)
    }

    pub fn expense_breakdown(&self) -> Vec<ExpenseBreakdown> {
        expense_breakdown(&self.members, &self.expenses)
    }
}
