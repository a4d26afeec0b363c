use serde::{Deserialize, Serialize};

use super::{Cents, MemberBalance};

/// One proposed payment: `debtor` pays `creditor` the given amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub debtor: String,
    pub creditor: String,
    pub amount: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub transactions: Vec<Settlement>,
    /// Balances left over when credits and debts don't cancel out exactly.
    /// Empty for a consistent ledger.
    pub residue: Vec<MemberBalance>,
}

impl SettlementPlan {
    pub fn is_complete(&self) -> bool {
        self.residue.is_empty()
    }
}

struct Position<'a> {
    member: &'a str,
    remaining: Cents,
}

/// Propose payments that zero every balance, greedily matching debtors to
/// creditors in the order they appear in `balances`.
///
/// Each step pays `min(debt, credit)` and retires whichever side reaches
/// zero (both on a tie), so there are at most `n - 1` payments for `n`
/// members with a nonzero balance.
pub fn plan_settlement(balances: &[MemberBalance]) -> SettlementPlan {
    let mut creditors: Vec<Position> = Vec::new();
    let mut debtors: Vec<Position> = Vec::new();
    for entry in balances {
        if entry.balance > 0 {
            creditors.push(Position {
                member: &entry.member,
                remaining: entry.balance,
            });
        } else if entry.balance < 0 {
            debtors.push(Position {
                member: &entry.member,
                remaining: entry.balance.saturating_neg(),
            });
        }
    }

    let mut transactions = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let paid = debtors[i].remaining.min(creditors[j].remaining);
        transactions.push(Settlement {
            debtor: debtors[i].member.to_string(),
            creditor: creditors[j].member.to_string(),
            amount: paid,
        });

        debtors[i].remaining -= paid;
        creditors[j].remaining -= paid;
        if debtors[i].remaining == 0 {
            i += 1;
        }
        if creditors[j].remaining == 0 {
            j += 1;
        }
    }

    let residue = debtors[i..]
        .iter()
        .filter(|d| d.remaining != 0)
        .map(|d| MemberBalance {
            member: d.member.to_string(),
            balance: -d.remaining,
        })
        .chain(
            creditors[j..]
                .iter()
                .filter(|c| c.remaining != 0)
                .map(|c| MemberBalance {
                    member: c.member.to_string(),
                    balance: c.remaining,
                }),
        )
        .collect();

    SettlementPlan {
        transactions,
        residue,
    }
}

/// Apply payments to a copy of `balances`: debtors go up, creditors go down.
pub fn apply_settlements(
    balances: &[MemberBalance],
    transactions: &[Settlement],
) -> Vec<MemberBalance> {
    let mut result = balances.to_vec();
    for tx in transactions {
        if let Some(debtor) = result.iter_mut().find(|b| b.member == tx.debtor) {
            debtor.balance = debtor.balance.saturating_add(tx.amount);
        }
        if let Some(creditor) = result.iter_mut().find(|b| b.member == tx.creditor) {
            creditor.balance = creditor.balance.saturating_sub(tx.amount);
        }
    }
    result
}
