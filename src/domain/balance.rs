use serde::{Deserialize, Serialize};

use super::{Cents, Expense, Member};

/// Net position of one member: positive is owed to them, negative they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: String,
    pub balance: Cents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    Owed,
    Owes,
    Settled,
}

impl MemberBalance {
    pub fn status(&self) -> BalanceStatus {
        match self.balance {
            b if b > 0 => BalanceStatus::Owed,
            b if b < 0 => BalanceStatus::Owes,
            _ => BalanceStatus::Settled,
        }
    }
}

/// Fold expenses into one net balance per member, in member order.
///
/// The payer is credited the full amount and every split entry is debited its
/// share. Names that appear in an expense but not in `members` are tracked as
/// extra entries after the members, in order of first appearance, so the
/// result always sums to zero for expenses whose split matches their amount.
pub fn compute_balances(members: &[Member], expenses: &[Expense]) -> Vec<MemberBalance> {
    let mut balances: Vec<MemberBalance> = members
        .iter()
        .map(|m| MemberBalance {
            member: m.name.clone(),
            balance: 0,
        })
        .collect();

    for expense in expenses {
        let paid = entry(&mut balances, &expense.paid_by);
        *paid = paid.saturating_add(expense.amount);
        for (person, share) in &expense.split {
            let owed = entry(&mut balances, person);
            *owed = owed.saturating_sub(*share);
        }
    }

    balances
}

fn entry<'a>(balances: &'a mut Vec<MemberBalance>, name: &str) -> &'a mut Cents {
    let index = match balances.iter().position(|b| b.member == name) {
        Some(index) => index,
        None => {
            balances.push(MemberBalance {
                member: name.to_string(),
                balance: 0,
            });
            balances.len() - 1
        }
    };
    &mut balances[index].balance
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::Split;

    fn members(names: &[&str]) -> Vec<Member> {
        names.iter().map(|n| Member::new(*n).unwrap()).collect()
    }

    fn expense(amount: Cents, paid_by: &str, shares: &[(&str, Cents)]) -> Expense {
        let split: Split = shares.iter().map(|(n, s)| (n.to_string(), *s)).collect();
        Expense::new("test", amount, paid_by, split, Utc::now())
    }

    fn balance_of(balances: &[MemberBalance], name: &str) -> Cents {
        balances.iter().find(|b| b.member == name).unwrap().balance
    }

    #[test]
    fn test_no_expenses_everyone_settled() {
        let balances = compute_balances(&members(&["Alice", "Bob"]), &[]);

        assert_eq!(balances.len(), 2);
        assert!(balances.iter().all(|b| b.status() == BalanceStatus::Settled));
    }

    #[test]
    fn test_dinner_scenario() {
        let group = members(&["Alice", "Bob", "Carol"]);
        let expenses = vec![expense(
            9000,
            "Alice",
            &[("Alice", 3000), ("Bob", 3000), ("Carol", 3000)],
        )];

        let balances = compute_balances(&group, &expenses);

        assert_eq!(
            balances,
            vec![
                MemberBalance {
                    member: "Alice".into(),
                    balance: 6000,
                },
                MemberBalance {
                    member: "Bob".into(),
                    balance: -3000,
                },
                MemberBalance {
                    member: "Carol".into(),
                    balance: -3000,
                },
            ]
        );
        assert_eq!(balances[0].status(), BalanceStatus::Owed);
        assert_eq!(balances[1].status(), BalanceStatus::Owes);
    }

    #[test]
    fn test_payer_outside_split() {
        let group = members(&["Alice", "Bob"]);
        let expenses = vec![expense(5000, "Alice", &[("Bob", 5000)])];

        let balances = compute_balances(&group, &expenses);

        assert_eq!(balance_of(&balances, "Alice"), 5000);
        assert_eq!(balance_of(&balances, "Bob"), -5000);
    }

    #[test]
    fn test_balances_sum_to_zero() {
        let group = members(&["Alice", "Bob", "Carol"]);
        let expenses = vec![
            expense(9000, "Alice", &[("Alice", 3000), ("Bob", 3000), ("Carol", 3000)]),
            expense(10000, "Bob", &[("Alice", 3333), ("Bob", 3333), ("Carol", 3334)]),
            expense(2500, "Carol", &[("Alice", 2500)]),
        ];

        let balances = compute_balances(&group, &expenses);
        let total: Cents = balances.iter().map(|b| b.balance).sum();

        assert_eq!(total, 0, "Balances must sum to zero");
    }

    #[test]
    fn test_unknown_name_is_tracked_not_dropped() {
        let group = members(&["Alice"]);
        let expenses = vec![expense(4000, "Alice", &[("Alice", 2000), ("Zed", 2000)])];

        let balances = compute_balances(&group, &expenses);

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[1].member, "Zed");
        assert_eq!(balances[1].balance, -2000);
        assert_eq!(balances.iter().map(|b| b.balance).sum::<Cents>(), 0);
    }

    #[test]
    fn test_unchecked_huge_expenses_saturate() {
        let group = members(&["Alice", "Bob"]);
        let huge = i64::MAX / 2 + 1;
        let expenses = vec![
            expense(huge, "Alice", &[("Bob", huge)]),
            expense(huge, "Alice", &[("Bob", huge)]),
        ];

        let balances = compute_balances(&group, &expenses);

        assert_eq!(balance_of(&balances, "Alice"), i64::MAX);
        assert_eq!(balance_of(&balances, "Bob"), i64::MIN);
        assert_eq!(expenses[0].split_total(), huge);
    }
}
