//! Property-based tests for balance folding and settle-up planning.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use super::{
    Cents, Expense, Member, Split, apply_settlements, compute_balances, plan_settlement,
    split_evenly,
};

const NAMES: [&str; 6] = ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"];

/// Raw expense input: amount in cents, payer index, bitmask of split members.
fn raw_expense() -> impl Strategy<Value = (Cents, usize, u8)> {
    (1i64..1_000_000i64, 0usize..NAMES.len(), 1u8..64u8)
}

fn members(count: usize) -> Vec<Member> {
    NAMES[..count]
        .iter()
        .map(|n| Member::new(*n).unwrap())
        .collect()
}

/// Turn raw inputs into valid expenses for a group of `count` members: the
/// split is an even split over the masked members (falling back to the payer).
fn build_expenses(count: usize, raw: &[(Cents, usize, u8)]) -> Vec<Expense> {
    raw.iter()
        .enumerate()
        .map(|(i, &(amount, payer, mask))| {
            let payer = NAMES[payer % count];
            let mut sharers: Vec<&str> = (0..count)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| NAMES[bit])
                .collect();
            if sharers.is_empty() {
                sharers.push(payer);
            }
            let split: Split = sharers
                .iter()
                .map(|s| s.to_string())
                .zip(split_evenly(amount, sharers.len()))
                .collect();
            let at = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            Expense::new(format!("expense {}", i), amount, payer, split, at)
        })
        .collect()
}

/// Group size, its expenses, and the same expenses in an arbitrary order.
fn shuffled_expenses() -> impl Strategy<Value = (usize, Vec<Expense>, Vec<Expense>)> {
    (
        2usize..=NAMES.len(),
        prop::collection::vec(raw_expense(), 0..30),
    )
        .prop_flat_map(|(count, raw)| {
            let expenses = build_expenses(count, &raw);
            (
                Just(count),
                Just(expenses.clone()),
                Just(expenses).prop_shuffle(),
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any set of valid expenses, balances sum to zero.
    #[test]
    fn prop_balances_are_zero_sum(
        count in 2usize..=NAMES.len(),
        raw in prop::collection::vec(raw_expense(), 0..30),
    ) {
        let balances = compute_balances(&members(count), &build_expenses(count, &raw));
        let total: Cents = balances.iter().map(|b| b.balance).sum();
        prop_assert_eq!(total, 0);
        prop_assert_eq!(balances.len(), count);
    }

    /// Any permutation of the expenses yields the same balances.
    #[test]
    fn prop_balances_are_order_independent(
        (count, expenses, shuffled) in shuffled_expenses(),
    ) {
        let group = members(count);

        prop_assert_eq!(
            compute_balances(&group, &expenses),
            compute_balances(&group, &shuffled)
        );
    }

    /// Applying every proposed payment settles every member.
    #[test]
    fn prop_settlement_zeroes_all_balances(
        count in 2usize..=NAMES.len(),
        raw in prop::collection::vec(raw_expense(), 0..30),
    ) {
        let balances = compute_balances(&members(count), &build_expenses(count, &raw));
        let plan = plan_settlement(&balances);

        prop_assert!(plan.is_complete(), "unexpected residue: {:?}", plan.residue);
        prop_assert!(plan.transactions.iter().all(|t| t.amount > 0));
        let settled = apply_settlements(&balances, &plan.transactions);
        prop_assert!(settled.iter().all(|b| b.balance == 0), "left over: {:?}", settled);
    }

    /// At most N - 1 payments for N members with a nonzero balance.
    #[test]
    fn prop_settlement_transaction_bound(
        count in 2usize..=NAMES.len(),
        raw in prop::collection::vec(raw_expense(), 1..30),
    ) {
        let balances = compute_balances(&members(count), &build_expenses(count, &raw));
        let nonzero = balances.iter().filter(|b| b.balance != 0).count();
        let plan = plan_settlement(&balances);

        prop_assert!(plan.transactions.len() <= nonzero.saturating_sub(1));
    }

    /// Inconsistent balances never hang the planner; leftovers are reported.
    #[test]
    fn prop_unbalanced_input_reports_residue(
        amounts in prop::collection::vec(-100_000i64..100_000i64, 1..8),
    ) {
        let balances: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, b)| super::MemberBalance {
                member: format!("m{}", i),
                balance: *b,
            })
            .collect();
        let total: Cents = amounts.iter().sum();
        let plan = plan_settlement(&balances);

        let residue: Cents = plan.residue.iter().map(|b| b.balance).sum();
        prop_assert_eq!(residue, total);
        prop_assert_eq!(plan.is_complete(), plan.residue.is_empty());
        if total != 0 {
            prop_assert!(!plan.is_complete());
        }
    }
}
