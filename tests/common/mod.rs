// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use splitledger::application::{LedgerService, NewExpense};
use splitledger::domain::{Cents, Split, SplitMode};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Path of the database inside a test directory, for reconnecting
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("test.db").to_str().unwrap().to_string()
}

/// Helper to parse a date string into DateTime<Utc> at noon
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

/// Names of the standard three-person group
pub fn trio() -> Vec<String> {
    vec!["Alice".into(), "Bob".into(), "Carol".into()]
}

pub fn custom(shares: &[(&str, Cents)]) -> SplitMode {
    let split: Split = shares.iter().map(|(n, s)| (n.to_string(), *s)).collect();
    SplitMode::Custom(split)
}

/// Expense input with an equal split
pub fn equal_expense(description: &str, amount: Cents, paid_by: &str, date: &str) -> NewExpense {
    NewExpense {
        description: description.into(),
        amount,
        paid_by: paid_by.into(),
        split: SplitMode::Equal,
        timestamp: parse_date(date),
    }
}

/// The three-way dinner: Alice pays 90.00, everyone owes 30.00
pub fn dinner(date: &str) -> NewExpense {
    NewExpense {
        description: "Dinner".into(),
        amount: 9000,
        paid_by: "Alice".into(),
        split: custom(&[("Alice", 3000), ("Bob", 3000), ("Carol", 3000)]),
        timestamp: parse_date(date),
    }
}
