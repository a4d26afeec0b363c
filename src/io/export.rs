use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Expense, Group, Member, MemberBalance, SettlementPlan};
use crate::storage::encode_split;

/// Snapshot of one group for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub name: String,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub balances: Vec<MemberBalance>,
    pub settlement: SettlementPlan,
}

/// Exporter for writing a group's ledger in various formats
pub struct Exporter<'a> {
    group: &'a Group,
}

impl<'a> Exporter<'a> {
    pub fn new(group: &'a Group) -> Self {
        Self { group }
    }

    /// Export the expense history to CSV, oldest first
    pub fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "timestamp",
            "description",
            "amount_cents",
            "paid_by",
            "split",
        ])?;

        for expense in self.group.expenses() {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.timestamp.to_rfc3339(),
                expense.description.clone(),
                expense.amount.to_string(),
                expense.paid_by.clone(),
                encode_split(&expense.split)?,
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.group.expenses().len())
    }

    /// Export balances to CSV, in member order
    pub fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let balances = self.group.balances();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["member", "balance_cents"])?;
        for entry in &balances {
            csv_writer.write_record([entry.member.clone(), entry.balance.to_string()])?;
        }

        csv_writer.flush()?;
        Ok(balances.len())
    }

    /// Export the whole group as a JSON snapshot
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<GroupSnapshot> {
        let snapshot = GroupSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            name: self.group.name().to_string(),
            members: self.group.members().to_vec(),
            expenses: self.group.expenses().to_vec(),
            balances: self.group.balances(),
            settlement: self.group.settle_up(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
