use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Expense, Member, Split};

use super::MIGRATION_001_INITIAL;

/// Row counts for one stored group, used by the raw group listing.
#[derive(Debug, Clone)]
pub struct GroupOverview {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
    pub expense_count: i64,
}

/// Repository for persisting groups, members and expenses.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every pooled connection. Later calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Group operations
    // ========================

    pub async fn create_group(&self, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO groups (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to create group")?;
        Ok(())
    }

    /// Create a group and its initial members in one transaction.
    pub async fn create_group_with_members(&self, name: &str, members: &[Member]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO groups (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .context("Failed to create group")?;

        for member in members {
            sqlx::query("INSERT INTO members (group_name, name, joined_at) VALUES (?, ?, ?)")
                .bind(name)
                .bind(&member.name)
                .bind(&now)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to add member {}", member.name))?;
        }

        tx.commit().await.context("Failed to commit group creation")?;
        Ok(())
    }

    pub async fn group_exists(&self, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM groups WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up group")?;
        Ok(row.is_some())
    }

    /// List every stored group with its member and expense counts.
    pub async fn list_groups(&self) -> Result<Vec<GroupOverview>> {
        let rows = sqlx::query(
            r#"
            SELECT
                g.name,
                g.created_at,
                (SELECT COUNT(*) FROM members m WHERE m.group_name = g.name) as member_count,
                (SELECT COUNT(*) FROM expenses e WHERE e.group_name = g.name) as expense_count
            FROM groups g
            ORDER BY g.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list groups")?;

        rows.iter()
            .map(|row| {
                let created_at_str: String = row.get("created_at");
                Ok(GroupOverview {
                    name: row.get("name"),
                    created_at: parse_timestamp(&created_at_str)
                        .context("Invalid created_at timestamp")?,
                    member_count: row.get("member_count"),
                    expense_count: row.get("expense_count"),
                })
            })
            .collect()
    }

    // ========================
    // Member operations
    // ========================

    pub async fn add_member(&self, group: &str, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO members (group_name, name, joined_at) VALUES (?, ?, ?)")
            .bind(group)
            .bind(name)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to add member")?;
        Ok(())
    }

    pub async fn member_exists(&self, group: &str, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM members WHERE group_name = ? AND name = ?")
            .bind(group)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up member")?;
        Ok(row.is_some())
    }

    /// Load a group's members in the order they joined.
    pub async fn load_members(&self, group: &str) -> Result<Vec<Member>> {
        let rows = sqlx::query("SELECT name FROM members WHERE group_name = ? ORDER BY rowid")
            .bind(group)
            .fetch_all(&self.pool)
            .await
            .context("Failed to load members")?;

        rows.iter()
            .map(|row| {
                let name: String = row.get("name");
                Member::new(name).context("Invalid stored member name")
            })
            .collect()
    }

    // ========================
    // Expense operations
    // ========================

    pub async fn save_expense(&self, group: &str, expense: &Expense) -> Result<()> {
        let split_json = encode_split(&expense.split)?;

        sqlx::query(
            r#"
            INSERT INTO expenses
                (id, group_name, description, amount_cents, paid_by, split, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(group)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(&expense.paid_by)
        .bind(&split_json)
        .bind(expense.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;
        Ok(())
    }

    /// Delete one stored expense. Fails if it isn't there.
    pub async fn delete_expense(&self, group: &str, expense: &Expense) -> Result<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE group_name = ? AND id = ?")
            .bind(group)
            .bind(expense.id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;

        if result.rows_affected() == 0 {
            anyhow::bail!(
                "Expense '{}' ({}) not found in group '{}'",
                expense.description,
                expense.id,
                group
            );
        }
        Ok(())
    }

    /// Load a group's expenses in insertion order.
    pub async fn load_expenses(&self, group: &str) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, amount_cents, paid_by, split, timestamp
            FROM expenses
            WHERE group_name = ?
            ORDER BY rowid
            "#,
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id_str: String = row.get("id");
        let split_json: String = row.get("split");
        let timestamp_str: String = row.get("timestamp");

        Ok(Expense {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            description: row.get("description"),
            amount: row.get("amount_cents"),
            paid_by: row.get("paid_by"),
            split: decode_split(&split_json)
                .with_context(|| format!("Invalid split for expense {}", id_str))?,
            timestamp: parse_timestamp(&timestamp_str).context("Invalid timestamp")?,
        })
    }
}

/// Encode a split as a JSON object of member name to cents.
pub fn encode_split(split: &Split) -> Result<String> {
    serde_json::to_string(split).context("Failed to encode split")
}

/// Decode a split stored by `encode_split`.
pub fn decode_split(encoded: &str) -> Result<Split> {
    serde_json::from_str(encoded).context("Failed to decode split")
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
