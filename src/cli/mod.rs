use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use clap::{Parser, Subcommand};

use crate::application::{GroupSession, LedgerService, NewExpense};
use crate::domain::{BalanceStatus, Split, SplitMode, format_cents, parse_cents};

/// Splitledger - Shared Expense Ledger
#[derive(Parser)]
#[command(name = "splitledger")]
#[command(about = "Track shared group expenses and work out who pays whom")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SPLITLEDGER_DB", default_value = "splitledger.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Group management commands
    #[command(subcommand)]
    Group(GroupCommands),

    /// Record an expense paid by one member
    Add {
        /// Amount paid (e.g., "90.00" or "90")
        amount: String,

        /// Group name
        #[arg(short, long)]
        group: String,

        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Member who paid
        #[arg(short, long)]
        paid_by: String,

        /// Split mode: equal, custom
        #[arg(short, long, default_value = "equal")]
        split: String,

        /// Custom share as NAME=AMOUNT (repeat for each member)
        #[arg(long = "share")]
        shares: Vec<String>,

        /// Date of the expense (ISO 8601 format: YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show who is owed and who owes
    Balances {
        /// Group name
        #[arg(short, long)]
        group: String,
    },

    /// List every expense, oldest first
    History {
        /// Group name
        #[arg(short, long)]
        group: String,
    },

    /// Remove the most recently added expense
    Undo {
        /// Group name
        #[arg(short, long)]
        group: String,
    },

    /// Paid and owed totals per member for one calendar month (UTC)
    Monthly {
        /// Group name
        #[arg(short, long)]
        group: String,

        /// Month in UTC (1-12, defaults to current month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Year (defaults to current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Lifetime totals for one member
    Member {
        /// Member name
        name: String,

        /// Group name
        #[arg(short, long)]
        group: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Propose payments that settle every balance
    Settle {
        /// Group name
        #[arg(short, long)]
        group: String,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show each member's share of every expense
    Details {
        /// Group name
        #[arg(short, long)]
        group: String,
    },

    /// Export a group to CSV or JSON
    Export {
        /// What to export: history, balances, full
        export_type: String,

        /// Group name
        #[arg(short, long)]
        group: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new group
    Create {
        /// Group name (must be unique)
        name: String,

        /// Member name (repeat for each member)
        #[arg(short, long = "member")]
        members: Vec<String>,
    },

    /// Add a member to an existing group
    AddMember {
        /// Member name
        name: String,

        /// Group name
        #[arg(short, long)]
        group: String,
    },

    /// List all groups
    List,

    /// Show a group's members and totals
    Show {
        /// Group name
        name: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let service = match self.command {
            Commands::Init => LedgerService::init(&self.database).await?,
            _ => LedgerService::connect(&self.database).await?,
        };
        run_command(&service, &self.database, self.command).await
    }
}

async fn run_command(service: &LedgerService, database: &str, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Database initialized: {}", database);
        }

        Commands::Group(group_cmd) => run_group_command(service, group_cmd).await?,

        Commands::Add {
            amount,
            group,
            description,
            paid_by,
            split,
            shares,
            date,
        } => {
            let mut session = service.open_group(&group).await?;
            let amount =
                parse_cents(&amount).context("Invalid amount format. Use '90.00' or '90'")?;

            let split = match split.to_lowercase().as_str() {
                "equal" => {
                    if !shares.is_empty() {
                        anyhow::bail!("--share is only valid with --split custom");
                    }
                    SplitMode::Equal
                }
                "custom" => SplitMode::Custom(parse_shares(&shares)?),
                other => anyhow::bail!("Invalid split mode '{}'. Valid: equal, custom", other),
            };

            let timestamp = match date {
                Some(date_str) => parse_date(&date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?,
                None => Utc::now(),
            };

            let expense = session
                .add_expense(NewExpense {
                    description,
                    amount,
                    paid_by,
                    split,
                    timestamp,
                })
                .await?;

            println!(
                "Recorded expense: {} paid {} for '{}' ({})",
                expense.paid_by,
                format_cents(expense.amount),
                expense.description,
                expense.id
            );
        }

        Commands::Balances { group } => {
            let session = service.open_group(&group).await?;
            print_balances(&session);
        }

        Commands::History { group } => {
            let session = service.open_group(&group).await?;
            print_history(&session);
        }

        Commands::Undo { group } => {
            let mut session = service.open_group(&group).await?;
            let expense = session.undo().await?;
            println!(
                "Undid: {} of {}",
                expense.description,
                format_cents(expense.amount)
            );
        }

        Commands::Monthly {
            group,
            month,
            year,
            format,
        } => {
            let session = service.open_group(&group).await?;
            let now = Utc::now();
            let summary =
                session.monthly_summary(month.unwrap_or(now.month()), year.unwrap_or(now.year()))?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => {
                    println!("Monthly Summary for {}/{}", summary.month, summary.year);
                    println!("Expenses: {}", summary.expense_count);
                    println!();
                    println!("{:<20} {:>12} {:>12}", "MEMBER", "PAID", "OWED");
                    println!("{}", "-".repeat(46));
                    for totals in &summary.members {
                        println!(
                            "{:<20} {:>12} {:>12}",
                            truncate(&totals.member, 20),
                            format_cents(totals.paid),
                            format_cents(totals.owed)
                        );
                    }
                }
            }
        }

        Commands::Member {
            name,
            group,
            format,
        } => {
            let session = service.open_group(&group).await?;
            let summary = session.member_summary(&name)?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => {
                    println!("Member Summary for {}", summary.member);
                    println!("  Total paid: {:>12}", format_cents(summary.paid));
                    println!("  Total owed: {:>12}", format_cents(summary.owed));
                    match summary.net {
                        net if net > 0 => {
                            println!("  Net: {} is owed {}", summary.member, format_cents(net))
                        }
                        net if net < 0 => {
                            println!("  Net: {} owes {}", summary.member, format_cents(-net))
                        }
                        _ => println!("  Net: settled"),
                    }
                }
            }
        }

        Commands::Settle { group, format } => {
            let session = service.open_group(&group).await?;
            let plan = session.settle_up();

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
                "csv" => {
                    println!("debtor,creditor,amount_cents");
                    for tx in &plan.transactions {
                        println!("{},{},{}", tx.debtor, tx.creditor, tx.amount);
                    }
                }
                _ => {
                    if plan.transactions.is_empty() {
                        println!("Everyone is settled.");
                    } else {
                        println!("Settle Up Transactions");
                        for tx in &plan.transactions {
                            println!(
                                "  {} pays {}: {}",
                                tx.debtor,
                                tx.creditor,
                                format_cents(tx.amount)
                            );
                        }
                    }
                }
            }

            if !plan.is_complete() {
                eprintln!("Warning: balances could not be fully settled. Leftover:");
                for leftover in &plan.residue {
                    eprintln!("  {} {}", leftover.member, format_cents(leftover.balance));
                }
            }
        }

        Commands::Details { group } => {
            let session = service.open_group(&group).await?;
            print_details(&session);
        }

        Commands::Export {
            export_type,
            group,
            output,
        } => {
            let session = service.open_group(&group).await?;
            run_export_command(&session, &export_type, output.as_deref())?;
        }
    }

    Ok(())
}

async fn run_group_command(service: &LedgerService, cmd: GroupCommands) -> Result<()> {
    match cmd {
        GroupCommands::Create { name, members } => {
            let session = service.create_group(&name, &members).await?;
            let members = session.group().members();
            println!(
                "Created group: {} ({} member{})",
                session.name(),
                members.len(),
                if members.len() == 1 { "" } else { "s" }
            );
        }

        GroupCommands::AddMember { name, group } => {
            let mut session = service.open_group(&group).await?;
            let member = session.add_member(&name).await?;
            println!("Added member: {} to {}", member, session.name());
        }

        GroupCommands::List => {
            let groups = service.list_groups().await?;
            if groups.is_empty() {
                println!("No groups found.");
            } else {
                println!("{:<20} {:>8} {:>9}  {}", "NAME", "MEMBERS", "EXPENSES", "CREATED");
                println!("{}", "-".repeat(60));
                for group in groups {
                    println!(
                        "{:<20} {:>8} {:>9}  {}",
                        truncate(&group.name, 20),
                        group.member_count,
                        group.expense_count,
                        group.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
        }

        GroupCommands::Show { name } => {
            let session = service.open_group(&name).await?;
            let group = session.group();
            let total: i64 = group.expenses().iter().map(|e| e.amount).sum();

            println!("Group: {}", group.name());
            println!("  Members:  {}", group.members().len());
            for member in group.members() {
                println!("    - {}", member);
            }
            println!("  Expenses: {}", group.expenses().len());
            println!("  Total:    {}", format_cents(total));
            if let Some(last) = group.expenses().last() {
                println!(
                    "  Last:     {} on {}",
                    last.description,
                    last.timestamp.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }
    Ok(())
}

fn run_export_command(
    session: &GroupSession<'_>,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(session.group());

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "history" => {
            let count = exporter.export_history_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} expenses", count);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} balances", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_snapshot_json(writer)?;
            if output.is_some() {
                eprintln!(
                    "Exported group {}: {} members, {} expenses",
                    snapshot.name,
                    snapshot.members.len(),
                    snapshot.expenses.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: history, balances, full",
                export_type
            );
        }
    }

    Ok(())
}

fn print_balances(session: &GroupSession<'_>) {
    println!("Balances for {}", session.name());
    for entry in session.balances() {
        match entry.status() {
            BalanceStatus::Owed => {
                println!("  {} is owed {}", entry.member, format_cents(entry.balance))
            }
            BalanceStatus::Owes => {
                println!("  {} owes {}", entry.member, format_cents(-entry.balance))
            }
            BalanceStatus::Settled => println!("  {} is settled", entry.member),
        }
    }
}

fn print_history(session: &GroupSession<'_>) {
    let history = session.history();
    if history.is_empty() {
        println!("No expenses recorded.");
        return;
    }

    println!(
        "{:<19} {:<24} {:>12} {:<12} {}",
        "DATE", "DESCRIPTION", "AMOUNT", "PAID BY", "SPLIT"
    );
    println!("{}", "-".repeat(90));
    for expense in history {
        let split = expense
            .split
            .iter()
            .map(|(member, share)| format!("{}: {}", member, format_cents(*share)))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<19} {:<24} {:>12} {:<12} {}",
            expense.timestamp.format("%Y-%m-%d %H:%M:%S"),
            truncate(&expense.description, 24),
            format_cents(expense.amount),
            truncate(&expense.paid_by, 12),
            split
        );
    }
}

fn print_details(session: &GroupSession<'_>) {
    println!("Paid / Not Paid Details for {}", session.name());
    for item in session.expense_breakdown() {
        println!();
        println!(
            "Expense: {} | Total: {} | Paid by: {}",
            item.description,
            format_cents(item.amount),
            item.paid_by
        );
        for line in &item.shares {
            if line.is_payer {
                println!(
                    "  {} spent {} (their share: {})",
                    line.member,
                    format_cents(item.amount),
                    format_cents(line.share)
                );
            } else {
                println!("  {} owes {}", line.member, format_cents(line.share));
            }
        }
    }
    println!();
    print_balances(session);
}

/// Parse repeated `NAME=AMOUNT` arguments into a split.
fn parse_shares(shares: &[String]) -> Result<Split> {
    if shares.is_empty() {
        anyhow::bail!("--split custom needs at least one --share NAME=AMOUNT");
    }

    let mut split = Split::new();
    for share in shares {
        let (name, amount) = share
            .split_once('=')
            .with_context(|| format!("Invalid share '{}'. Use NAME=AMOUNT", share))?;
        let cents = parse_cents(amount)
            .with_context(|| format!("Invalid amount in share '{}'", share))?;
        if split.insert(name.trim().to_string(), cents).is_some() {
            anyhow::bail!("Member '{}' has more than one share", name.trim());
        }
    }
    Ok(split)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    use chrono::NaiveDate;

    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    // Noon UTC keeps the calendar day stable in monthly reports
    let naive_datetime = naive_date
        .and_hms_opt(12, 0, 0)
        .context("Failed to build timestamp")?;

    Ok(naive_datetime.and_utc())
}
