use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::categories;
use crate::db::Database;
use crate::models::{Expense, SYSTEM_CATEGORY};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "add" => cli_add(&args[2..], db),
        "list" | "ls" => cli_list(&args[2..], db),
        "summary" | "s" => cli_summary(&args[2..], db),
        "categories" => cli_categories(db),
        "budget" => cli_budget(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "backup" => cli_backup(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendtui {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SpendTUI — local-only personal expense tracker");
    println!();
    println!("Usage: spendtui [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  add <date> <name> <amount>    Add an expense");
    println!("    --category <name>           Category to file it under");
    println!("  list                          List recent expenses");
    println!("    --month <YYYY-MM>           Month to list (default: current)");
    println!("    --category <name>           Filter by category");
    println!("  summary [YYYY-MM]             Print monthly spending summary");
    println!("  categories                    List categories and their icons");
    println!("  budget <category> <amount>    Set a budget for the current month");
    println!("    --month <YYYY-MM>           Month the budget applies to");
    println!("  export [path]                 Export expenses to CSV");
    println!("    --month <YYYY-MM>           Month to export (default: current)");
    println!("  backup [path]                 Write a full JSON backup");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    let positional: Vec<&String> = args.iter().take_while(|a| !a.starts_with("--")).collect();
    if positional.len() < 3 {
        anyhow::bail!("Usage: spendtui add <date> <name> <amount> [--category <name>]");
    }

    let date = positional[0];
    if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        anyhow::bail!("Invalid date: {date}. Use YYYY-MM-DD");
    }

    let amount_str = positional[positional.len() - 1];
    let amount = Decimal::from_str(amount_str)
        .map_err(|_| anyhow::anyhow!("Invalid amount: {amount_str}"))?;
    let name = positional[1..positional.len() - 1]
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let category = match flag_value(args, "--category") {
        Some(cat) => {
            let registry = db.load_registry()?;
            if !registry.contains(cat) {
                anyhow::bail!(
                    "Category '{cat}' not found. Available: {}",
                    registry.categories.join(", ")
                );
            }
            cat.to_string()
        }
        None => SYSTEM_CATEGORY.to_string(),
    };

    let expense = Expense::new(name.clone(), amount, category.clone(), date.to_string());
    db.insert_expense(&expense)?;
    println!("Added: {name} ${amount} on {date} ({category})");
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let month = flag_value(args, "--month")
        .map(str::to_string)
        .unwrap_or_else(current_month);
    let category = flag_value(args, "--category");

    let expenses = db.get_expenses(Some(50), category, None, Some(&month))?;
    if expenses.is_empty() {
        println!("No expenses for {month}");
        return Ok(());
    }

    println!("{:<12} {:<30} {:<16} {:>10}", "Date", "Name", "Category", "Amount");
    println!("{}", "─".repeat(72));
    for e in &expenses {
        println!(
            "{:<12} {:<30} {:<16} {:>10}",
            e.date,
            e.name.chars().take(30).collect::<String>(),
            e.category,
            format!("${:.2}", e.amount),
        );
    }
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let month = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .unwrap_or_else(current_month);

    let (total, count) = db.get_monthly_totals(&month)?;
    let spending = db.get_spending_by_category(&month)?;
    let budgets = db.get_budgets(&month)?;

    println!("SpendTUI — {month}");
    println!("{}", "─".repeat(40));
    println!("  Spent:      ${total:.2}");
    println!("  Expenses:   {count}");

    if !spending.is_empty() {
        println!();
        println!("Spending by Category:");
        for (name, amount) in &spending {
            let budget_note = budgets
                .iter()
                .find(|b| b.category == *name)
                .map(|b| format!("  (budget ${:.2})", b.limit_amount))
                .unwrap_or_default();
            println!("  {name:<24} ${amount:.2}{budget_note}");
        }
    }

    Ok(())
}

fn cli_categories(db: &mut Database) -> Result<()> {
    let registry = db.load_registry()?;
    println!("{:<20} Icon", "Category");
    println!("{}", "─".repeat(32));
    for name in &registry.categories {
        let marker = if name == SYSTEM_CATEGORY { " (fallback)" } else { "" };
        println!("{:<20} {}{marker}", name, registry.icon_for(name));
    }
    Ok(())
}

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    let positional: Vec<&String> = args.iter().take_while(|a| !a.starts_with("--")).collect();
    if positional.len() < 2 {
        anyhow::bail!("Usage: spendtui budget <category> <amount> [--month <YYYY-MM>]");
    }

    let amount_str = positional[positional.len() - 1];
    let amount = Decimal::from_str(amount_str)
        .map_err(|_| anyhow::anyhow!("Invalid amount: {amount_str}"))?;
    let category = positional[..positional.len() - 1]
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let registry = db.load_registry()?;
    if !registry.contains(&category) {
        anyhow::bail!(
            "Category '{category}' not found. Available: {}",
            registry.categories.join(", ")
        );
    }

    let month = flag_value(args, "--month")
        .map(str::to_string)
        .unwrap_or_else(current_month);

    let budget = categories::upsert_budget(db, &category, &month, amount)?;
    println!(
        "Budget set: {} = ${:.2} for {}",
        budget.category, budget.limit_amount, budget.month_period
    );
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let month = flag_value(args, "--month")
        .map(str::to_string)
        .unwrap_or_else(current_month);

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/spendtui-export-{month}.csv")
        });

    let count = db.export_to_csv(&output_path, Some(&month))?;
    if count == 0 {
        println!("No expenses for {month}");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

fn cli_backup(args: &[String], db: &mut Database) -> Result<()> {
    let path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let stamp = chrono::Local::now().format("%Y-%m-%d");
            format!("{home}/spendtui-backup-{stamp}.json")
        });

    let (expenses, budgets) = crate::backup::write_backup(db, std::path::Path::new(&path))?;
    println!("Backed up {expenses} expenses and {budgets} budgets to {path}");
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
