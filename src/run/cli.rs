use anyhow::{Context, Result};
use std::path::Path;

use super::render::{render_expenses, render_summary};
use super::resolve_category;
use crate::config::Config;
use crate::db::Database;
use crate::models::{Expense, Receipt};
use crate::state::AppState;
use crate::util::{format_amount, parse_amount};

pub(crate) fn as_cli(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_summary(db);
    };
    let rest = &args[2..];
    match command.as_str() {
        "summary" | "s" => cli_summary(db),
        "total" => cli_total(rest, db),
        "add-category" => cli_add_category(rest, db),
        "set-budget" => cli_set_budget(rest, db),
        "delete-category" => cli_delete_category(rest, db, config),
        "add-expense" => cli_add_expense(rest, db),
        "expenses" => cli_expenses(rest, db),
        "receipt" => cli_receipt(rest, db),
        "orphans" => cli_orphans(db),
        "export" => cli_export(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgeter {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Budgeter — personal budgeting by category");
    println!();
    println!("Usage: budgeter [command]");
    println!();
    println!("Commands:");
    println!("  (none), summary               Show available money and category balances");
    println!("  total <amount>                Set the total money available");
    println!("  add-category <name> <budget>  Create a category with a budget");
    println!("  set-budget <category> <amt>   Change a category's budget");
    println!("  delete-category <category>    Delete a category");
    println!("  add-expense <category> <amount> [details...]");
    println!("    --receipt <file>            Attach a PNG or JPEG receipt");
    println!("  expenses <category|id>        List expenses recorded for a category");
    println!("  receipt <expense-id> [file]   Write an expense's receipt to a file");
    println!("  orphans                       List expenses whose category was deleted");
    println!("  export [path]                 Export all expenses to CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("<category> is an id or a name. Environment:");
    println!("  BUDGETER_DB                   Database file (default: user data dir)");
    println!("  BUDGETER_DELETE_POLICY        orphan (default) or cascade");
    println!("  RUST_LOG                      Log filter, e.g. budgeter=debug");
}

fn cli_summary(db: &Database) -> Result<()> {
    let state = AppState::load(db)?;
    print!("{}", render_summary(&state));
    Ok(())
}

fn cli_total(args: &[String], db: &Database) -> Result<()> {
    let [amount] = args else {
        anyhow::bail!("Usage: budgeter total <amount>");
    };
    let mut state = AppState::load(db)?;
    state.set_total_money(db, parse_amount(amount)?)?;
    print!("{}", render_summary(&state));
    Ok(())
}

fn cli_add_category(args: &[String], db: &Database) -> Result<()> {
    let [name, budget] = args else {
        anyhow::bail!("Usage: budgeter add-category <name> <budget>");
    };
    let budget = parse_amount(budget)?;
    let mut state = AppState::load(db)?;
    let id = state.add_category(db, name, budget)?;
    println!("Added category {name} (id {id})");
    print!("{}", render_summary(&state));
    Ok(())
}

fn cli_set_budget(args: &[String], db: &Database) -> Result<()> {
    let [category, budget] = args else {
        anyhow::bail!("Usage: budgeter set-budget <category> <budget>");
    };
    let budget = parse_amount(budget)?;
    let cat = resolve_category(db, category)?;
    let id = cat
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
    let mut state = AppState::load(db)?;
    state.update_budget(db, id, budget)?;
    let updated = db
        .get_category_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Category {id} disappeared"))?;
    println!(
        "{}: budget {} → {}, {} remaining",
        cat.name,
        format_amount(cat.budget),
        format_amount(updated.budget),
        format_amount(db.remaining(&updated)?)
    );
    print!("{}", render_summary(&state));
    Ok(())
}

fn cli_delete_category(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let [category] = args else {
        anyhow::bail!("Usage: budgeter delete-category <category>");
    };
    let cat = resolve_category(db, category)?;
    let id = cat
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
    let mut state = AppState::load(db)?;
    let removed = state.delete_category(db, id, config.delete_policy)?;
    println!("Deleted category {}", cat.name);
    if removed > 0 {
        println!("Removed {removed} expenses with it");
    } else {
        let kept = db.get_expenses(id)?.len();
        if kept > 0 {
            println!("{kept} expenses kept under category id {id} (see `budgeter orphans`)");
        }
    }
    print!("{}", render_summary(&state));
    Ok(())
}

const ADD_EXPENSE_USAGE: &str =
    "Usage: budgeter add-expense <category> <amount> [details...] [--receipt <file>]";

fn cli_add_expense(args: &[String], db: &Database) -> Result<()> {
    // Positional arguments, with the --receipt flag and its value pulled out.
    let mut receipt_path = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--receipt" {
            match iter.next() {
                Some(path) if !path.trim().is_empty() => receipt_path = Some(path.as_str()),
                _ => anyhow::bail!("--receipt needs a file path\n{ADD_EXPENSE_USAGE}"),
            }
        } else {
            positional.push(arg.as_str());
        }
    }

    let (category, amount, details) = match positional.as_slice() {
        [category, amount, details @ ..] => (*category, *amount, details.join(" ")),
        _ => anyhow::bail!(ADD_EXPENSE_USAGE),
    };

    let cat = resolve_category(db, category)?;
    let category_id = cat
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
    let mut expense = Expense::new(category_id, parse_amount(amount)?, details);
    if let Some(path) = receipt_path {
        expense = expense.with_receipt(read_receipt(Path::new(&shellexpand(path)))?);
    }

    let mut state = AppState::load(db)?;
    let id = state.add_expense(db, &expense)?;
    println!("Expense added successfully! (id {id})");
    if let Some(summary) = state.summary_for(category_id) {
        println!(
            "{}: spent {}, {} remaining",
            cat.name,
            format_amount(summary.spent),
            format_amount(summary.remaining())
        );
    }
    Ok(())
}

fn read_receipt(path: &Path) -> Result<Receipt> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read receipt: {}", path.display()))?;
    Receipt::from_bytes(bytes).with_context(|| format!("Unsupported receipt: {}", path.display()))
}

fn cli_expenses(args: &[String], db: &Database) -> Result<()> {
    let [category] = args else {
        anyhow::bail!("Usage: budgeter expenses <category|id>");
    };
    // Deleted categories can still be listed by their old id.
    let (label, category_id) = match resolve_category(db, category) {
        Ok(cat) => {
            let id = cat
                .id
                .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
            (cat.name, id)
        }
        Err(err) => match category.parse::<i64>() {
            Ok(id) => (format!("deleted category {id}"), id),
            Err(_) => return Err(err),
        },
    };
    let expenses = db.get_expenses(category_id)?;
    print!("{}", render_expenses(&label, &expenses));
    Ok(())
}

fn cli_receipt(args: &[String], db: &Database) -> Result<()> {
    let (expense_id, output) = match args {
        [id] => (id, None),
        [id, output] => (id, Some(output)),
        _ => anyhow::bail!("Usage: budgeter receipt <expense-id> [output-file]"),
    };
    let expense_id: i64 = expense_id
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid expense id: {expense_id}"))?;
    let receipt = db
        .get_expense_receipt(expense_id)?
        .ok_or_else(|| anyhow::anyhow!("Expense {expense_id} has no receipt"))?;
    let output = match output {
        Some(path) => shellexpand(path),
        None => format!("receipt-{expense_id}.{}", receipt.format().extension()),
    };
    std::fs::write(&output, receipt.bytes())
        .with_context(|| format!("Failed to write {output}"))?;
    println!(
        "Wrote {} receipt ({} bytes) to {output}",
        receipt.format(),
        receipt.len()
    );
    Ok(())
}

fn cli_orphans(db: &Database) -> Result<()> {
    let orphans = db.get_orphaned_expenses()?;
    if orphans.is_empty() {
        println!("No orphaned expenses");
        return Ok(());
    }
    println!(
        "{:<6} {:<12} {:>12}  {:<19}  Details",
        "ID", "Category ID", "Amount", "Timestamp"
    );
    println!("{}", "─".repeat(70));
    for exp in &orphans {
        println!(
            "{:<6} {:<12} {:>12}  {:<19}  {}",
            exp.id.unwrap_or(0),
            exp.category_id,
            format_amount(exp.amount),
            exp.timestamp,
            exp.details,
        );
    }
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let date = chrono::Local::now().format("%Y-%m-%d");
            format!("{home}/budgeter-expenses-{date}.csv")
        });

    let count = crate::export::export_to_csv(db, Path::new(&output_path))?;
    if count == 0 {
        println!("No expenses to export (wrote header only to {output_path})");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
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
