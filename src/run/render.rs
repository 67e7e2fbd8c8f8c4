use std::fmt::Write;

use crate::models::Expense;
use crate::state::AppState;
use crate::util::{format_amount, truncate};

const NAME_WIDTH: usize = 24;

/// Text view of the whole budget: the pool, the allocations and what is left
/// in each category.
pub(crate) fn render_summary(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Available Money:  {}",
        format_amount(state.available_money)
    );
    let _ = writeln!(out, "Total Money:      {}", format_amount(state.total_money));
    let _ = writeln!(
        out,
        "Total Budgeted:   {}",
        format_amount(state.total_budgeted)
    );
    let _ = writeln!(out, "Total Spent:      {}", format_amount(state.total_spent));
    out.push('\n');

    if state.categories.is_empty() {
        out.push_str("No categories yet.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<4} {:<NAME_WIDTH$} {:>14} {:>14} {:>14}",
        "ID", "Category", "Budget", "Spent", "Remaining"
    );
    let _ = writeln!(out, "{}", "─".repeat(4 + NAME_WIDTH + 3 * 15 + 1));
    for s in &state.categories {
        let flag = if s.is_over_budget() { " !" } else { "" };
        let _ = writeln!(
            out,
            "{:<4} {:<NAME_WIDTH$} {:>14} {:>14} {:>14}{flag}",
            s.category.id.unwrap_or(0),
            truncate(&s.category.name, NAME_WIDTH),
            format_amount(s.category.budget),
            format_amount(s.spent),
            format_amount(s.remaining()),
        );
    }
    out
}

pub(crate) fn render_expenses(label: &str, expenses: &[Expense]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Existing Expenses for {label}:");
    if expenses.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for exp in expenses {
        let _ = write!(
            out,
            "- {:.2} USD on {} for {}",
            exp.amount, exp.timestamp, exp.details
        );
        if let Some(receipt) = &exp.receipt {
            let _ = write!(
                out,
                " [receipt #{}: {}]",
                exp.id.unwrap_or(0),
                receipt.format()
            );
        }
        out.push('\n');
    }
    out
}
