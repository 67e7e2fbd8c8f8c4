use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::db::Database;
use crate::models::{Category, Expense};

const HEADER: [&str; 7] = [
    "id",
    "category_id",
    "category",
    "amount",
    "details",
    "timestamp",
    "has_receipt",
];

/// Export every expense to a CSV file. Returns the number of rows written.
pub(crate) fn export_to_csv(db: &Database, path: &Path) -> Result<usize> {
    let expenses = db.get_all_expenses()?;
    let categories = db.get_categories()?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_expenses(file, &expenses, &categories)
}

/// Receipt bytes are not exported; only whether one exists. Expenses whose
/// category was deleted get an empty category name.
pub(crate) fn write_expenses<W: Write>(
    out: W,
    expenses: &[Expense],
    categories: &[Category],
) -> Result<usize> {
    let names: HashMap<i64, &str> = categories
        .iter()
        .filter_map(|c| c.id.map(|id| (id, c.name.as_str())))
        .collect();

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;
    for exp in expenses {
        let category = names.get(&exp.category_id).copied().unwrap_or_default();
        wtr.write_record([
            exp.id.map(|id| id.to_string()).unwrap_or_default(),
            exp.category_id.to_string(),
            category.to_string(),
            exp.amount.to_string(),
            exp.details.clone(),
            exp.timestamp.clone(),
            String::from(if exp.has_receipt() { "yes" } else { "no" }),
        ])?;
    }
    wtr.flush()?;
    Ok(expenses.len())
}
