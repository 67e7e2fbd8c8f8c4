mod schema;
mod totals;

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::DeletePolicy;
use crate::models::*;

/// Handle to the budget database file.
///
/// Every operation opens its own connection and drops it when done; nothing
/// holds a connection (or a transaction) across calls.
pub(crate) struct Database {
    path: PathBuf,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let db = Self {
            path: path.to_path_buf(),
        };
        let mut conn = db.connect()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        migrate(&mut conn).context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(db)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("Failed to open database: {}", self.path.display()))
    }

    // ── Total money ───────────────────────────────────────────

    pub(crate) fn get_total_money(&self) -> Result<Decimal> {
        let conn = self.connect()?;
        let total: Option<String> = conn
            .query_row("SELECT total FROM total_money WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        match total {
            Some(t) => {
                Decimal::from_str(&t).with_context(|| format!("Corrupt total_money value: {t}"))
            }
            None => Ok(Decimal::ZERO),
        }
    }

    pub(crate) fn set_total_money(&self, total: Decimal) -> Result<()> {
        if total < Decimal::ZERO {
            anyhow::bail!("Total money cannot be negative: {total}");
        }
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO total_money (id, total) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET total = ?1",
            params![total.to_string()],
        )?;
        tracing::info!(%total, "total money updated");
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        if cat.budget < Decimal::ZERO {
            anyhow::bail!("Budget cannot be negative: {}", cat.budget);
        }
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO categories (name, budget) VALUES (?1, ?2)",
            params![cat.name, cat.budget.to_string()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, name = %cat.name, budget = %cat.budget, "category added");
        Ok(id)
    }

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name, budget FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.connect()?;
        let result = conn.query_row(
            "SELECT id, name, budget FROM categories WHERE id = ?1",
            params![id],
            category_from_row,
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn find_categories_by_name(&self, name: &str) -> Result<Vec<Category>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, budget FROM categories WHERE name = ?1 COLLATE NOCASE ORDER BY id",
        )?;
        let rows = stmt.query_map(params![name], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_category_budget(&self, id: i64, budget: Decimal) -> Result<()> {
        if budget < Decimal::ZERO {
            anyhow::bail!("Budget cannot be negative: {budget}");
        }
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE categories SET budget = ?1 WHERE id = ?2",
            params![budget.to_string(), id],
        )?;
        if changed == 0 {
            anyhow::bail!("Category {id} not found");
        }
        tracing::info!(id, %budget, "category budget updated");
        Ok(())
    }

    /// Delete a category. Returns how many expenses were removed with it,
    /// which is always zero under [`DeletePolicy::Orphan`].
    pub(crate) fn delete_category(&self, id: i64, policy: DeletePolicy) -> Result<usize> {
        let mut conn = self.connect()?;
        let removed = match policy {
            DeletePolicy::Orphan => {
                let changed =
                    conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
                if changed == 0 {
                    anyhow::bail!("Category {id} not found");
                }
                0
            }
            DeletePolicy::Cascade => {
                let tx = conn.transaction()?;
                let changed = tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
                if changed == 0 {
                    anyhow::bail!("Category {id} not found");
                }
                let removed =
                    tx.execute("DELETE FROM expenses WHERE category_id = ?1", params![id])?;
                tx.commit()?;
                removed
            }
        };
        tracing::info!(id, %policy, expenses_removed = removed, "category deleted");
        Ok(removed)
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        if expense.amount < Decimal::ZERO {
            anyhow::bail!("Expense amount cannot be negative: {}", expense.amount);
        }
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO expenses (category_id, amount, details, timestamp, receipt)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense.category_id,
                expense.amount.to_string(),
                expense.details,
                expense.timestamp,
                expense.receipt.as_ref().map(|r| r.bytes()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(
            id,
            category_id = expense.category_id,
            amount = %expense.amount,
            receipt = expense.has_receipt(),
            "expense added"
        );
        Ok(id)
    }

    /// Expenses recorded against `category_id`, oldest first. The category
    /// does not have to exist any more.
    pub(crate) fn get_expenses(&self, category_id: i64) -> Result<Vec<Expense>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, category_id, amount, details, timestamp, receipt
             FROM expenses WHERE category_id = ?1
             ORDER BY timestamp, id",
        )?;
        let rows = stmt.query_map(params![category_id], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_all_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, category_id, amount, details, timestamp, receipt
             FROM expenses ORDER BY timestamp, id",
        )?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Expenses whose category has been deleted.
    pub(crate) fn get_orphaned_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT e.id, e.category_id, e.amount, e.details, e.timestamp, e.receipt
             FROM expenses e
             LEFT JOIN categories c ON e.category_id = c.id
             WHERE c.id IS NULL
             ORDER BY e.timestamp, e.id",
        )?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// `Ok(None)` both when the expense is missing and when it has no receipt.
    pub(crate) fn get_expense_receipt(&self, expense_id: i64) -> Result<Option<Receipt>> {
        let conn = self.connect()?;
        let result = conn.query_row(
            "SELECT receipt FROM expenses WHERE id = ?1",
            params![expense_id],
            |row| row.get::<_, Option<Vec<u8>>>(0),
        );
        match result {
            Ok(Some(bytes)) => Ok(Some(Receipt::from_bytes(bytes).with_context(|| {
                format!("Stored receipt for expense {expense_id} is not a PNG or JPEG")
            })?)),
            Ok(None) | Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn migrate(conn: &mut Connection) -> Result<()> {
    // Check if schema_version table exists
    let has_version_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !has_version_table {
        // Fresh database - apply full schema
        let tx = conn.transaction()?;
        tx.execute_batch(schema::SCHEMA_V1)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![schema::CURRENT_VERSION],
        )?;
        tx.commit()?;
        return Ok(());
    }

    // An empty version table means nothing has been recorded yet.
    let current: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?
        .unwrap_or(0);

    for &(from_version, sql) in schema::MIGRATIONS {
        if current <= from_version {
            tracing::debug!(from_version, "applying migration");
            conn.execute_batch(sql)?;
        }
    }

    if current < schema::CURRENT_VERSION {
        conn.execute(
            "UPDATE schema_version SET version = ?1",
            params![schema::CURRENT_VERSION],
        )?;
    }

    Ok(())
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        budget: decimal_column(row, 2)?,
    })
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let receipt = match row.get::<_, Option<Vec<u8>>>(5)? {
        Some(bytes) => Some(Receipt::from_bytes(bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Blob, e.into())
        })?),
        None => None,
    };
    Ok(Expense {
        id: Some(row.get(0)?),
        category_id: row.get(1)?,
        amount: decimal_column(row, 2)?,
        details: row.get(3)?,
        timestamp: row.get(4)?,
        receipt,
    })
}

#[cfg(test)]
mod tests;
