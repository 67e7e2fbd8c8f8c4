//! Read-only aggregates. Nothing is cached: every call goes back to the
//! database, and sums are taken in `Decimal`, not SQLite REAL.

use anyhow::Result;
use rusqlite::params;
use rust_decimal::Decimal;

use super::{decimal_column, Database};
use crate::models::{Category, CategorySummary};
use crate::util::checked_total;

impl Database {
    /// Sum of every category's budget: what the user plans to spend, not
    /// what has been spent.
    pub(crate) fn total_budgeted(&self) -> Result<Decimal> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT budget FROM categories")?;
        let budgets = stmt
            .query_map([], |row| decimal_column(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        checked_total(budgets, "Total budgeted")
    }

    /// Sum of expense amounts recorded against `category_id`; zero if none.
    pub(crate) fn total_spent(&self, category_id: i64) -> Result<Decimal> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT amount FROM expenses WHERE category_id = ?1")?;
        let amounts = stmt
            .query_map(params![category_id], |row| decimal_column(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        checked_total(amounts, &format!("Total spent for category {category_id}"))
    }

    pub(crate) fn remaining(&self, category: &Category) -> Result<Decimal> {
        let spent = match category.id {
            Some(id) => self.total_spent(id)?,
            None => Decimal::ZERO,
        };
        Ok(category.budget - spent)
    }

    /// Total money minus everything allocated to categories.
    pub(crate) fn available_money(&self) -> Result<Decimal> {
        Ok(self.get_total_money()? - self.total_budgeted()?)
    }

    pub(crate) fn category_summaries(&self) -> Result<Vec<CategorySummary>> {
        self.get_categories()?
            .into_iter()
            .map(|cat| {
                let spent = match cat.id {
                    Some(id) => self.total_spent(id)?,
                    None => Decimal::ZERO,
                };
                Ok(CategorySummary::new(cat, spent))
            })
            .collect()
    }
}
