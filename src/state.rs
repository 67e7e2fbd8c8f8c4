use anyhow::Result;
use rust_decimal::Decimal;

use crate::config::DeletePolicy;
use crate::db::Database;
use crate::models::*;
use crate::util::checked_total;

/// Snapshot of everything a render needs.
///
/// Every mutating method writes through to the database and then reloads
/// the whole snapshot, so the state never drifts from storage.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AppState {
    pub total_money: Decimal,
    pub categories: Vec<CategorySummary>,
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub available_money: Decimal,
}

impl AppState {
    pub(crate) fn load(db: &Database) -> Result<Self> {
        let categories = db.category_summaries()?;
        let total_spent = checked_total(categories.iter().map(|s| s.spent), "Total spent")?;
        Ok(Self {
            total_money: db.get_total_money()?,
            categories,
            total_budgeted: db.total_budgeted()?,
            total_spent,
            available_money: db.available_money()?,
        })
    }

    pub(crate) fn refresh(&mut self, db: &Database) -> Result<()> {
        *self = Self::load(db)?;
        Ok(())
    }

    pub(crate) fn summary_for(&self, category_id: i64) -> Option<&CategorySummary> {
        self.categories
            .iter()
            .find(|s| s.category.id == Some(category_id))
    }

    // ── Actions ───────────────────────────────────────────────

    pub(crate) fn set_total_money(&mut self, db: &Database, total: Decimal) -> Result<()> {
        db.set_total_money(total)?;
        self.refresh(db)
    }

    pub(crate) fn add_category(
        &mut self,
        db: &Database,
        name: &str,
        budget: Decimal,
    ) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Category name cannot be empty");
        }
        let id = db.insert_category(&Category::new(name.to_string(), budget))?;
        self.refresh(db)?;
        Ok(id)
    }

    pub(crate) fn update_budget(
        &mut self,
        db: &Database,
        category_id: i64,
        budget: Decimal,
    ) -> Result<()> {
        db.update_category_budget(category_id, budget)?;
        self.refresh(db)
    }

    pub(crate) fn delete_category(
        &mut self,
        db: &Database,
        category_id: i64,
        policy: DeletePolicy,
    ) -> Result<usize> {
        let removed = db.delete_category(category_id, policy)?;
        self.refresh(db)?;
        Ok(removed)
    }

    pub(crate) fn add_expense(&mut self, db: &Database, expense: &Expense) -> Result<i64> {
        let id = db.insert_expense(expense)?;
        self.refresh(db)?;
        Ok(id)
    }
}
