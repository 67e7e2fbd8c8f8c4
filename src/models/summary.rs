use rust_decimal::Decimal;

use super::Category;

/// A category together with what has actually been spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: Category,
    pub spent: Decimal,
}

impl CategorySummary {
    pub fn new(category: Category, spent: Decimal) -> Self {
        Self { category, spent }
    }

    /// Budget minus actual spend. Negative when overspent.
    pub fn remaining(&self) -> Decimal {
        self.category.budget - self.spent
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining() < Decimal::ZERO
    }
}
