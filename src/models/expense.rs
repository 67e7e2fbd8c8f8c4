use rust_decimal::Decimal;

use super::Receipt;

/// Format used for the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Option<i64>,
    /// May point at a category that has since been deleted.
    pub category_id: i64,
    pub amount: Decimal,
    pub details: String,
    pub timestamp: String,
    pub receipt: Option<Receipt>,
}

impl Expense {
    /// A new expense stamped with the current local time.
    pub fn new(category_id: i64, amount: Decimal, details: String) -> Self {
        Self {
            id: None,
            category_id,
            amount,
            details,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            receipt: None,
        }
    }

    pub fn with_receipt(mut self, receipt: Receipt) -> Self {
        self.receipt = Some(receipt);
        self
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt.is_some()
    }
}
