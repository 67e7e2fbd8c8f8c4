mod category;
mod expense;
mod receipt;
mod summary;

pub use category::Category;
pub use expense::{Expense, TIMESTAMP_FORMAT};
pub use receipt::{Receipt, ReceiptFormat};
pub use summary::CategorySummary;
