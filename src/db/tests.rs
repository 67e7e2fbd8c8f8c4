#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";

fn temp_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&dir.path().join("budget.db")).unwrap();
    (dir, db)
}

fn add_category(db: &Database, name: &str, budget: Decimal) -> i64 {
    db.insert_category(&Category::new(name.into(), budget))
        .unwrap()
}

fn add_expense(db: &Database, category_id: i64, amount: Decimal) -> i64 {
    db.insert_expense(&Expense::new(category_id, amount, "test".into()))
        .unwrap()
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let (_dir, db) = temp_db();
    assert!(db.get_categories().unwrap().is_empty());
    assert!(db.get_all_expenses().unwrap().is_empty());
    assert_eq!(db.get_total_money().unwrap(), Decimal::ZERO);
}

#[test]
fn test_reopen_keeps_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("budget.db");
    {
        let db = Database::open(&path).unwrap();
        db.set_total_money(dec!(1000)).unwrap();
        add_category(&db, "Food", dec!(200));
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_total_money().unwrap(), dec!(1000));
    assert_eq!(db.get_categories().unwrap().len(), 1);
}

#[test]
fn test_schema_version_recorded_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("budget.db");
    Database::open(&path).unwrap();
    Database::open(&path).unwrap();

    let conn = Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    let version: i32 = conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_empty_version_table_reopens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("budget.db");
    Database::open(&path).unwrap();
    Connection::open(&path)
        .unwrap()
        .execute("DELETE FROM schema_version", [])
        .unwrap();

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_total_money().unwrap(), Decimal::ZERO);
}

#[test]
fn test_unreadable_schema_version_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("budget.db");
    Database::open(&path).unwrap();
    Connection::open(&path)
        .unwrap()
        .execute("UPDATE schema_version SET version = 'not-a-number'", [])
        .unwrap();

    assert!(Database::open(&path).is_err());
}

// ── Total money ───────────────────────────────────────────────

#[test]
fn test_set_and_get_total_money() {
    let (_dir, db) = temp_db();
    db.set_total_money(dec!(1234.56)).unwrap();
    assert_eq!(db.get_total_money().unwrap(), dec!(1234.56));
    db.set_total_money(dec!(10)).unwrap();
    assert_eq!(db.get_total_money().unwrap(), dec!(10));
}

#[test]
fn test_total_money_keeps_precision() {
    let (_dir, db) = temp_db();
    db.set_total_money(dec!(0.1) + dec!(0.2)).unwrap();
    assert_eq!(db.get_total_money().unwrap(), dec!(0.3));
}

#[test]
fn test_negative_total_money_rejected() {
    let (_dir, db) = temp_db();
    assert!(db.set_total_money(dec!(-1)).is_err());
    assert_eq!(db.get_total_money().unwrap(), Decimal::ZERO);
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_category_crud() {
    let (_dir, db) = temp_db();
    let id = add_category(&db, "Food", dec!(200));

    let fetched = db.get_category_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.name, "Food");
    assert_eq!(fetched.budget, dec!(200));

    db.update_category_budget(id, dec!(300)).unwrap();
    assert_eq!(
        db.get_category_by_id(id).unwrap().unwrap().budget,
        dec!(300)
    );

    db.delete_category(id, DeletePolicy::Orphan).unwrap();
    assert!(db.get_category_by_id(id).unwrap().is_none());
}

#[test]
fn test_categories_in_creation_order() {
    let (_dir, db) = temp_db();
    add_category(&db, "Zoo", dec!(1));
    add_category(&db, "Apples", dec!(2));
    let names: Vec<String> = db
        .get_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Zoo", "Apples"]);
}

#[test]
fn test_duplicate_category_names_allowed() {
    let (_dir, db) = temp_db();
    let a = add_category(&db, "Fun", dec!(10));
    let b = add_category(&db, "fun", dec!(20));
    assert_ne!(a, b);

    let found = db.find_categories_by_name("FUN").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, Some(a));
    assert_eq!(found[1].id, Some(b));
}

#[test]
fn test_category_by_id_not_found() {
    let (_dir, db) = temp_db();
    assert!(db.get_category_by_id(99999).unwrap().is_none());
}

#[test]
fn test_negative_budget_rejected() {
    let (_dir, db) = temp_db();
    assert!(db
        .insert_category(&Category::new("Bad".into(), dec!(-5)))
        .is_err());
    let id = add_category(&db, "Good", dec!(5));
    assert!(db.update_category_budget(id, dec!(-5)).is_err());
    assert_eq!(db.get_category_by_id(id).unwrap().unwrap().budget, dec!(5));
}

#[test]
fn test_update_missing_category_fails() {
    let (_dir, db) = temp_db();
    let err = db.update_category_budget(42, dec!(1)).unwrap_err();
    assert!(err.to_string().contains("42"));
}

#[test]
fn test_delete_missing_category_fails() {
    let (_dir, db) = temp_db();
    assert!(db.delete_category(42, DeletePolicy::Orphan).is_err());
    assert!(db.delete_category(42, DeletePolicy::Cascade).is_err());
}

#[test]
fn test_delete_orphans_expenses() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    add_expense(&db, food, dec!(50));
    add_expense(&db, food, dec!(25));

    let removed = db.delete_category(food, DeletePolicy::Orphan).unwrap();
    assert_eq!(removed, 0);
    assert!(db.get_categories().unwrap().is_empty());

    let left = db.get_expenses(food).unwrap();
    assert_eq!(left.len(), 2);
    assert!(left.iter().all(|e| e.category_id == food));
    assert_eq!(db.total_spent(food).unwrap(), dec!(75));
    assert_eq!(db.get_orphaned_expenses().unwrap().len(), 2);
}

#[test]
fn test_delete_cascade_removes_expenses() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let rent = add_category(&db, "Rent", dec!(900));
    add_expense(&db, food, dec!(50));
    add_expense(&db, food, dec!(25));
    add_expense(&db, rent, dec!(900));

    let removed = db.delete_category(food, DeletePolicy::Cascade).unwrap();
    assert_eq!(removed, 2);
    assert!(db.get_expenses(food).unwrap().is_empty());
    assert_eq!(db.get_expenses(rent).unwrap().len(), 1);
    assert!(db.get_orphaned_expenses().unwrap().is_empty());
}

// ── Expenses ──────────────────────────────────────────────────

#[test]
fn test_expense_roundtrip_fields() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let mut exp = Expense::new(food, dec!(12.34), "groceries".into());
    exp.timestamp = "2024-03-01 09:15:00".into();
    let id = db.insert_expense(&exp).unwrap();

    let stored = db.get_expenses(food).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, Some(id));
    assert_eq!(stored[0].amount, dec!(12.34));
    assert_eq!(stored[0].details, "groceries");
    assert_eq!(stored[0].timestamp, "2024-03-01 09:15:00");
    assert!(stored[0].receipt.is_none());
}

#[test]
fn test_expenses_filtered_by_category() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let gas = add_category(&db, "Gas", dec!(60));
    add_expense(&db, food, dec!(1));
    add_expense(&db, gas, dec!(2));
    add_expense(&db, food, dec!(3));

    assert_eq!(db.get_expenses(food).unwrap().len(), 2);
    assert_eq!(db.get_expenses(gas).unwrap().len(), 1);
    assert_eq!(db.get_all_expenses().unwrap().len(), 3);
}

#[test]
fn test_expenses_ordered_by_timestamp() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    for (ts, details) in [
        ("2024-03-05 10:00:00", "later"),
        ("2024-03-01 10:00:00", "earlier"),
    ] {
        let mut exp = Expense::new(food, dec!(1), details.into());
        exp.timestamp = ts.into();
        db.insert_expense(&exp).unwrap();
    }
    let details: Vec<String> = db
        .get_expenses(food)
        .unwrap()
        .into_iter()
        .map(|e| e.details)
        .collect();
    assert_eq!(details, vec!["earlier", "later"]);
}

#[test]
fn test_zero_expense_allowed_negative_rejected() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    add_expense(&db, food, Decimal::ZERO);
    assert!(db
        .insert_expense(&Expense::new(food, dec!(-0.01), String::new()))
        .is_err());
    assert_eq!(db.get_expenses(food).unwrap().len(), 1);
}

#[test]
fn test_receipt_stored_verbatim() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let receipt = Receipt::from_bytes(PNG_BYTES.to_vec()).unwrap();
    let id = db
        .insert_expense(&Expense::new(food, dec!(5), "snack".into()).with_receipt(receipt))
        .unwrap();

    let fetched = db.get_expense_receipt(id).unwrap().unwrap();
    assert_eq!(fetched.format(), ReceiptFormat::Png);
    assert_eq!(fetched.bytes(), PNG_BYTES);

    let listed = db.get_expenses(food).unwrap();
    assert_eq!(listed[0].receipt.as_ref().unwrap().bytes(), PNG_BYTES);
}

#[test]
fn test_receipt_missing() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let id = add_expense(&db, food, dec!(5));
    assert!(db.get_expense_receipt(id).unwrap().is_none());
    assert!(db.get_expense_receipt(9999).unwrap().is_none());
}

// ── Totals ────────────────────────────────────────────────────

#[test]
fn test_total_spent_zero_when_no_expenses() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    assert_eq!(db.total_spent(food).unwrap(), Decimal::ZERO);
    assert_eq!(db.total_spent(12345).unwrap(), Decimal::ZERO);
}

#[test]
fn test_expense_increases_spent_by_exact_amount() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    add_expense(&db, food, dec!(0.1));
    let before = db.total_spent(food).unwrap();
    add_expense(&db, food, dec!(0.2));
    assert_eq!(db.total_spent(food).unwrap() - before, dec!(0.2));
    assert_eq!(db.total_spent(food).unwrap(), dec!(0.3));
}

#[test]
fn test_total_budgeted_sums_budgets_not_spend() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    add_category(&db, "Rent", dec!(900.50));
    add_expense(&db, food, dec!(999));
    assert_eq!(db.total_budgeted().unwrap(), dec!(1100.50));
}

#[test]
fn test_total_budgeted_empty() {
    let (_dir, db) = temp_db();
    assert_eq!(db.total_budgeted().unwrap(), Decimal::ZERO);
}

#[test]
fn test_remaining_matches_budget_minus_spent() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let gas = add_category(&db, "Gas", dec!(60));
    add_expense(&db, food, dec!(50));
    add_expense(&db, gas, dec!(75));

    for cat in db.get_categories().unwrap() {
        let spent = db.total_spent(cat.id.unwrap()).unwrap();
        assert_eq!(db.remaining(&cat).unwrap(), cat.budget - spent);
    }
    let gas_cat = db.get_category_by_id(gas).unwrap().unwrap();
    assert_eq!(db.remaining(&gas_cat).unwrap(), dec!(-15));
}

#[test]
fn test_remaining_for_unsaved_category_is_budget() {
    let (_dir, db) = temp_db();
    let cat = Category::new("Draft".into(), dec!(40));
    assert_eq!(db.remaining(&cat).unwrap(), dec!(40));
}

#[test]
fn test_food_scenario() {
    let (_dir, db) = temp_db();
    db.set_total_money(dec!(1000)).unwrap();
    let food = add_category(&db, "Food", dec!(200));
    assert_eq!(db.available_money().unwrap(), dec!(800));

    add_expense(&db, food, dec!(50));
    let cat = db.get_category_by_id(food).unwrap().unwrap();
    assert_eq!(db.total_spent(food).unwrap(), dec!(50));
    assert_eq!(db.remaining(&cat).unwrap(), dec!(150));
    // Available money tracks budgets, not spend.
    assert_eq!(db.available_money().unwrap(), dec!(800));
}

#[test]
fn test_budget_update_recalculates_remaining() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    add_expense(&db, food, dec!(50));
    db.update_category_budget(food, dec!(300)).unwrap();

    let cat = db.get_category_by_id(food).unwrap().unwrap();
    assert_eq!(db.remaining(&cat).unwrap(), dec!(250));
    let expenses = db.get_expenses(food).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, dec!(50));
}

#[test]
fn test_available_money_can_go_negative() {
    let (_dir, db) = temp_db();
    db.set_total_money(dec!(100)).unwrap();
    add_category(&db, "Rent", dec!(900));
    assert_eq!(db.available_money().unwrap(), dec!(-800));
}

#[test]
fn test_category_summaries() {
    let (_dir, db) = temp_db();
    let food = add_category(&db, "Food", dec!(200));
    let fun = add_category(&db, "Fun", dec!(20));
    add_expense(&db, food, dec!(50));
    add_expense(&db, fun, dec!(30));

    let summaries = db.category_summaries().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].category.id, Some(food));
    assert_eq!(summaries[0].spent, dec!(50));
    assert_eq!(summaries[0].remaining(), dec!(150));
    assert!(summaries[1].is_over_budget());
}

#[test]
fn test_deleted_category_drops_out_of_totals() {
    let (_dir, db) = temp_db();
    db.set_total_money(dec!(1000)).unwrap();
    let food = add_category(&db, "Food", dec!(200));
    add_category(&db, "Rent", dec!(500));
    db.delete_category(food, DeletePolicy::Orphan).unwrap();
    assert_eq!(db.total_budgeted().unwrap(), dec!(500));
    assert_eq!(db.available_money().unwrap(), dec!(500));
    assert_eq!(db.category_summaries().unwrap().len(), 1);
}

#[test]
fn test_total_budgeted_overflow_is_an_error() {
    let (_dir, db) = temp_db();
    add_category(&db, "Big", Decimal::MAX);
    add_category(&db, "Bigger", Decimal::MAX);
    let err = db.total_budgeted().unwrap_err();
    assert!(err.to_string().contains("overflowed"));
    assert!(db.available_money().is_err());
}

#[test]
fn test_total_spent_overflow_is_an_error() {
    let (_dir, db) = temp_db();
    let cat = add_category(&db, "Big", dec!(1));
    add_expense(&db, cat, Decimal::MAX);
    add_expense(&db, cat, Decimal::MAX);
    let err = db.total_spent(cat).unwrap_err();
    assert!(err.to_string().contains("overflowed"));
    assert!(db.category_summaries().is_err());
    assert!(crate::state::AppState::load(&db).is_err());
}
