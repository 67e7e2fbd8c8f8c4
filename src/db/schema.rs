// Money columns are TEXT holding rust_decimal strings.
// expenses.category_id is not enforced (foreign_keys stays off): deleting a
// category leaves its expenses in place unless the cascade policy is used.
pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    budget  TEXT NOT NULL DEFAULT '0'
);

CREATE TABLE IF NOT EXISTS total_money (
    id      INTEGER PRIMARY KEY CHECK (id = 1),
    total   TEXT NOT NULL DEFAULT '0'
);

CREATE TABLE IF NOT EXISTS expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    amount      TEXT NOT NULL,
    details     TEXT NOT NULL DEFAULT '',
    timestamp   TEXT NOT NULL,
    receipt     BLOB
);

CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);

INSERT OR IGNORE INTO total_money (id, total) VALUES (1, '0');
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
