/// Full schema at CURRENT_VERSION, applied in one batch to fresh databases.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id                 TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    amount             TEXT NOT NULL,
    category           TEXT NOT NULL,
    tags               TEXT NOT NULL DEFAULT '[]',
    date               TEXT NOT NULL,
    created_at         TEXT NOT NULL DEFAULT '',
    updated_at         TEXT NOT NULL DEFAULT '',
    notes              TEXT NOT NULL DEFAULT '',
    payment_method     TEXT NOT NULL DEFAULT 'Card',
    is_tax_deductible  BOOLEAN NOT NULL DEFAULT 0,
    receipt            BLOB,
    receipt_key        TEXT
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

-- No UNIQUE(category, month_period): the rename cascade relabels budgets and
-- may produce two rows for the same pair.
CREATE TABLE IF NOT EXISTS budgets (
    id            TEXT PRIMARY KEY,
    category      TEXT NOT NULL,
    limit_amount  TEXT NOT NULL,
    month_period  TEXT NOT NULL,
    created_at    TEXT NOT NULL DEFAULT '',
    updated_at    TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_budgets_category ON budgets(category);
CREATE INDEX IF NOT EXISTS idx_budgets_period ON budgets(category, month_period);

"#;

pub(crate) const CURRENT_VERSION: i32 = 2;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // v1 databases predate created/updated timestamps on expenses and
    // budgets. Missing expense timestamps are backfilled from the
    // transaction date on open (see Database::backfill_expense_timestamps).
    (
        1,
        "ALTER TABLE expenses ADD COLUMN created_at TEXT NOT NULL DEFAULT '';
         ALTER TABLE expenses ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
         ALTER TABLE budgets ADD COLUMN created_at TEXT NOT NULL DEFAULT '';
         ALTER TABLE budgets ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';",
    ),
];
