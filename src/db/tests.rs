#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn make_expense(name: &str, category: &str, date: &str, amount: Decimal) -> Expense {
    Expense {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.into(),
        amount,
        category: category.into(),
        tags: Vec::new(),
        date: date.into(),
        created_at: format!("{date}T12:00:00+00:00"),
        updated_at: format!("{date}T12:00:00+00:00"),
        notes: String::new(),
        payment_method: PaymentMethod::Card,
        is_tax_deductible: false,
        receipt: None,
        receipt_key: None,
    }
}

fn setup_test_data(db: &Database) {
    let expenses = [
        make_expense("Coffee", "Food", "2024-05-02", dec!(4.50)),
        make_expense("Groceries", "Food", "2024-05-10", dec!(87.25)),
        make_expense("Bus pass", "Transport", "2024-05-01", dec!(49.00)),
        make_expense("Rent", "Housing", "2024-06-01", dec!(1200.00)),
    ];
    for e in &expenses {
        db.insert_expense(e).unwrap();
    }
}

// ── Registry / settings ───────────────────────────────────────

#[test]
fn test_default_registry_seeded() {
    let db = Database::open_in_memory().unwrap();
    let registry = db.load_registry().unwrap();
    assert!(registry.contains(SYSTEM_CATEGORY));
    assert!(registry.contains("Food"));
    assert_eq!(registry.categories[0], SYSTEM_CATEGORY);
}

#[test]
fn test_registry_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let mut registry = db.load_registry().unwrap();
    registry.categories.push("Pets".into());
    registry.icons.insert("Pets".into(), "Heart".into());
    db.save_registry(&registry).unwrap();
    assert_eq!(db.load_registry().unwrap(), registry);
}

#[test]
fn test_setting_overwrite() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_setting("currency").unwrap().is_none());
    db.put_setting("currency", "USD").unwrap();
    db.put_setting("currency", "EUR").unwrap();
    assert_eq!(db.get_setting("currency").unwrap().as_deref(), Some("EUR"));
}

// ── Expense CRUD ──────────────────────────────────────────────

#[test]
fn test_expense_insert_and_query() {
    let db = Database::open_in_memory().unwrap();
    let mut expense = make_expense("Lunch", "Food", "2024-05-15", dec!(12.50));
    expense.tags = vec!["work".into()];
    expense.notes = "client meeting".into();
    db.insert_expense(&expense).unwrap();

    let fetched = db.get_expense_by_id(&expense.id).unwrap().unwrap();
    assert_eq!(fetched.name, "Lunch");
    assert_eq!(fetched.amount, dec!(12.50));
    assert_eq!(fetched.tags, vec!["work".to_string()]);
    assert_eq!(fetched.payment_method, PaymentMethod::Card);

    assert!(db.get_expense_by_id("no-such-id").unwrap().is_none());
}

#[test]
fn test_expense_filters() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let may = db.get_expenses(None, None, None, Some("2024-05")).unwrap();
    assert_eq!(may.len(), 3);

    let food = db.get_expenses(None, Some("Food"), None, None).unwrap();
    assert_eq!(food.len(), 2);

    let search = db.get_expenses(None, None, Some("coffee"), None).unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].name, "Coffee");

    let none = db.get_expenses(None, None, Some("zzz"), None).unwrap();
    assert!(none.is_empty());

    let limited = db.get_expenses(Some(2), None, None, None).unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn test_expense_ordering() {
    // Date descending, then created_at descending for same-day entries.
    let db = Database::open_in_memory().unwrap();
    let mut first = make_expense("Breakfast", "Food", "2024-05-10", dec!(8));
    first.created_at = "2024-05-10T08:00:00+00:00".into();
    let mut second = make_expense("Dinner", "Food", "2024-05-10", dec!(30));
    second.created_at = "2024-05-10T20:00:00+00:00".into();
    let older = make_expense("Taxi", "Transport", "2024-05-01", dec!(15));

    db.insert_expense(&first).unwrap();
    db.insert_expense(&older).unwrap();
    db.insert_expense(&second).unwrap();

    let all = db.get_expenses(None, None, None, None).unwrap();
    let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Dinner", "Breakfast", "Taxi"]);
}

#[test]
fn test_expense_update() {
    let db = Database::open_in_memory().unwrap();
    let mut expense = make_expense("Lunch", "Food", "2024-05-15", dec!(12.50));
    db.insert_expense(&expense).unwrap();

    expense.name = "Team lunch".into();
    expense.amount = dec!(48.00);
    expense.is_tax_deductible = true;
    expense.updated_at = "2024-05-16T09:00:00+00:00".into();
    db.update_expense(&expense).unwrap();

    let fetched = db.get_expense_by_id(&expense.id).unwrap().unwrap();
    assert_eq!(fetched.name, "Team lunch");
    assert_eq!(fetched.amount, dec!(48.00));
    assert!(fetched.is_tax_deductible);
    assert_eq!(fetched.updated_at, "2024-05-16T09:00:00+00:00");
}

#[test]
fn test_expense_category_update_touches_nothing_else() {
    let db = Database::open_in_memory().unwrap();
    let expense = make_expense("Lunch", "Food", "2024-05-15", dec!(12.50));
    db.insert_expense(&expense).unwrap();

    db.update_expense_category(&expense.id, "Dining").unwrap();

    let fetched = db.get_expense_by_id(&expense.id).unwrap().unwrap();
    assert_eq!(fetched.category, "Dining");
    assert_eq!(fetched.name, "Lunch");
    assert_eq!(fetched.amount, dec!(12.50));
    assert_eq!(fetched.updated_at, expense.updated_at);
}

#[test]
fn test_expense_delete() {
    let db = Database::open_in_memory().unwrap();
    let expense = make_expense("Lunch", "Food", "2024-05-15", dec!(12.50));
    db.insert_expense(&expense).unwrap();
    assert_eq!(db.get_expense_count().unwrap(), 1);

    db.delete_expense(&expense.id).unwrap();
    assert_eq!(db.get_expense_count().unwrap(), 0);
}

#[test]
fn test_expense_receipt_blob_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let mut expense = make_expense("Printer", "Housing", "2024-05-20", dec!(99));
    expense.receipt = Some(vec![0xFF, 0xD8, 0xFF, 0xE0]);
    expense.receipt_key = Some("receipts/abc.jpg".into());
    db.insert_expense(&expense).unwrap();

    let fetched = db.get_expense_by_id(&expense.id).unwrap().unwrap();
    assert_eq!(fetched.receipt.as_deref(), Some(&[0xFF, 0xD8, 0xFF, 0xE0][..]));
    assert_eq!(fetched.receipt_key.as_deref(), Some("receipts/abc.jpg"));
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_crud() {
    let db = Database::open_in_memory().unwrap();
    let budget = Budget::new("Food".into(), "2024-05".into(), dec!(500));
    db.insert_budget(&budget).unwrap();

    let found = db.find_budget("Food", "2024-05").unwrap().unwrap();
    assert_eq!(found.id, budget.id);
    assert_eq!(found.limit_amount, dec!(500));
    assert!(db.find_budget("Food", "2024-06").unwrap().is_none());

    db.update_budget_limit(&budget.id, dec!(650), "2024-05-02T00:00:00+00:00")
        .unwrap();
    let updated = db.find_budget("Food", "2024-05").unwrap().unwrap();
    assert_eq!(updated.limit_amount, dec!(650));

    db.delete_budget(&budget.id).unwrap();
    assert!(db.get_budgets("2024-05").unwrap().is_empty());
}

#[test]
fn test_budget_duplicate_pairs_allowed() {
    // The rename cascade may relabel a budget onto an existing pair; the
    // table has no unique constraint by design.
    let db = Database::open_in_memory().unwrap();
    let mut older = Budget::new("Food".into(), "2024-05".into(), dec!(300));
    older.created_at = "2024-01-01T00:00:00+00:00".into();
    let newer = Budget::new("Food".into(), "2024-05".into(), dec!(200));
    db.insert_budget(&older).unwrap();
    db.insert_budget(&newer).unwrap();

    assert_eq!(db.get_budgets("2024-05").unwrap().len(), 2);
    // find_budget resolves duplicates to the oldest record.
    let found = db.find_budget("Food", "2024-05").unwrap().unwrap();
    assert_eq!(found.id, older.id);
}

#[test]
fn test_budgets_by_category() {
    let db = Database::open_in_memory().unwrap();
    db.insert_budget(&Budget::new("Food".into(), "2024-05".into(), dec!(500)))
        .unwrap();
    db.insert_budget(&Budget::new("Food".into(), "2024-06".into(), dec!(550)))
        .unwrap();
    db.insert_budget(&Budget::new("Transport".into(), "2024-05".into(), dec!(100)))
        .unwrap();

    assert_eq!(db.get_budgets_by_category("Food").unwrap().len(), 2);
    assert_eq!(db.get_all_budgets().unwrap().len(), 3);
}

// ── Analytics ─────────────────────────────────────────────────

#[test]
fn test_spending_by_category() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let spending = db.get_spending_by_category("2024-05").unwrap();
    assert_eq!(spending.len(), 2);
    // Sorted by total descending.
    assert_eq!(spending[0].0, "Food");
    assert_eq!(spending[0].1, dec!(91.75));
    assert_eq!(spending[1].0, "Transport");
    assert_eq!(spending[1].1, dec!(49.00));
}

#[test]
fn test_monthly_totals() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let (total, count) = db.get_monthly_totals("2024-05").unwrap();
    assert_eq!(total, dec!(140.75));
    assert_eq!(count, 3);

    let (empty_total, empty_count) = db.get_monthly_totals("2023-01").unwrap();
    assert_eq!(empty_total, Decimal::ZERO);
    assert_eq!(empty_count, 0);
}

#[test]
fn test_monthly_trend() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let trend = db.get_monthly_trend(12).unwrap();
    assert_eq!(trend.len(), 2);
    // Oldest first.
    assert_eq!(trend[0].0, "2024-05");
    assert_eq!(trend[1].0, "2024-06");
    assert_eq!(trend[1].1, dec!(1200.00));
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_to_csv() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    let count = db
        .export_to_csv(path.to_str().unwrap(), Some("2024-05"))
        .unwrap();
    assert_eq!(count, 3);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("date,name,category,amount"));
    assert!(contents.contains("Groceries"));
    assert!(!contents.contains("Rent"));
}

#[test]
fn test_export_empty_month() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    let count = db
        .export_to_csv(path.to_str().unwrap(), Some("2023-01"))
        .unwrap();
    assert_eq!(count, 0);
    assert!(!path.exists());
}

// ── Persistence / migration ───────────────────────────────────

#[test]
fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendtui.db");

    {
        let db = Database::open(&path).unwrap();
        db.insert_expense(&make_expense("Lunch", "Food", "2024-05-15", dec!(12.50)))
            .unwrap();
        let mut registry = db.load_registry().unwrap();
        registry.categories.push("Pets".into());
        db.save_registry(&registry).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_expense_count().unwrap(), 1);
    assert!(db.load_registry().unwrap().contains("Pets"));
}

#[test]
fn test_migration_from_v1() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    // Hand-build a v1 database: no created/updated columns yet.
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER NOT NULL);
             CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             CREATE TABLE expenses (
                 id TEXT PRIMARY KEY,
                 name TEXT NOT NULL,
                 amount TEXT NOT NULL,
                 category TEXT NOT NULL,
                 tags TEXT NOT NULL DEFAULT '[]',
                 date TEXT NOT NULL,
                 notes TEXT NOT NULL DEFAULT '',
                 payment_method TEXT NOT NULL DEFAULT 'Card',
                 is_tax_deductible BOOLEAN NOT NULL DEFAULT 0,
                 receipt BLOB,
                 receipt_key TEXT
             );
             CREATE TABLE budgets (
                 id TEXT PRIMARY KEY,
                 category TEXT NOT NULL,
                 limit_amount TEXT NOT NULL,
                 month_period TEXT NOT NULL
             );
             INSERT INTO schema_version (version) VALUES (1);
             INSERT INTO expenses (id, name, amount, category, date)
                 VALUES ('e1', 'Old lunch', '9.50', 'Food', '2023-11-04');",
        )
        .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let expense = db.get_expense_by_id("e1").unwrap().unwrap();
    // Timestamps backfilled from the transaction date.
    assert_eq!(expense.created_at, "2023-11-04T00:00:00+00:00");
    assert_eq!(expense.updated_at, expense.created_at);
    assert_eq!(expense.amount, dec!(9.50));
}
