#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::Expense;
use rust_decimal_macros::dec;

fn registry_of(names: &[&str], icons: &[(&str, &str)]) -> Registry {
    Registry {
        categories: names.iter().map(|s| s.to_string()).collect(),
        icons: icons
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn setup(names: &[&str], icons: &[(&str, &str)]) -> (Database, Registry) {
    let db = Database::open_in_memory().unwrap();
    let registry = registry_of(names, icons);
    db.save_registry(&registry).unwrap();
    (db, registry)
}

fn expense_in(db: &Database, category: &str) -> Expense {
    let e = Expense::new("Lunch".into(), dec!(12.50), category.into(), "2024-05-10".into());
    db.insert_expense(&e).unwrap();
    e
}

fn budget_in(db: &Database, category: &str, month: &str, limit: rust_decimal::Decimal) -> Budget {
    let b = Budget::new(category.into(), month.into(), limit);
    db.insert_budget(&b).unwrap();
    b
}

// ── Rename ────────────────────────────────────────────────────

#[test]
fn test_rename_pure() {
    let (db, registry) = setup(&["Food", "Transport"], &[("Food", "Utensils")]);
    expense_in(&db, "Food");
    budget_in(&db, "Food", "2024-05", dec!(500));

    let next = rename(&db, "Food", "Dining", &registry).unwrap();

    assert_eq!(next.categories, vec!["Dining", "Transport"]);
    assert_eq!(next.icons.get("Dining").map(String::as_str), Some("Utensils"));
    assert!(!next.icons.contains_key("Food"));

    let expenses = db.get_expenses(None, None, None, None).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category, "Dining");

    let budgets = db.get_budgets("2024-05").unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].category, "Dining");
    assert_eq!(budgets[0].limit_amount, dec!(500));
    assert_eq!(budgets[0].month_period, "2024-05");
}

#[test]
fn test_rename_preserves_position() {
    let (db, registry) = setup(&["Rent", "Food", "Travel"], &[]);
    let next = rename(&db, "Food", "Groceries", &registry).unwrap();
    assert_eq!(next.categories, vec!["Rent", "Groceries", "Travel"]);
}

#[test]
fn test_rename_without_icon_gets_default() {
    let (db, registry) = setup(&["Food"], &[]);
    let next = rename(&db, "Food", "Dining", &registry).unwrap();
    assert_eq!(next.icons.get("Dining").map(String::as_str), Some(DEFAULT_ICON));
}

#[test]
fn test_rename_merge() {
    let (db, registry) = setup(
        &["Food", "Dining"],
        &[("Food", "Utensils"), ("Dining", "Coffee")],
    );
    let next = rename(&db, "Food", "Dining", &registry).unwrap();

    // Merge: no duplicate entry, target keeps its own icon.
    assert_eq!(next.categories, vec!["Dining"]);
    assert_eq!(next.icons.get("Dining").map(String::as_str), Some("Coffee"));
    assert!(!next.icons.contains_key("Food"));
}

#[test]
fn test_rename_merge_cascades_records() {
    let (db, registry) = setup(&["Food", "Dining"], &[]);
    expense_in(&db, "Food");
    expense_in(&db, "Dining");

    rename(&db, "Food", "Dining", &registry).unwrap();

    let expenses = db.get_expenses(None, None, None, None).unwrap();
    assert_eq!(expenses.len(), 2);
    assert!(expenses.iter().all(|e| e.category == "Dining"));
}

#[test]
fn test_rename_merge_keeps_duplicate_budgets() {
    // Relabeling into an existing pair is reproduced as observed: the two
    // budget records are not merged.
    let (db, registry) = setup(&["Food", "Dining"], &[]);
    budget_in(&db, "Food", "2024-05", dec!(300));
    budget_in(&db, "Dining", "2024-05", dec!(200));

    rename(&db, "Food", "Dining", &registry).unwrap();

    let budgets = db.get_budgets("2024-05").unwrap();
    assert_eq!(budgets.len(), 2);
    assert!(budgets.iter().all(|b| b.category == "Dining"));
    let mut limits: Vec<_> = budgets.iter().map(|b| b.limit_amount).collect();
    limits.sort();
    assert_eq!(limits, vec![dec!(200), dec!(300)]);
}

#[test]
fn test_rename_invalid_args() {
    let (db, registry) = setup(&["Food"], &[("Food", "Utensils")]);
    expense_in(&db, "Food");

    assert!(rename(&db, "", "Dining", &registry).is_err());
    assert!(rename(&db, "Food", "", &registry).is_err());
    assert!(rename(&db, "Food", "Food", &registry).is_err());

    // Nothing was mutated.
    assert_eq!(db.load_registry().unwrap(), registry);
    let expenses = db.get_expenses(None, None, None, None).unwrap();
    assert_eq!(expenses[0].category, "Food");
}

#[test]
fn test_rename_sentinel_rejected() {
    let (db, registry) = setup(&[SYSTEM_CATEGORY, "Food"], &[]);
    assert!(rename(&db, SYSTEM_CATEGORY, "Misc", &registry).is_err());
    assert_eq!(db.load_registry().unwrap(), registry);
}

#[test]
fn test_rename_persists_registry() {
    let (db, registry) = setup(&["Food"], &[("Food", "Utensils")]);
    let next = rename(&db, "Food", "Dining", &registry).unwrap();
    assert_eq!(db.load_registry().unwrap(), next);
}

// ── Delete ────────────────────────────────────────────────────

#[test]
fn test_delete_moves_expenses_to_sentinel() {
    let (db, registry) = setup(&["Food", "Transport"], &[("Food", "Utensils")]);
    expense_in(&db, "Food");
    budget_in(&db, "Food", "2024-05", dec!(500));

    let next = delete(&db, "Food", &registry).unwrap();

    assert_eq!(next.categories, vec!["Transport"]);
    assert!(!next.icons.contains_key("Food"));

    let expenses = db.get_expenses(None, None, None, None).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category, SYSTEM_CATEGORY);

    // Budgets do not transfer to the sentinel; they are removed.
    assert!(db.get_budgets("2024-05").unwrap().is_empty());
}

#[test]
fn test_delete_only_touches_target_category() {
    let (db, registry) = setup(&["Food", "Transport"], &[]);
    expense_in(&db, "Food");
    expense_in(&db, "Transport");
    budget_in(&db, "Transport", "2024-05", dec!(100));

    delete(&db, "Food", &registry).unwrap();

    let kept = db.get_expenses_by_category("Transport").unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(db.get_budgets("2024-05").unwrap().len(), 1);
}

#[test]
fn test_delete_sentinel_noop() {
    let (db, registry) = setup(&[SYSTEM_CATEGORY, "Food"], &[("Food", "Utensils")]);
    expense_in(&db, SYSTEM_CATEGORY);
    budget_in(&db, SYSTEM_CATEGORY, "2024-05", dec!(50));

    let next = delete(&db, SYSTEM_CATEGORY, &registry).unwrap();

    assert_eq!(next, registry);
    assert_eq!(db.get_expenses(None, None, None, None).unwrap().len(), 1);
    assert_eq!(db.get_budgets("2024-05").unwrap().len(), 1);
}

#[test]
fn test_delete_persists_registry() {
    let (db, registry) = setup(&["Food", "Transport"], &[]);
    let next = delete(&db, "Food", &registry).unwrap();
    assert_eq!(db.load_registry().unwrap(), next);
}

// ── Create ────────────────────────────────────────────────────

#[test]
fn test_create_appends() {
    let (db, registry) = setup(&["Food"], &[]);
    let next = create(&db, "Travel", "Plane", &registry).unwrap();
    assert_eq!(next.categories, vec!["Food", "Travel"]);
    assert_eq!(next.icons.get("Travel").map(String::as_str), Some("Plane"));
    assert_eq!(db.load_registry().unwrap(), next);
}

#[test]
fn test_create_existing_is_noop() {
    let (db, registry) = setup(&["Food"], &[("Food", "Utensils")]);
    let next = create(&db, "Food", "Coffee", &registry).unwrap();
    assert_eq!(next, registry);
    // Icon unchanged by the rejected create.
    assert_eq!(next.icons.get("Food").map(String::as_str), Some("Utensils"));
}

#[test]
fn test_create_empty_name_rejected() {
    let (db, registry) = setup(&["Food"], &[]);
    assert!(create(&db, "", "Tag", &registry).is_err());
}

#[test]
fn test_set_icon() {
    let (db, registry) = setup(&["Food"], &[("Food", "Utensils")]);
    let next = set_icon(&db, "Food", "Coffee", &registry).unwrap();
    assert_eq!(next.icons.get("Food").map(String::as_str), Some("Coffee"));
    assert_eq!(db.load_registry().unwrap(), next);
}

// ── Budget upsert ─────────────────────────────────────────────

#[test]
fn test_upsert_budget_inserts_then_updates() {
    let db = Database::open_in_memory().unwrap();

    let first = upsert_budget(&db, "Food", "2024-05", dec!(400)).unwrap();
    let second = upsert_budget(&db, "Food", "2024-05", dec!(550)).unwrap();

    assert_eq!(first.id, second.id);
    let budgets = db.get_budgets("2024-05").unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].limit_amount, dec!(550));
}

#[test]
fn test_upsert_budget_idempotent() {
    let db = Database::open_in_memory().unwrap();

    upsert_budget(&db, "Food", "2024-05", dec!(400)).unwrap();
    upsert_budget(&db, "Food", "2024-05", dec!(400)).unwrap();

    let budgets = db.get_budgets("2024-05").unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].limit_amount, dec!(400));
}

#[test]
fn test_upsert_budget_distinct_pairs() {
    let db = Database::open_in_memory().unwrap();

    upsert_budget(&db, "Food", "2024-05", dec!(400)).unwrap();
    upsert_budget(&db, "Food", "2024-06", dec!(450)).unwrap();
    upsert_budget(&db, "Transport", "2024-05", dec!(120)).unwrap();

    assert_eq!(db.get_budgets("2024-05").unwrap().len(), 2);
    assert_eq!(db.get_budgets("2024-06").unwrap().len(), 1);
}
