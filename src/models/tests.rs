#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

#[test]
fn test_payment_method_roundtrip() {
    for method in PaymentMethod::all() {
        assert_eq!(PaymentMethod::parse(method.as_str()), *method);
    }
}

#[test]
fn test_payment_method_parse_aliases() {
    assert_eq!(PaymentMethod::parse("CASH"), PaymentMethod::Cash);
    assert_eq!(PaymentMethod::parse("credit"), PaymentMethod::Card);
    assert_eq!(PaymentMethod::parse("bank transfer"), PaymentMethod::Transfer);
    assert_eq!(PaymentMethod::parse("crypto"), PaymentMethod::Other);
    assert_eq!(PaymentMethod::parse(""), PaymentMethod::Other);
}

#[test]
fn test_expense_new_defaults() {
    let e = Expense::new("Lunch".into(), dec!(12.50), "Food".into(), "2024-05-10".into());
    assert!(!e.id.is_empty());
    assert_eq!(e.payment_method, PaymentMethod::Card);
    assert!(e.tags.is_empty());
    assert!(!e.is_tax_deductible);
    assert_eq!(e.created_at, e.updated_at);

    let other = Expense::new("Lunch".into(), dec!(12.50), "Food".into(), "2024-05-10".into());
    assert_ne!(e.id, other.id);
}

#[test]
fn test_expense_backup_json_omits_receipt() {
    let mut e = Expense::new("Lunch".into(), dec!(12.50), "Food".into(), "2024-05-10".into());
    e.receipt = Some(vec![1, 2, 3]);
    e.receipt_key = Some("receipts/abc.jpg".into());

    let json = serde_json::to_string(&e).unwrap();
    assert!(!json.contains("\"receipt\":"));
    assert!(json.contains("receipts/abc.jpg"));
}

#[test]
fn test_budget_new() {
    let b = Budget::new("Food".into(), "2024-05".into(), dec!(500));
    assert!(!b.id.is_empty());
    assert_eq!(b.month_period, "2024-05");
    assert_eq!(b.limit_amount, dec!(500));
    assert_eq!(b.created_at, b.updated_at);
}

#[test]
fn test_registry_defaults() {
    let r = Registry::with_defaults();
    assert_eq!(r.categories.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(r.categories[0], SYSTEM_CATEGORY);
    assert!(r.contains("Food"));
    assert!(r.icons.is_empty());
}

#[test]
fn test_registry_contains_is_case_sensitive() {
    let r = Registry::with_defaults();
    assert!(r.contains("Food"));
    assert!(!r.contains("food"));
}

#[test]
fn test_registry_icon_fallback() {
    let mut r = Registry::with_defaults();
    r.icons.insert("Food".into(), "Utensils".into());
    r.icons.insert("Health".into(), "NotAnIcon".into());

    assert_eq!(r.icon_for("Food"), "Utensils");
    // Unknown identifier and missing entry both fall back.
    assert_eq!(r.icon_for("Health"), DEFAULT_ICON);
    assert_eq!(r.icon_for("Transport"), DEFAULT_ICON);
}
