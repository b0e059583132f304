#![allow(clippy::unwrap_used)]

use super::app::App;
use super::commands::handle_command;
use crate::db::Database;

fn setup() -> (App, Database) {
    let db = Database::open_in_memory().unwrap();
    let mut app = App::new();
    app.refresh_all(&db).unwrap();
    (app, db)
}

// ── :month ────────────────────────────────────────────────────

#[test]
fn test_month_full_form() {
    let (mut app, mut db) = setup();
    handle_command("month 2024-03", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, "2024-03");
}

#[test]
fn test_month_short_form_zero_padded() {
    let (mut app, mut db) = setup();
    handle_command("m 2024-1", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, "2024-01");
}

#[test]
fn test_month_digit_only_uses_current_year() {
    let (mut app, mut db) = setup();
    handle_command("month 2024-06", &mut app, &mut db).unwrap();
    handle_command("m 9", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, "2024-09");
}

#[test]
fn test_month_no_args_resets_to_today() {
    let (mut app, mut db) = setup();
    handle_command("month 2020-01", &mut app, &mut db).unwrap();
    handle_command("m", &mut app, &mut db).unwrap();
    let today = chrono::Local::now().format("%Y-%m").to_string();
    assert_eq!(app.current_month, today);
}

#[test]
fn test_month_invalid_leaves_month_unchanged() {
    let (mut app, mut db) = setup();
    handle_command("month 2024-04", &mut app, &mut db).unwrap();
    handle_command("month 2024-13", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month, "2024-04");
    assert!(app.status_message.contains("Invalid month"));
}

// ── unknown commands ──────────────────────────────────────────

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut db) = setup();
    handle_command("budgett", &mut app, &mut db).unwrap();
    assert!(app.status_message.contains("Did you mean"));
}
