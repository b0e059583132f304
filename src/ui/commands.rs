use std::collections::HashMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use std::str::FromStr;

use super::app::{App, EditTarget, InputMode, PendingAction, Screen};
use crate::categories;
use crate::db::Database;
use crate::models::{now_rfc3339, Expense, PaymentMethod, DEFAULT_ICON, ICON_SET, SYSTEM_CATEGORY};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SpendTUI", cmd_quit, r);
    register_command!("quit", "Quit SpendTUI", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("c", "Go to Categories", cmd_categories, r);
    register_command!("categories", "Go to Categories", cmd_categories, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 2024-01-15 Coffee 4.50)",
        cmd_add,
        r
    );
    register_command!(
        "delete-expense",
        "Delete selected expense",
        cmd_delete_expense,
        r
    );
    register_command!(
        "rename",
        "Rename selected expense or category",
        cmd_rename,
        r
    );
    register_command!(
        "recat",
        "Re-categorize selected expense (e.g. :recat Food)",
        cmd_recat,
        r
    );
    register_command!(
        "tax",
        "Toggle tax-deductible on selected expense",
        cmd_tax,
        r
    );
    register_command!(
        "pay",
        "Set payment method on selected expense (e.g. :pay cash)",
        cmd_pay,
        r
    );
    register_command!(
        "category",
        "Create category (e.g. :category Travel Plane)",
        cmd_category,
        r
    );
    register_command!(
        "icon",
        "Set icon of selected category (e.g. :icon Coffee)",
        cmd_icon,
        r
    );
    register_command!(
        "delete-category",
        "Delete selected category",
        cmd_delete_category,
        r
    );
    register_command!(
        "filter",
        "Filter expenses by category (e.g. :filter Food)",
        cmd_filter,
        r
    );
    register_command!(
        "budget",
        "Set budget (e.g. :budget Food 500)",
        cmd_budget,
        r
    );
    register_command!(
        "delete-budget",
        "Delete selected budget",
        cmd_delete_budget,
        r
    );
    register_command!(
        "search",
        "Search expenses (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Search expenses (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "export",
        "Export expenses to CSV (e.g. :export ~/expenses.csv)",
        cmd_export,
        r
    );
    register_command!(
        "backup",
        "Write full JSON backup (e.g. :backup ~/spendtui.json)",
        cmd_backup,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(db)?;
    Ok(())
}

fn cmd_expenses(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.refresh_expenses(db)?;
    Ok(())
}

fn cmd_categories(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Categories;
    app.refresh_registry(db)?;
    Ok(())
}

fn cmd_budgets(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    app.refresh_budgets(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.current_month = chrono::Local::now().format("%Y-%m").to_string();
        refresh_month_views(app, db)?;
        app.set_status(format!("Back to current month: {}", app.current_month));
        return Ok(());
    }

    // Accept formats like "2024-01", "2024-1", "01", "1"
    let month = if args.len() <= 2 {
        let year = &app.current_month[..4];
        format!("{year}-{args:0>2}")
    } else {
        args.to_string()
    };

    // Re-format the parsed date so short forms like "2024-1" come out
    // zero-padded rather than being sliced as-is.
    match chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d") {
        Ok(date) => {
            app.current_month = date.format("%Y-%m").to_string();
            refresh_month_views(app, db)?;
            app.set_status(format!("Switched to month: {}", app.current_month));
        }
        Err(_) => {
            app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)");
        }
    }

    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, 1)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, -1)
}

fn advance_month(app: &mut App, db: &mut Database, delta: i32) -> anyhow::Result<()> {
    app.current_month = super::util::shift_month(&app.current_month, delta);
    refresh_month_views(app, db)?;
    app.set_status(format!("Month: {}", app.current_month));
    Ok(())
}

fn refresh_month_views(app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_dashboard(db)?;
    app.refresh_expenses(db)?;
    app.refresh_budgets(db)?;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :add <date> <name> <amount>. Example: :add 2024-01-15 Coffee 4.50");
        return Ok(());
    }

    let parts: Vec<&str> = args.splitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :add <date> <name> <amount>");
        return Ok(());
    }

    let date = parts[0];
    if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        app.set_status(format!("Invalid date: {date}. Use YYYY-MM-DD"));
        return Ok(());
    }

    // Last token is the amount, everything in between is the name
    let rest_parts: Vec<&str> = parts[1].rsplitn(2, ' ').collect();
    if rest_parts.len() < 2 {
        app.set_status("Usage: :add <date> <name> <amount>");
        return Ok(());
    }

    let amount_str = rest_parts[0];
    let name = rest_parts[1];

    let amount = match Decimal::from_str(amount_str) {
        Ok(a) => a,
        Err(_) => {
            app.set_status(format!("Invalid amount: {amount_str}"));
            return Ok(());
        }
    };

    let expense = Expense::new(
        name.to_string(),
        amount,
        SYSTEM_CATEGORY.to_string(),
        date.to_string(),
    );
    db.insert_expense(&expense)?;
    app.refresh_expenses(db)?;
    app.refresh_dashboard(db)?;
    app.set_status(format!(
        "Added: {name} ${amount} on {date}. Use :recat to categorize"
    ));
    Ok(())
}

fn cmd_delete_expense(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses || app.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(());
    }

    if let Some(expense) = app.expenses.get(app.expense_index) {
        let name = expense.name.clone();
        app.confirm_message = format!("Delete '{name}'?");
        app.pending_action = Some(PendingAction::DeleteExpense {
            id: expense.id.clone(),
            name,
        });
        app.input_mode = InputMode::Confirm;
    }

    Ok(())
}

fn cmd_rename(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    match app.screen {
        Screen::Expenses => {
            if app.expenses.is_empty() {
                app.set_status("No expense selected");
                return Ok(());
            }
            if args.is_empty() {
                // Enter editing mode for inline rename
                if let Some(expense) = app.expenses.get(app.expense_index) {
                    app.command_input = expense.name.clone();
                    app.edit_target = EditTarget::ExpenseName;
                    app.input_mode = InputMode::Editing;
                    app.set_status("Type new name, press Enter to confirm");
                }
                return Ok(());
            }
            rename_selected_expense(args, app, db)
        }
        Screen::Categories => {
            let Some(old) = app.selected_category().map(String::from) else {
                app.set_status("No category selected");
                return Ok(());
            };
            if args.is_empty() {
                app.command_input = old;
                app.edit_target = EditTarget::CategoryName;
                app.input_mode = InputMode::Editing;
                app.set_status("Type new category name, press Enter to confirm");
                return Ok(());
            }
            rename_selected_category(&old, args, app, db)
        }
        _ => {
            app.set_status("Navigate to Expenses or Categories first");
            Ok(())
        }
    }
}

pub(crate) fn rename_selected_expense(
    new_name: &str,
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    if let Some(expense) = app.expenses.get(app.expense_index) {
        let mut updated = expense.clone();
        updated.name = new_name.to_string();
        updated.updated_at = now_rfc3339();
        db.update_expense(&updated)?;
        app.refresh_expenses(db)?;
        app.set_status(format!("Renamed to: {new_name}"));
    }
    Ok(())
}

pub(crate) fn rename_selected_category(
    old: &str,
    new_name: &str,
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    match categories::rename(db, old, new_name, &app.registry) {
        Ok(next) => {
            let merged = !next.categories.iter().any(|c| c == old)
                && app.registry.contains(new_name);
            app.registry = next;
            if app.category_index >= app.registry.categories.len() {
                app.category_index = app.registry.categories.len().saturating_sub(1);
            }
            app.refresh_expenses(db)?;
            app.refresh_budgets(db)?;
            app.refresh_dashboard(db)?;
            if merged {
                app.set_status(format!("Merged '{old}' into '{new_name}'"));
            } else {
                app.set_status(format!("Renamed '{old}' to '{new_name}'"));
            }
        }
        Err(e) => app.set_status(format!("{e}")),
    }
    Ok(())
}

fn cmd_recat(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses || app.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(());
    }

    if args.is_empty() {
        app.set_status("Usage: :recat <category_name>");
        return Ok(());
    }

    if !app.registry.contains(args) {
        app.set_status(format!("Category '{args}' not found"));
        return Ok(());
    }

    if let Some(expense) = app.expenses.get(app.expense_index) {
        let mut updated = expense.clone();
        updated.category = args.to_string();
        updated.updated_at = now_rfc3339();
        db.update_expense(&updated)?;
        app.refresh_expenses(db)?;
        app.refresh_dashboard(db)?;
        app.set_status(format!("Categorized as: {args}"));
    }

    Ok(())
}

fn cmd_tax(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses || app.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(());
    }

    if let Some(expense) = app.expenses.get(app.expense_index) {
        let mut updated = expense.clone();
        updated.is_tax_deductible = !updated.is_tax_deductible;
        updated.updated_at = now_rfc3339();
        let flag = updated.is_tax_deductible;
        db.update_expense(&updated)?;
        app.refresh_expenses(db)?;
        app.set_status(if flag {
            "Marked tax-deductible"
        } else {
            "Cleared tax-deductible"
        });
    }

    Ok(())
}

fn cmd_pay(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses || app.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(());
    }

    if args.is_empty() {
        let methods: Vec<&str> = PaymentMethod::all().iter().map(|m| m.as_str()).collect();
        app.set_status(format!("Usage: :pay <method>. Methods: {}", methods.join(", ")));
        return Ok(());
    }

    let method = PaymentMethod::parse(args);
    if let Some(expense) = app.expenses.get(app.expense_index) {
        let mut updated = expense.clone();
        updated.payment_method = method;
        updated.updated_at = now_rfc3339();
        db.update_expense(&updated)?;
        app.refresh_expenses(db)?;
        app.set_status(format!("Payment method: {method}"));
    }

    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name> [icon]. Example: :category Travel Plane");
        return Ok(());
    }

    // If the last token is a known icon identifier it names the icon,
    // otherwise the whole argument is the category name.
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    let (name, icon) = if parts.len() == 2 && ICON_SET.contains(&parts[0]) {
        (parts[1], parts[0])
    } else {
        (args, DEFAULT_ICON)
    };

    if app.registry.contains(name) {
        app.set_status(format!("Category '{name}' already exists"));
        return Ok(());
    }

    match categories::create(db, name, icon, &app.registry) {
        Ok(next) => {
            app.registry = next;
            app.set_status(format!("Created category: {name}"));
        }
        Err(e) => app.set_status(format!("{e}")),
    }
    Ok(())
}

fn cmd_icon(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Categories {
        app.set_status("Navigate to Categories first");
        return Ok(());
    }

    if args.is_empty() || !ICON_SET.contains(&args) {
        app.set_status(format!("Usage: :icon <identifier>. Icons: {}", ICON_SET.join(", ")));
        return Ok(());
    }

    let Some(name) = app.selected_category().map(String::from) else {
        app.set_status("No category selected");
        return Ok(());
    };

    app.registry = categories::set_icon(db, &name, args, &app.registry)?;
    app.set_status(format!("Icon for '{name}': {args}"));
    Ok(())
}

fn cmd_delete_category(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Categories {
        app.set_status("Navigate to Categories first");
        return Ok(());
    }

    let Some(name) = app.selected_category().map(String::from) else {
        app.set_status("No category selected");
        return Ok(());
    };

    if name == SYSTEM_CATEGORY {
        app.set_status(format!("The '{SYSTEM_CATEGORY}' category cannot be deleted"));
        return Ok(());
    }

    let expense_count = db.get_expenses_by_category(&name)?.len();
    app.confirm_message = if expense_count > 0 {
        format!(
            "Delete '{name}'? {expense_count} expense{} will move to {SYSTEM_CATEGORY}",
            if expense_count == 1 { "" } else { "s" }
        )
    } else {
        format!("Delete '{name}'?")
    };
    app.pending_action = Some(PendingAction::DeleteCategory { name });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_filter(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.category_filter = None;
        app.screen = Screen::Expenses;
        app.refresh_expenses(db)?;
        app.set_status("Category filter cleared - showing all expenses");
        return Ok(());
    }

    if !app.registry.contains(args) {
        app.set_status(format!("Category '{args}' not found"));
        return Ok(());
    }

    app.category_filter = Some(args.to_string());
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(db)?;
    app.set_status(format!("Filtering by category: {args}"));
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :budget <category_name> <amount>. Example: :budget Food 500");
        return Ok(());
    }

    // Last token is the amount, everything before is the category name
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :budget <category_name> <amount>");
        return Ok(());
    }

    let amount_str = parts[0];
    let category_name = parts[1];

    let amount = match Decimal::from_str(amount_str) {
        Ok(a) => a,
        Err(_) => {
            app.set_status(format!("Invalid amount: {amount_str}"));
            return Ok(());
        }
    };

    if !app.registry.contains(category_name) {
        app.set_status(format!("Category '{category_name}' not found"));
        return Ok(());
    }

    let month = app.current_month.clone();
    categories::upsert_budget(db, category_name, &month, amount)?;
    app.refresh_budgets(db)?;
    app.screen = Screen::Budgets;
    app.set_status(format!("Budget set: {category_name} = ${amount} for {month}"));
    Ok(())
}

fn cmd_delete_budget(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.budgets.is_empty() {
        app.set_status("No budgets to delete");
        return Ok(());
    }

    if let Some(budget) = app.budgets.get(app.budget_index) {
        let category = budget.category.clone();
        app.confirm_message = format!("Delete budget for '{category}'?");
        app.pending_action = Some(PendingAction::DeleteBudget {
            id: budget.id.clone(),
            category,
        });
        app.input_mode = InputMode::Confirm;
    }

    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Expenses;
    app.refresh_expenses(db)?;

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }

    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/spendtui-export-{}.csv", app.current_month)
    } else {
        crate::run::shellexpand(args)
    };

    let count = db.export_to_csv(&path, Some(&app.current_month))?;
    if count == 0 {
        app.set_status("No expenses to export");
    } else {
        app.set_status(format!("Exported {count} expenses to {path}"));
    }
    Ok(())
}

fn cmd_backup(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let stamp = chrono::Local::now().format("%Y-%m-%d");
        format!("{home}/spendtui-backup-{stamp}.json")
    } else {
        crate::run::shellexpand(args)
    };

    let (expenses, budgets) = crate::backup::write_backup(db, std::path::Path::new(&path))?;
    app.set_status(format!(
        "Backed up {expenses} expenses and {budgets} budgets to {path}"
    ));
    Ok(())
}
