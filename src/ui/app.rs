use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::models::{Budget, Expense, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
    Categories,
    Budgets,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Expenses,
            Self::Categories,
            Self::Budgets,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Categories => write!(f, "Categories"),
            Self::Budgets => write!(f, "Budgets"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// What the Editing-mode input buffer applies to on Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditTarget {
    ExpenseName,
    CategoryName,
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteExpense { id: String, name: String },
    DeleteBudget { id: String, category: String },
    DeleteCategory { name: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) current_month: String,

    // Category registry, mirrored from the settings rows. Lifecycle
    // operations return the next registry and this cache is replaced.
    pub(crate) registry: Registry,

    // Dashboard
    pub(crate) monthly_total: Decimal,
    pub(crate) monthly_count: i64,
    pub(crate) spending_by_category: Vec<(String, Decimal)>,
    pub(crate) monthly_trend: Vec<(String, Decimal)>,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,
    pub(crate) expense_count: i64,
    pub(crate) category_filter: Option<String>,

    // Categories
    pub(crate) category_index: usize,
    pub(crate) category_scroll: usize,

    // Budgets
    pub(crate) budgets: Vec<Budget>,
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,

    // Confirmation / editing
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,
    pub(crate) edit_target: EditTarget,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        let current_month = Local::now().format("%Y-%m").to_string();

        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            current_month,

            registry: Registry::default(),

            monthly_total: Decimal::ZERO,
            monthly_count: 0,
            spending_by_category: Vec::new(),
            monthly_trend: Vec::new(),

            expenses: Vec::new(),
            expense_index: 0,
            expense_scroll: 0,
            expense_count: 0,
            category_filter: None,

            category_index: 0,
            category_scroll: 0,

            budgets: Vec::new(),
            budget_index: 0,
            budget_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),
            edit_target: EditTarget::ExpenseName,

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_registry(&mut self, db: &Database) -> Result<()> {
        self.registry = db.load_registry()?;
        if self.category_index >= self.registry.categories.len() {
            self.category_index = self.registry.categories.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn refresh_dashboard(&mut self, db: &Database) -> Result<()> {
        let (total, count) = db.get_monthly_totals(&self.current_month)?;
        self.monthly_total = total;
        self.monthly_count = count;
        self.spending_by_category = db.get_spending_by_category(&self.current_month)?;
        self.monthly_trend = db.get_monthly_trend(12)?;
        self.expense_count = db.get_expense_count()?;
        Ok(())
    }

    pub(crate) fn refresh_expenses(&mut self, db: &Database) -> Result<()> {
        let search = if self.search_input.is_empty() {
            None
        } else {
            Some(self.search_input.as_str())
        };
        self.expenses = db.get_expenses(
            Some(200),
            self.category_filter.as_deref(),
            search,
            Some(&self.current_month),
        )?;
        self.expense_count = db.get_expense_count()?;
        if self.expense_index >= self.expenses.len() && !self.expenses.is_empty() {
            self.expense_index = self.expenses.len() - 1;
        }
        Ok(())
    }

    pub(crate) fn refresh_budgets(&mut self, db: &Database) -> Result<()> {
        self.budgets = db.get_budgets(&self.current_month)?;
        if self.budget_index >= self.budgets.len() {
            self.budget_index = self.budgets.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_registry(db)?;
        self.refresh_dashboard(db)?;
        self.refresh_expenses(db)?;
        self.refresh_budgets(db)?;
        Ok(())
    }

    /// Name of the category under the cursor on the Categories screen.
    pub(crate) fn selected_category(&self) -> Option<&str> {
        self.registry
            .categories
            .get(self.category_index)
            .map(String::as_str)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
