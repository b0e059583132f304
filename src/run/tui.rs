use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::categories;
use crate::db::Database;
use crate::ui::app::{App, EditTarget, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database) -> Result<()> {
    let mut app = App::new();
    app.refresh_all(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Search => handle_search_input(key, app, db)?,
                InputMode::Editing => handle_editing_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Dashboard)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Expenses)?,
        KeyCode::Char('3') => switch_screen(app, db, Screen::Categories)?,
        KeyCode::Char('4') => switch_screen(app, db, Screen::Budgets)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, db, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, db, screens[prev])?;
        }
        KeyCode::Enter => handle_enter(app, db)?,
        KeyCode::Esc => handle_escape(app, db)?,
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('H') => {
            commands::handle_command("prev-month", app, db)?;
        }
        KeyCode::Char('L') => {
            commands::handle_command("next-month", app, db)?;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_up(app);
            }
        }
        KeyCode::Char('D') => match app.screen {
            Screen::Expenses => commands::handle_command("delete-expense", app, db)?,
            Screen::Categories => commands::handle_command("delete-category", app, db)?,
            Screen::Budgets => commands::handle_command("delete-budget", app, db)?,
            Screen::Dashboard => {}
        },
        KeyCode::Char('R') if app.screen == Screen::Categories => {
            commands::handle_command("rename", app, db)?;
        }
        KeyCode::Char('t') if app.screen == Screen::Expenses => {
            commands::handle_command("tax", app, db)?;
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_search_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.screen = Screen::Expenses;
            app.refresh_expenses(db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_expenses(db)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.screen = Screen::Expenses;
            app.expense_index = 0;
            app.expense_scroll = 0;
            app.refresh_expenses(db)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.screen = Screen::Expenses;
            app.expense_index = 0;
            app.expense_scroll = 0;
            app.refresh_expenses(db)?;
        }
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let new_name = app.command_input.trim().to_string();
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            if new_name.is_empty() {
                app.set_status("Edit cancelled");
                return Ok(());
            }
            match app.edit_target {
                EditTarget::ExpenseName => {
                    commands::rename_selected_expense(&new_name, app, db)?;
                }
                EditTarget::CategoryName => {
                    if let Some(old) = app.selected_category().map(String::from) {
                        commands::rename_selected_category(&old, &new_name, app, db)?;
                    }
                }
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteExpense { id, name } => {
                        db.delete_expense(&id)?;
                        app.refresh_expenses(db)?;
                        app.refresh_dashboard(db)?;
                        if app.expense_index > 0 && app.expense_index >= app.expenses.len() {
                            app.expense_index = app.expenses.len().saturating_sub(1);
                        }
                        app.set_status(format!("Deleted: {name}"));
                    }
                    PendingAction::DeleteBudget { id, category } => {
                        db.delete_budget(&id)?;
                        app.refresh_budgets(db)?;
                        app.set_status(format!("Deleted budget: {category}"));
                    }
                    PendingAction::DeleteCategory { name } => {
                        let next = categories::delete(db, &name, &app.registry)?;
                        app.registry = next;
                        if app.category_index >= app.registry.categories.len() {
                            app.category_index =
                                app.registry.categories.len().saturating_sub(1);
                        }
                        app.refresh_expenses(db)?;
                        app.refresh_budgets(db)?;
                        app.refresh_dashboard(db)?;
                        app.set_status(format!("Deleted category: {name}"));
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Dashboard => app.refresh_dashboard(db)?,
        Screen::Expenses => app.refresh_expenses(db)?,
        Screen::Categories => app.refresh_registry(db)?,
        Screen::Budgets => app.refresh_budgets(db)?,
    }
    app.set_status(format!("{screen}"));
    Ok(())
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Expenses => scroll_down(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Categories => scroll_down(
            &mut app.category_index,
            &mut app.category_scroll,
            app.registry.categories.len(),
            page,
        ),
        Screen::Budgets => scroll_down(
            &mut app.budget_index,
            &mut app.budget_scroll,
            app.budgets.len(),
            page,
        ),
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_up(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Categories => scroll_up(&mut app.category_index, &mut app.category_scroll),
        Screen::Budgets => scroll_up(&mut app.budget_index, &mut app.budget_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Categories => scroll_to_top(&mut app.category_index, &mut app.category_scroll),
        Screen::Budgets => scroll_to_top(&mut app.budget_index, &mut app.budget_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Expenses => scroll_to_bottom(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Categories => scroll_to_bottom(
            &mut app.category_index,
            &mut app.category_scroll,
            app.registry.categories.len(),
            page,
        ),
        Screen::Budgets => scroll_to_bottom(
            &mut app.budget_index,
            &mut app.budget_scroll,
            app.budgets.len(),
            page,
        ),
        Screen::Dashboard => {}
    }
}

fn handle_enter(app: &mut App, db: &mut Database) -> Result<()> {
    // On Categories, Enter jumps to the Expenses screen filtered by the
    // selected category.
    if app.screen == Screen::Categories {
        if let Some(name) = app.selected_category().map(String::from) {
            app.category_filter = Some(name.clone());
            app.expense_index = 0;
            app.expense_scroll = 0;
            app.screen = Screen::Expenses;
            app.refresh_expenses(db)?;
            app.set_status(format!("Filtered by: {name}"));
        }
    }
    Ok(())
}

fn handle_escape(app: &mut App, db: &mut Database) -> Result<()> {
    if app.screen == Screen::Expenses && !app.search_input.is_empty() {
        app.search_input.clear();
        app.refresh_expenses(db)?;
        app.set_status("Search cleared");
    } else if app.screen == Screen::Expenses && app.category_filter.is_some() {
        app.category_filter = None;
        app.refresh_expenses(db)?;
        app.set_status("Category filter cleared");
    } else {
        app.status_message.clear();
    }
    Ok(())
}
