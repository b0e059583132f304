use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::SYSTEM_CATEGORY;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, icon_glyph};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_category_list(f, chunks[0], app);
    render_detail(f, chunks[1], app);
}

fn render_category_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .registry
        .categories
        .iter()
        .enumerate()
        .skip(app.category_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, name)| {
            let glyph = icon_glyph(app.registry.icon_for(name));
            let style = if i == app.category_index {
                theme::selected_style()
            } else if name == SYSTEM_CATEGORY {
                theme::dim_style()
            } else {
                theme::normal_style()
            };

            let suffix = if name == SYSTEM_CATEGORY { " (fallback)" } else { "" };
            ListItem::new(Line::from(Span::styled(
                format!(" {glyph}  {name}{suffix}"),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(
                format!(" Categories ({}) ", app.registry.categories.len()),
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(list, area);
}

fn render_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(name) = app.selected_category() else {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No category selected",
            theme::dim_style(),
        )))
        .centered()
        .block(detail_block());
        f.render_widget(msg, area);
        return;
    };

    let spent = app
        .spending_by_category
        .iter()
        .find(|(cat, _)| cat == name)
        .map(|(_, amt)| *amt)
        .unwrap_or(Decimal::ZERO);

    let budget = app
        .budgets
        .iter()
        .find(|b| b.category == name)
        .map(|b| b.limit_amount);

    let expense_count = app.expenses.iter().filter(|e| e.category == name).count();

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Icon      ", theme::dim_style()),
            Span::styled(
                format!("{} {}", icon_glyph(app.registry.icon_for(name)), app.registry.icon_for(name)),
                theme::normal_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Spent     ", theme::dim_style()),
            Span::styled(format_amount(spent), theme::amount_style()),
            Span::styled(
                format!("  ({expense_count} this month)"),
                theme::dim_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Budget    ", theme::dim_style()),
            match budget {
                Some(limit) => Span::styled(format_amount(limit), theme::normal_style()),
                None => Span::styled("not set", theme::dim_style()),
            },
        ]),
    ];

    lines.push(Line::from(""));
    if name == SYSTEM_CATEGORY {
        lines.push(Line::from(Span::styled(
            "  The fallback category cannot be renamed or deleted.",
            theme::dim_style(),
        )));
        lines.push(Line::from(Span::styled(
            "  Expenses of deleted categories land here.",
            theme::dim_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  R rename | D delete | :icon <identifier>",
            theme::dim_style(),
        )));
        lines.push(Line::from(Span::styled(
            "  Renaming onto an existing category merges them.",
            theme::dim_style(),
        )));
    }

    let detail = Paragraph::new(lines).block(detail_block());
    f.render_widget(detail, area);
}

fn detail_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            " Details ",
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}
