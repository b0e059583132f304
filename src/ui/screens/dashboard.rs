use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Summary cards
            Constraint::Min(10),   // Spending chart
            Constraint::Length(3), // Monthly trend sparkline
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    render_spending_chart(f, chunks[1], app);
    render_trend_sparkline(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let budget_total: Decimal = app.budgets.iter().map(|b| b.limit_amount).sum();
    let remaining = budget_total - app.monthly_total;

    render_card(
        f,
        cards[0],
        "Spent",
        app.monthly_total,
        theme::RED,
        Some(format!("{} expenses", app.monthly_count)),
    );
    render_card(
        f,
        cards[1],
        "Budget",
        budget_total,
        theme::ACCENT,
        Some(format!("{} categories", app.budgets.len())),
    );
    render_card(
        f,
        cards[2],
        "Remaining",
        remaining,
        if remaining >= Decimal::ZERO {
            theme::GREEN
        } else {
            theme::RED
        },
        None,
    );

    let deductible: Decimal = app
        .expenses
        .iter()
        .filter(|e| e.is_tax_deductible)
        .map(|e| e.amount)
        .sum();
    render_card(f, cards[3], "Tax Deductible", deductible, theme::YELLOW, None);
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: ratatui::style::Color,
    subtitle: Option<String>,
) {
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    let display = format!("{}${:.2}", sign, amount.abs());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let sub_text = subtitle.unwrap_or_default();

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            display,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(sub_text, theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_spending_chart(f: &mut Frame, area: Rect, app: &App) {
    if app.spending_by_category.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Spending by Category ",
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            ));
        let msg = Paragraph::new(Line::from(Span::styled(
            "No expenses for this month. Add one with :add",
            theme::dim_style(),
        )))
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .spending_by_category
        .iter()
        .take(12)
        .map(|(name, amt)| {
            let val = amt.abs().to_u64().unwrap_or(0);
            let label = truncate(name, 10);
            Bar::default()
                .value(val)
                .label(Line::from(label))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::TEXT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(
                    " Spending by Category ",
                    Style::default()
                        .fg(theme::TEXT_DIM)
                        .add_modifier(Modifier::BOLD),
                )),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT))
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}

fn render_trend_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .monthly_trend
        .iter()
        .map(|(_, total)| total.abs().to_u64().unwrap_or(0))
        .collect();

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(
                    " Monthly Spending Trend ",
                    Style::default()
                        .fg(theme::TEXT_DIM)
                        .add_modifier(Modifier::BOLD),
                )),
        )
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
