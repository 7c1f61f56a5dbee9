use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::application::services::{Holding, PortfolioSummary};
use crate::domain::value_objects::format_money;
use crate::presentation::tui::event::{SortColumn, SortOrder};

fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Sort holding references by the given column and order.
pub fn sort_holdings(holdings: &[Holding], column: SortColumn, order: SortOrder) -> Vec<&Holding> {
    let mut sorted: Vec<&Holding> = holdings.iter().collect();

    sorted.sort_by(|a, b| {
        let cmp = match column {
            SortColumn::Ticker => a.stock.ticker.cmp(&b.stock.ticker),
            SortColumn::Value => cmp_optional(a.market_value, b.market_value),
            SortColumn::ProfitLoss => cmp_optional(a.profit_loss_percent, b.profit_loss_percent),
        };
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });

    sorted
}

fn header_label(title: &str, column: SortColumn, active: SortColumn, order: SortOrder) -> String {
    if column == active {
        format!("{title} {order}")
    } else {
        title.to_owned()
    }
}

fn pl_color(amount: Option<f64>) -> Color {
    match amount {
        Some(v) if v > 0.0 => Color::Green,
        Some(v) if v < 0.0 => Color::Red,
        _ => Color::Gray,
    }
}

fn money_or_na(amount: Option<f64>, currency: &str) -> String {
    amount.map_or_else(|| "n/a".to_string(), |v| format_money(v, currency))
}

/// Render the holdings table into `area`, with per-currency totals as the title.
pub fn render_holdings(
    frame: &mut Frame,
    summary: Option<&PortfolioSummary>,
    sort_column: SortColumn,
    sort_order: SortOrder,
    table_state: &mut TableState,
    is_focused: bool,
    area: Rect,
) {
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let mut title = vec![Span::raw("Holdings ")];
    if let Some(summary) = summary {
        for (currency, totals) in &summary.totals {
            title.push(Span::styled(
                format!(
                    "│ {} {:+.2}% ",
                    format_money(totals.value, currency),
                    totals.profit_loss_percent
                ),
                Style::default().fg(pl_color(Some(totals.profit_loss))),
            ));
        }
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let headers = [
        header_label("Ticker", SortColumn::Ticker, sort_column, sort_order),
        "Name".to_owned(),
        "Shares".to_owned(),
        "Price".to_owned(),
        header_label("Value", SortColumn::Value, sort_column, sort_order),
        "P/L".to_owned(),
        header_label("P/L %", SortColumn::ProfitLoss, sort_column, sort_order),
    ];
    let header_row = Row::new(
        headers
            .iter()
            .map(|h| Cell::from(Span::styled(h.as_str(), header_style)))
            .collect::<Vec<_>>(),
    )
    .height(1);

    let holdings = summary.map_or(&[][..], |s| s.holdings.as_slice());
    let rows: Vec<Row> = sort_holdings(holdings, sort_column, sort_order)
        .into_iter()
        .map(|h| {
            let currency = h.stock.currency.as_str();
            let cells = vec![
                Cell::from(h.stock.ticker.clone()),
                Cell::from(h.stock.display_name().to_owned()),
                Cell::from(format!("{:.2}", h.stock.shares)),
                Cell::from(money_or_na(h.price, currency)),
                Cell::from(money_or_na(h.market_value, currency)),
                Cell::from(money_or_na(h.profit_loss, currency)),
                Cell::from(
                    h.profit_loss_percent
                        .map_or_else(|| "n/a".to_string(), |p| format!("{p:+.2}%")),
                ),
            ];
            Row::new(cells)
                .style(Style::default().fg(pl_color(h.profit_loss)))
                .height(1)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(9),
    ];

    let highlight_style = if is_focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let table = Table::new(rows, widths)
        .header(header_row)
        .block(block)
        .row_highlight_style(highlight_style)
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, table_state);
}
