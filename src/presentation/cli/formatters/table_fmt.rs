use std::collections::HashMap;

use colored::Colorize;

use crate::application::services::PortfolioSummary;
use crate::domain::entities::{Alert, AlertRecord, Stock};
use crate::domain::value_objects::{format_money, DEFAULT_CURRENCY};

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn separator(header: &str) -> String {
    "─".repeat(header.chars().count())
}

fn signed_percent(percent: f64) -> String {
    format!("{percent:+.2}%")
}

fn colorize_pl(text: String, amount: f64) -> String {
    if amount > 0.0 {
        text.green().to_string()
    } else if amount < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

/// Tracked stocks as an aligned table.
#[must_use]
pub fn format_stock_table(stocks: &[Stock]) -> String {
    let header = format!(
        "{:<5} {:<10} {:<24} {:>12} {:>14} {:<4}",
        "ID", "TICKER", "NAME", "SHARES", "AVG COST", "CUR"
    );
    let mut rows = vec![header.clone(), separator(&header)];

    for s in stocks {
        rows.push(format!(
            "{:<5} {:<10} {:<24} {:>12.4} {:>14} {:<4}",
            s.id,
            clip(&s.ticker, 10),
            clip(s.name.as_deref().unwrap_or("-"), 24),
            s.shares,
            format_money(s.average_cost, &s.currency),
            s.currency
        ));
    }

    rows.join("\n")
}

/// Alerts with their stock, trigger parameter and tracking state.
///
/// Rows that no longer parse are still listed, marked invalid.
#[must_use]
pub fn format_alert_table(alerts: &[AlertRecord], stocks: &HashMap<i64, Stock>) -> String {
    let header = format!(
        "{:<5} {:<10} {:<22} {:>12} {:<20} {:>12} {:<6}",
        "ID", "TICKER", "KIND", "TRIGGER", "STATE", "BENCHMARK", "ACTIVE"
    );
    let mut rows = vec![header.clone(), separator(&header)];

    for record in alerts {
        let stock = stocks.get(&record.stock_id);
        let ticker = stock.map_or("?", |s| s.ticker.as_str());
        let currency = stock.map_or(DEFAULT_CURRENCY, |s| s.currency.as_str());

        let Ok(alert) = Alert::try_from(record.clone()) else {
            rows.push(
                format!(
                    "{:<5} {:<10} {:<22} {:>12} {:<20} {:>12} {:<6}",
                    record.id,
                    clip(ticker, 10),
                    clip(&record.kind, 22),
                    "invalid",
                    "-",
                    "-",
                    if record.active { "yes" } else { "no" }
                )
                .red()
                .to_string(),
            );
            continue;
        };

        let trigger = alert.rule.threshold_percent().map_or_else(
            || {
                alert
                    .rule
                    .target_price()
                    .map_or_else(|| "-".to_string(), |t| format_money(t, currency))
            },
            |pct| format!("{pct}%"),
        );
        let (state, benchmark) = alert.tracking.map_or_else(
            || ("-".to_string(), "-".to_string()),
            |t| (t.state.to_string(), format_money(t.benchmark, currency)),
        );

        let row = format!(
            "{:<5} {:<10} {:<22} {:>12} {:<20} {:>12} {:<6}",
            alert.id,
            clip(ticker, 10),
            alert.kind().label(),
            trigger,
            state,
            benchmark,
            if alert.active { "yes" } else { "no" }
        );
        if alert.active {
            rows.push(row);
        } else {
            rows.push(row.dimmed().to_string());
        }
    }

    rows.join("\n")
}

/// Holdings with value and profit/loss, then one totals line per currency.
#[must_use]
pub fn format_portfolio(summary: &PortfolioSummary) -> String {
    let header = format!(
        "{:<10} {:>10} {:>12} {:>14} {:>14} {:>10}",
        "TICKER", "SHARES", "PRICE", "VALUE", "P/L", "P/L %"
    );
    let mut rows = vec![header.clone(), separator(&header)];

    for h in &summary.holdings {
        let currency = h.stock.currency.as_str();
        let price = h.price.map_or_else(|| "n/a".to_string(), |p| format_money(p, currency));
        let value = h
            .market_value
            .map_or_else(|| "n/a".to_string(), |v| format_money(v, currency));
        let row = format!(
            "{:<10} {:>10.2} {:>12} {:>14} {:>14} {:>10}",
            clip(&h.stock.ticker, 10),
            h.stock.shares,
            price,
            value,
            h.profit_loss
                .map_or_else(|| "n/a".to_string(), |pl| format_money(pl, currency)),
            h.profit_loss_percent
                .map_or_else(|| "n/a".to_string(), signed_percent),
        );
        rows.push(colorize_pl(row, h.profit_loss.unwrap_or_default()));
    }

    for (currency, totals) in &summary.totals {
        let line = format!(
            "Total {currency}: value {}, cost {}, P/L {} ({})",
            format_money(totals.value, currency),
            format_money(totals.cost, currency),
            format_money(totals.profit_loss, currency),
            signed_percent(totals.profit_loss_percent)
        );
        rows.push(colorize_pl(line, totals.profit_loss).bold().to_string());
    }

    rows.join("\n")
}
