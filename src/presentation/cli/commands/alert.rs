use std::collections::HashMap;

use anyhow::Context;
use colored::Colorize;

use crate::domain::entities::{AlertRule, NewAlert};
use crate::domain::ports::{AlertStore, StockStore};
use crate::domain::value_objects::AlertKind;
use crate::presentation::cli::app::{AlertAddArgs, AlertCommand};
use crate::presentation::cli::formatters::table_fmt::format_alert_table;

/// Create, list, toggle or delete alerts.
///
/// # Errors
///
/// Returns an error if the stock or alert does not exist, the parameters are
/// invalid, or the store fails.
pub fn run_alert(
    command: AlertCommand,
    stocks: &dyn StockStore,
    alerts: &dyn AlertStore,
) -> anyhow::Result<()> {
    match command {
        AlertCommand::Add(args) => {
            let (id, ticker, rule) = add_alert(&args, stocks, alerts)?;
            println!(
                "{} alert {id}: {} {}",
                "Saved".green(),
                ticker.bold(),
                describe(&rule)
            );
        }
        AlertCommand::List => {
            let records = alerts.list_alerts().context("Failed to list alerts")?;
            if records.is_empty() {
                println!("No alerts defined. Add one with `stockwatch alert add TICKER --kind ...`.");
                return Ok(());
            }
            let by_id: HashMap<i64, _> = stocks
                .list_stocks()
                .context("Failed to list stocks")?
                .into_iter()
                .map(|s| (s.id, s))
                .collect();
            println!("{}", format_alert_table(&records, &by_id));
        }
        AlertCommand::Enable { id } => {
            ensure_alert(alerts, id)?;
            alerts
                .set_alert_active(id, true)
                .context("Failed to enable alert")?;
            // Re-armed alerts start tracking from the next price.
            alerts
                .set_alert_state(id, None)
                .context("Failed to reset alert state")?;
            println!("Alert {id} enabled");
        }
        AlertCommand::Disable { id } => {
            ensure_alert(alerts, id)?;
            alerts
                .set_alert_active(id, false)
                .context("Failed to disable alert")?;
            println!("Alert {id} disabled");
        }
        AlertCommand::Delete { id } => {
            ensure_alert(alerts, id)?;
            alerts.delete_alert(id).context("Failed to delete alert")?;
            println!("Alert {id} deleted");
        }
    }
    Ok(())
}

fn ensure_alert(alerts: &dyn AlertStore, id: i64) -> anyhow::Result<()> {
    alerts
        .get_alert(id)
        .context("Failed to read alert")?
        .map(|_| ())
        .with_context(|| format!("No alert with id {id}"))
}

fn add_alert(
    args: &AlertAddArgs,
    stocks: &dyn StockStore,
    alerts: &dyn AlertStore,
) -> anyhow::Result<(i64, String, AlertRule)> {
    let stock = stocks
        .find_stock(&args.ticker)
        .context("Failed to read stock")?
        .with_context(|| {
            format!(
                "No stock with ticker {0}; add it with `stockwatch stock add {0}`",
                args.ticker.trim().to_uppercase()
            )
        })?;

    let rule = AlertRule::from_parts(AlertKind::from(args.kind), args.threshold, args.target)
        .context("Invalid alert")?;
    let id = alerts
        .add_alert(&NewAlert::new(stock.id, rule)?)
        .context("Failed to save alert")?;
    Ok((id, stock.ticker, rule))
}

fn describe(rule: &AlertRule) -> String {
    match (rule.threshold_percent(), rule.target_price()) {
        (Some(pct), _) => format!("{} by {pct}%", rule.kind().label().to_lowercase()),
        (None, Some(target)) => format!("{} {target}", rule.kind().label().to_lowercase()),
        (None, None) => rule.kind().label().to_lowercase(),
    }
}
