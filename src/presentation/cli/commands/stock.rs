use anyhow::Context;
use colored::Colorize;

use crate::domain::entities::NewStock;
use crate::domain::ports::StockStore;
use crate::presentation::cli::app::{StockAddArgs, StockCommand};
use crate::presentation::cli::formatters::table_fmt::format_stock_table;

/// Add, list or remove portfolio stocks.
///
/// # Errors
///
/// Returns an error if the input is invalid or the store fails.
pub fn run_stock(command: StockCommand, stocks: &dyn StockStore) -> anyhow::Result<()> {
    match command {
        StockCommand::Add(args) => {
            let (id, stock) = add_stock(&args, stocks)?;
            println!(
                "{} {} ({} shares at {} {}, id {id})",
                "Tracking".green(),
                stock.ticker.bold(),
                stock.shares,
                stock.average_cost,
                stock.currency
            );
        }
        StockCommand::List => {
            let list = stocks.list_stocks().context("Failed to list stocks")?;
            if list.is_empty() {
                println!("No stocks tracked yet. Add one with `stockwatch stock add TICKER`.");
            } else {
                println!("{}", format_stock_table(&list));
            }
        }
        StockCommand::Remove { id } => {
            let stock = stocks
                .get_stock(id)
                .context("Failed to read stock")?
                .with_context(|| format!("No stock with id {id}"))?;
            stocks
                .delete_stock(id)
                .with_context(|| format!("Failed to remove {}", stock.ticker))?;
            println!("Removed {} and its alerts", stock.ticker.bold());
        }
    }
    Ok(())
}

fn add_stock(args: &StockAddArgs, stocks: &dyn StockStore) -> anyhow::Result<(i64, NewStock)> {
    let stock = NewStock::new(
        &args.ticker,
        args.shares,
        args.cost,
        args.currency.as_deref(),
    )
    .context("Invalid stock")?;
    let id = stocks.add_stock(&stock).context("Failed to save stock")?;
    Ok((id, stock))
}
