use crate::application::services::load_portfolio;
use crate::domain::ports::{PriceSource, StockStore};
use crate::presentation::cli::formatters::table_fmt::format_portfolio;

/// Price every stock and print holdings and per-currency totals.
///
/// # Errors
///
/// Returns an error if stocks cannot be loaded, prices cannot be fetched, or
/// JSON serialization fails.
pub async fn run_portfolio(
    stocks: &dyn StockStore,
    prices: &dyn PriceSource,
    json: bool,
) -> anyhow::Result<()> {
    let summary = load_portfolio(stocks, prices).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.holdings.is_empty() {
        println!("No stocks tracked yet. Add one with `stockwatch stock add TICKER`.");
    } else {
        println!("{}", format_portfolio(&summary));
    }
    Ok(())
}
