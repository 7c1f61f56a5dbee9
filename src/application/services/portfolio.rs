use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::domain::entities::{PriceQuote, Stock};
use crate::domain::ports::{PriceSource, StockStore};

/// One stock valued at its latest price. Value fields are `None` without a price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub stock: Stock,
    pub price: Option<f64>,
    pub market_value: Option<f64>,
    pub cost_basis: f64,
    pub profit_loss: Option<f64>,
    pub profit_loss_percent: Option<f64>,
}

impl Holding {
    #[must_use]
    pub fn new(stock: Stock, price: Option<f64>) -> Self {
        let cost_basis = stock.cost_basis();
        let market_value = price.map(|p| p * stock.shares);
        let profit_loss = market_value.map(|v| v - cost_basis);
        let profit_loss_percent = profit_loss.map(|pl| percent_of(pl, cost_basis));
        Self {
            stock,
            price,
            market_value,
            cost_basis,
            profit_loss,
            profit_loss_percent,
        }
    }
}

/// Sums for one currency, over priced holdings only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub value: f64,
    pub cost: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub totals: BTreeMap<String, Totals>,
    pub refreshed_at: DateTime<Utc>,
}

fn percent_of(amount: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        amount * 100.0 / base
    }
}

/// Values every stock against the quotes; stocks without a usable quote keep
/// their cost basis but stay out of the totals.
#[must_use]
pub fn summarize(stocks: Vec<Stock>, quotes: &HashMap<String, PriceQuote>) -> PortfolioSummary {
    let holdings: Vec<Holding> = stocks
        .into_iter()
        .map(|stock| {
            let price = quotes
                .get(&stock.ticker)
                .filter(|q| q.is_usable())
                .map(|q| q.price);
            Holding::new(stock, price)
        })
        .collect();

    let mut totals: BTreeMap<String, Totals> = BTreeMap::new();
    for holding in &holdings {
        let Some(value) = holding.market_value else {
            continue;
        };
        let entry = totals.entry(holding.stock.currency.clone()).or_default();
        entry.value += value;
        entry.cost += holding.cost_basis;
    }
    for entry in totals.values_mut() {
        entry.profit_loss = entry.value - entry.cost;
        entry.profit_loss_percent = percent_of(entry.profit_loss, entry.cost);
    }

    PortfolioSummary {
        holdings,
        totals,
        refreshed_at: Utc::now(),
    }
}

/// Load all stocks and price them in one batch.
///
/// # Errors
///
/// Returns an error if the stocks cannot be read or the price source fails.
pub async fn load_portfolio(
    stocks: &dyn StockStore,
    prices: &dyn PriceSource,
) -> anyhow::Result<PortfolioSummary> {
    let stocks = stocks.list_stocks().context("Failed to load stocks")?;
    if stocks.is_empty() {
        return Ok(summarize(stocks, &HashMap::new()));
    }

    let tickers: Vec<String> = stocks.iter().map(|s| s.ticker.clone()).collect();
    let quotes = prices
        .get_prices(&tickers)
        .await
        .context("Failed to fetch prices")?;
    Ok(summarize(stocks, &quotes))
}

/// Refresh the portfolio every `refresh` and publish it until every receiver is gone.
pub async fn watch_portfolio(
    stocks: Arc<dyn StockStore>,
    prices: Arc<dyn PriceSource>,
    refresh: Duration,
    tx: watch::Sender<Option<PortfolioSummary>>,
) {
    let mut ticker = tokio::time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = tx.closed() => break,
            _ = ticker.tick() => {
                match load_portfolio(stocks.as_ref(), prices.as_ref()).await {
                    Ok(summary) => {
                        if tx.send(Some(summary)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Portfolio refresh failed: {e:#}"),
                }
            }
        }
    }
}
