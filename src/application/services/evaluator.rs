use std::collections::{BTreeSet, HashMap};

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::quote::is_usable_price;
use crate::domain::entities::{
    Alert, AlertError, AlertRecord, Notification, PriceInjection, PriceQuote, Stock,
};
use crate::domain::ports::{AlertStore, Notifier, PriceSource, StockStore, StoreError};
use crate::domain::rules::{self, Transition};

/// Counters for one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Alerts that had a price and went through their state machine.
    pub evaluated: usize,
    /// Alerts whose tracking was set for the first time.
    pub initialized: usize,
    pub triggered: usize,
    /// Alerts left untouched because no usable price was available.
    pub skipped: usize,
    /// Alerts that could not be processed (malformed row, missing stock, store error).
    pub failed: usize,
    /// Usable quotes received for the cycle.
    pub quotes: usize,
}

#[derive(Error, Debug)]
enum EvaluationError {
    #[error("malformed alert: {0}")]
    Malformed(#[from] AlertError),
    #[error("stock {0} not found")]
    MissingStock(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum Outcome {
    Skipped,
    Unchanged,
    Initialized,
    Updated,
    Triggered,
}

/// Runs alert state machines against prices: load, evaluate, persist, notify.
pub struct AlertEvaluator<'a> {
    prices: &'a dyn PriceSource,
    stocks: &'a dyn StockStore,
    alerts: &'a dyn AlertStore,
    notifier: &'a dyn Notifier,
}

impl<'a> AlertEvaluator<'a> {
    #[must_use]
    pub fn new(
        prices: &'a dyn PriceSource,
        stocks: &'a dyn StockStore,
        alerts: &'a dyn AlertStore,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            prices,
            stocks,
            alerts,
            notifier,
        }
    }

    /// One full cycle: active alerts, their stocks, one batched price fetch,
    /// then every alert in turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert or stock list cannot be read or the price
    /// source fails as a whole. Per-alert failures are logged and counted instead.
    pub async fn run_once(&self) -> anyhow::Result<CycleReport> {
        let records = self
            .alerts
            .get_active_alerts()
            .context("Failed to load active alerts")?;
        if records.is_empty() {
            tracing::debug!("No active alerts");
            return Ok(CycleReport::default());
        }

        let mut stocks = self.load_stocks()?;
        let tickers: Vec<String> = records
            .iter()
            .filter_map(|r| stocks.get(&r.stock_id))
            .map(|s| s.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let quotes = self
            .prices
            .get_prices(&tickers)
            .await
            .context("Failed to fetch prices")?;
        self.record_names(&mut stocks, &quotes);

        let prices: HashMap<String, f64> = quotes
            .into_values()
            .filter(PriceQuote::is_usable)
            .map(|q| (q.ticker, q.price))
            .collect();

        let mut report = self.evaluate_loaded(&records, &stocks, &prices);
        report.quotes = prices.len();
        tracing::info!(
            "Cycle done: {} evaluated, {} triggered, {} skipped, {} failed ({}/{} quotes)",
            report.evaluated,
            report.triggered,
            report.skipped,
            report.failed,
            report.quotes,
            tickers.len()
        );
        Ok(report)
    }

    /// Evaluate the alerts of a single ticker against an injected price without
    /// touching the price source.
    ///
    /// # Errors
    ///
    /// Returns an error if no stock has the injected ticker or the store cannot be read.
    pub async fn run_injected(&self, injection: &PriceInjection) -> anyhow::Result<CycleReport> {
        let stock = self
            .stocks
            .find_stock(&injection.ticker)
            .context("Failed to look up injected ticker")?
            .with_context(|| format!("No stock with ticker {}", injection.ticker))?;

        let records: Vec<AlertRecord> = self
            .alerts
            .get_active_alerts()
            .context("Failed to load active alerts")?
            .into_iter()
            .filter(|r| r.stock_id == stock.id)
            .collect();

        tracing::info!(
            "Injected price {} for {} ({} alert(s))",
            injection.price,
            injection.ticker,
            records.len()
        );

        let stocks = HashMap::from([(stock.id, stock)]);
        let prices = HashMap::from([(injection.ticker.clone(), injection.price)]);
        let mut report = self.evaluate_loaded(&records, &stocks, &prices);
        report.quotes = 1;
        Ok(report)
    }

    /// Evaluate every active alert against an explicit `ticker -> price` map.
    /// Alerts whose ticker is absent are skipped with their state untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert or stock list cannot be read.
    pub fn evaluate_with_prices(
        &self,
        prices: &HashMap<String, f64>,
    ) -> anyhow::Result<CycleReport> {
        let records = self
            .alerts
            .get_active_alerts()
            .context("Failed to load active alerts")?;
        let stocks = self.load_stocks()?;
        let mut report = self.evaluate_loaded(&records, &stocks, prices);
        report.quotes = prices.values().filter(|p| is_usable_price(**p)).count();
        Ok(report)
    }

    fn load_stocks(&self) -> anyhow::Result<HashMap<i64, Stock>> {
        Ok(self
            .stocks
            .list_stocks()
            .context("Failed to load stocks")?
            .into_iter()
            .map(|s| (s.id, s))
            .collect())
    }

    fn record_names(&self, stocks: &mut HashMap<i64, Stock>, quotes: &HashMap<String, PriceQuote>) {
        for stock in stocks.values_mut().filter(|s| s.name.is_none()) {
            let Some(name) = quotes.get(&stock.ticker).and_then(|q| q.name.as_deref()) else {
                continue;
            };
            match self.stocks.update_stock_name(stock.id, name) {
                Ok(()) => stock.name = Some(name.to_string()),
                Err(e) => tracing::warn!("Failed to record name for {}: {e}", stock.ticker),
            }
        }
    }

    fn evaluate_loaded(
        &self,
        records: &[AlertRecord],
        stocks: &HashMap<i64, Stock>,
        prices: &HashMap<String, f64>,
    ) -> CycleReport {
        let mut report = CycleReport::default();

        for record in records {
            match self.evaluate_record(record, stocks, prices) {
                Ok(Outcome::Skipped) => report.skipped += 1,
                Ok(Outcome::Unchanged | Outcome::Updated) => report.evaluated += 1,
                Ok(Outcome::Initialized) => {
                    report.evaluated += 1;
                    report.initialized += 1;
                }
                Ok(Outcome::Triggered) => {
                    report.evaluated += 1;
                    report.triggered += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping alert {}: {e}", record.id);
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn evaluate_record(
        &self,
        record: &AlertRecord,
        stocks: &HashMap<i64, Stock>,
        prices: &HashMap<String, f64>,
    ) -> Result<Outcome, EvaluationError> {
        let alert = Alert::try_from(record.clone())?;
        if !alert.active {
            return Ok(Outcome::Skipped);
        }

        let stock = stocks
            .get(&alert.stock_id)
            .ok_or(EvaluationError::MissingStock(alert.stock_id))?;

        let Some(price) = prices
            .get(&stock.ticker)
            .copied()
            .filter(|p| is_usable_price(*p))
        else {
            tracing::debug!("No price for {}, alert {} unchanged", stock.ticker, alert.id);
            return Ok(Outcome::Skipped);
        };

        match rules::evaluate(&alert.rule, alert.tracking, price) {
            Transition::Hold => {
                tracing::debug!("Alert {} ({}) holds at {price}", alert.id, stock.ticker);
                Ok(Outcome::Unchanged)
            }
            Transition::Track(tracking) => {
                self.alerts.set_alert_state(alert.id, Some(&tracking))?;
                if alert.tracking.is_none() {
                    tracing::debug!(
                        "Alert {} ({}) initialized at {price}",
                        alert.id,
                        stock.ticker
                    );
                    Ok(Outcome::Initialized)
                } else {
                    tracing::debug!(
                        "Alert {} ({}) now {} from {}",
                        alert.id,
                        stock.ticker,
                        tracking.state,
                        tracking.benchmark
                    );
                    Ok(Outcome::Updated)
                }
            }
            Transition::Rearm {
                reference,
                tracking,
            } => {
                self.alerts.set_alert_state(alert.id, Some(&tracking))?;
                self.dispatch(&Notification::for_trigger(
                    stock,
                    alert.kind(),
                    price,
                    reference,
                ));
                Ok(Outcome::Triggered)
            }
            Transition::Retire { target } => {
                self.alerts.set_alert_active(alert.id, false)?;
                self.dispatch(&Notification::for_trigger(
                    stock,
                    alert.kind(),
                    price,
                    target,
                ));
                Ok(Outcome::Triggered)
            }
        }
    }

    fn dispatch(&self, notification: &Notification) {
        tracing::info!("{}", notification.message);
        if let Err(e) = self.notifier.notify(notification) {
            tracing::warn!("Notification for {} failed: {e}", notification.ticker);
        }
    }
}
