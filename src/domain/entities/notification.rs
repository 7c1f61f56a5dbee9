use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stock::Stock;
use crate::domain::value_objects::{format_money, AlertKind};

/// A triggered alert rendered for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub ticker: String,
    pub kind: AlertKind,
    pub price: f64,
    /// Benchmark for relative alerts, target for absolute ones.
    pub reference: f64,
    pub currency: String,
    pub triggered_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn for_trigger(stock: &Stock, kind: AlertKind, price: f64, reference: f64) -> Self {
        let ticker = stock.ticker.as_str();
        let now = format_money(price, &stock.currency);
        let then = format_money(reference, &stock.currency);

        let message = match kind {
            AlertKind::DropFromHigh => {
                format!("{ticker} has dropped to {now} from a recent high of {then}.")
            }
            AlertKind::RiseFromLow => {
                format!("{ticker} has risen to {now} from a recent low of {then}.")
            }
            AlertKind::RiseAbove => {
                format!("{ticker} has risen above your target of {then} and is now at {now}.")
            }
            AlertKind::FallBelow => {
                format!("{ticker} has fallen below your target of {then} and is now at {now}.")
            }
        };

        Self {
            title: format!("Stock Alert: {ticker}"),
            message,
            ticker: ticker.to_string(),
            kind,
            price,
            reference,
            currency: stock.currency.clone(),
            triggered_at: Utc::now(),
        }
    }
}
