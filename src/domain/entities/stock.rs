use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::DEFAULT_CURRENCY;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StockError {
    #[error("ticker must not be empty")]
    EmptyTicker,
    #[error("invalid ticker: {0}")]
    InvalidTicker(String),
    #[error("shares must be a finite, non-negative number (got {0})")]
    InvalidShares(f64),
    #[error("average cost must be a finite, non-negative number (got {0})")]
    InvalidCost(f64),
    #[error("currency must be a three-letter code (got {0:?})")]
    InvalidCurrency(String),
}

/// A holding in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub ticker: String,
    pub name: Option<String>,
    pub shares: f64,
    pub average_cost: f64,
    pub currency: String,
}

impl Stock {
    /// Name for display, falling back to the ticker until a quote supplies one.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.ticker)
    }

    #[must_use]
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.average_cost
    }
}

/// Validated input for adding or updating a holding.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStock {
    pub ticker: String,
    pub shares: f64,
    pub average_cost: f64,
    pub currency: String,
}

impl NewStock {
    /// Normalizes ticker and currency to upper case and validates amounts.
    ///
    /// # Errors
    ///
    /// Returns `StockError` for an empty or malformed ticker, negative or
    /// non-finite amounts, or a currency that is not a three-letter code.
    pub fn new(
        ticker: &str,
        shares: f64,
        average_cost: f64,
        currency: Option<&str>,
    ) -> Result<Self, StockError> {
        let ticker = normalize_ticker(ticker)?;

        if !shares.is_finite() || shares < 0.0 {
            return Err(StockError::InvalidShares(shares));
        }
        if !average_cost.is_finite() || average_cost < 0.0 {
            return Err(StockError::InvalidCost(average_cost));
        }

        let currency = currency.unwrap_or(DEFAULT_CURRENCY).trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(StockError::InvalidCurrency(currency));
        }

        Ok(Self {
            ticker,
            shares,
            average_cost,
            currency,
        })
    }
}

/// Upper-cases a ticker and checks it only holds symbol characters (`BRK.B`, `005930.KS`, `^GSPC`).
///
/// # Errors
///
/// Returns `StockError` if the ticker is empty or contains other characters.
pub fn normalize_ticker(raw: &str) -> Result<String, StockError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(StockError::EmptyTicker);
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(StockError::InvalidTicker(ticker));
    }
    Ok(ticker)
}
