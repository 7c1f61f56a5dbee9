use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stock::normalize_ticker;

/// A price observed for one ticker. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub ticker: String,
    pub price: f64,
    pub name: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    #[must_use]
    pub fn new(ticker: impl Into<String>, price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            name: None,
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Quotes with a zero, negative or non-finite price are treated as missing.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        is_usable_price(self.price)
    }
}

#[must_use]
pub fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InjectionError {
    #[error("expected TICKER=PRICE or TICKER PRICE, got {0:?}")]
    Format(String),
    #[error("invalid ticker in injection: {0}")]
    Ticker(String),
    #[error("invalid price in injection: {0:?}")]
    Price(String),
}

/// A manually supplied price that forces an immediate evaluation of one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceInjection {
    pub ticker: String,
    pub price: f64,
}

impl PriceInjection {
    /// # Errors
    ///
    /// Returns `InjectionError` if the ticker is malformed or the price is not
    /// a positive finite number.
    pub fn new(ticker: &str, price: f64) -> Result<Self, InjectionError> {
        let ticker = normalize_ticker(ticker).map_err(|e| InjectionError::Ticker(e.to_string()))?;
        if !is_usable_price(price) {
            return Err(InjectionError::Price(price.to_string()));
        }
        Ok(Self { ticker, price })
    }
}

impl fmt::Display for PriceInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.ticker, self.price)
    }
}

impl FromStr for PriceInjection {
    type Err = InjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (ticker, price) = trimmed
            .split_once('=')
            .or_else(|| trimmed.split_once(char::is_whitespace))
            .ok_or_else(|| InjectionError::Format(s.to_string()))?;

        let price_text = price.trim();
        let price: f64 = price_text
            .parse()
            .map_err(|_| InjectionError::Price(price_text.to_string()))?;

        Self::new(ticker, price)
    }
}
