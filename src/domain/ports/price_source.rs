use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::PriceQuote;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("price request failed: {0}")]
    RequestFailed(String),
    #[error("invalid price response: {0}")]
    InvalidResponse(String),
    #[error("price source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch current quotes for a batch of tickers, keyed by ticker.
    ///
    /// Tickers that could not be priced are left out of the map rather than
    /// failing the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` only when the source as a whole is unusable.
    async fn get_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, PriceQuote>, PriceError>;
}
