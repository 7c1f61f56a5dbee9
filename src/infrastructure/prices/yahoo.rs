use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::config::PriceConfig;
use crate::domain::entities::PriceQuote;
use crate::domain::ports::price_source::{PriceError, PriceSource};

/// Quotes from the Yahoo Finance chart endpoint, one request per ticker.
pub struct YahooPriceSource {
    base_url: String,
    request_delay: std::time::Duration,
    client: reqwest::Client,
}

impl YahooPriceSource {
    /// # Errors
    ///
    /// Returns `PriceError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &PriceConfig) -> Result<Self, PriceError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| PriceError::Unavailable(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_delay: config.request_delay(),
            client,
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{ticker}", self.base_url)
    }

    async fn fetch_one(&self, ticker: &str) -> Result<PriceQuote, PriceError> {
        let response = self
            .client
            .get(self.chart_url(ticker))
            .send()
            .await
            .map_err(|e| PriceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PriceError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PriceError::RequestFailed(e.to_string()))?;
        parse_chart(ticker, &body)
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn get_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, PriceQuote>, PriceError> {
        let mut quotes = HashMap::with_capacity(tickers.len());

        for (i, ticker) in tickers.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            match self.fetch_one(ticker).await {
                Ok(quote) => {
                    quotes.insert(ticker.clone(), quote);
                }
                Err(e) => tracing::warn!("No price for {ticker}: {e}"),
            }
        }

        tracing::debug!("Fetched {}/{} quotes", quotes.len(), tickers.len());
        Ok(quotes)
    }
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
}

fn parse_chart(ticker: &str, body: &str) -> Result<PriceQuote, PriceError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| PriceError::InvalidResponse(format!("failed to parse chart: {e}")))?;

    let meta = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| result.meta)
        .ok_or_else(|| PriceError::InvalidResponse("empty chart result".into()))?;

    let price = meta
        .regular_market_price
        .ok_or_else(|| PriceError::InvalidResponse("missing regularMarketPrice".into()))?;

    let quote = PriceQuote::new(ticker, price);
    Ok(match meta.long_name.or(meta.short_name) {
        Some(name) if !name.trim().is_empty() => quote.with_name(name.trim()),
        _ => quote,
    })
}
