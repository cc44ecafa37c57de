//! CoinGecko Market Data
//!
//! Pulls daily USD prices from the public `market_chart` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use chat_core::{
    chart::{ChartClient, PriceSeries, Timeframe},
    detector::AssetId,
    error::{ChatError, Result},
};

use crate::http::build_client;

/// Public CoinGecko API root
pub const COINGECKO_API: &str = "https://api.coingecko.com/api/v3";

/// Browser-like agent; the public API rejects some default client agents
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Deserialize)]
struct MarketChart {
    /// `[epoch_millis, price]` pairs
    prices: Vec<(i64, Decimal)>,
}

/// Chart client backed by CoinGecko
pub struct CoinGeckoChartClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoChartClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(COINGECKO_API, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, asset: AssetId) -> String {
        format!("{}/coins/{}/market_chart", self.base_url, asset.as_str())
    }

    /// Convert a `market_chart` body into a series with epoch-second stamps
    fn parse_market_chart(body: &str) -> Result<PriceSeries> {
        let chart: MarketChart = serde_json::from_str(body)
            .map_err(|e| ChatError::MalformedSeries(e.to_string()))?;
        let (timestamps, prices) = chart
            .prices
            .into_iter()
            .map(|(ms, price)| (ms / 1000, price))
            .unzip();
        PriceSeries::new(timestamps, prices)
    }
}

#[async_trait(?Send)]
impl ChartClient for CoinGeckoChartClient {
    async fn price_series(&self, asset: AssetId, timeframe: Timeframe) -> Result<PriceSeries> {
        let days = timeframe.days().to_string();
        let response = self
            .client
            .get(self.url(asset))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("vs_currency", "usd"), ("days", days.as_str()), ("interval", "daily")])
            .send()
            .await
            .map_err(|e| ChatError::Chart(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Chart(format!("CoinGecko returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Chart(e.to_string()))?;
        Self::parse_market_chart(&body)
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
