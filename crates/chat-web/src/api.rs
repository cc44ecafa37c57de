//! API Client
//!
//! Browser-side implementations of the completion and chart backends. In
//! WASM `reqwest` needs absolute URLs, so routes are resolved against the
//! page origin.

use async_trait::async_trait;
use chrono::Utc;

use chat_core::{
    chart::{ChartClient, PriceSeries, Timeframe},
    detector::AssetId,
    error::{ChatError, Result},
    provider::{CompletionClient, CompletionReply, CompletionRequest},
};

/// Resolve an API route against the page origin
fn endpoint(route: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{route}")
}

/// Completion client for `POST /api/chat`
#[derive(Clone, Default)]
pub struct ChatApi {
    client: reqwest::Client,
}

impl ChatApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl CompletionClient for ChatApi {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply> {
        let response = self
            .client
            .post(endpoint("/api/chat"))
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::CompletionStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Completion(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ChatError::Completion(format!("bad reply body: {e}")))
    }

    fn name(&self) -> &str {
        "browser"
    }
}

/// Chart client for `GET /api/crypto`
#[derive(Clone, Default)]
pub struct MarketApi {
    client: reqwest::Client,
}

impl MarketApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl ChartClient for MarketApi {
    async fn price_series(&self, asset: AssetId, timeframe: Timeframe) -> Result<PriceSeries> {
        // `_` keeps the browser from serving a cached series
        let query = [
            ("symbol", asset.as_str().to_string()),
            ("timeframe", timeframe.as_str().to_string()),
            ("_", Utc::now().timestamp_millis().to_string()),
        ];

        let response = self
            .client
            .get(endpoint("/api/crypto"))
            .query(&query)
            .send()
            .await
            .map_err(|e| ChatError::Chart(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChatError::Chart(format!("status {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Chart(e.to_string()))?;
        PriceSeries::from_json(&body)
    }

    fn name(&self) -> &str {
        "browser"
    }
}
