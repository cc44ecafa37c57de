//! HTTP Backends
//!
//! Clients for the chat endpoint (`POST /api/chat`) and the market-data
//! endpoint (`GET /api/crypto`) served next to the front end.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use chat_core::{
    chart::{ChartClient, PriceSeries, Timeframe},
    detector::AssetId,
    error::{ChatError, Result},
    provider::{CompletionClient, CompletionReply, CompletionRequest},
};

/// Build a `reqwest` client with the shared timeout
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ChatError::Config(format!("HTTP client: {e}")))
}

/// Completion client for the chat endpoint
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    /// Create a client for `{api_base}/api/chat`
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: format!("{}/api/chat", api_base.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parse a successful response body
    fn parse_reply(body: &str) -> Result<CompletionReply> {
        serde_json::from_str(body).map_err(|e| ChatError::Completion(format!("bad reply body: {e}")))
    }
}

#[async_trait(?Send)]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply> {
        let response = self
            .client
            .post(&self.endpoint)
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
        Self::parse_reply(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Chart client for the market-data endpoint
pub struct HttpChartClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChartClient {
    /// Create a client for `{api_base}/api/crypto`
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: format!("{}/api/crypto", api_base.trim_end_matches('/')),
        })
    }

    /// Query pairs for one request; `_` defeats intermediary caches
    fn query(asset: AssetId, timeframe: Timeframe, nonce: i64) -> [(&'static str, String); 3] {
        [
            ("symbol", asset.as_str().to_string()),
            ("timeframe", timeframe.as_str().to_string()),
            ("_", nonce.to_string()),
        ]
    }
}

#[async_trait(?Send)]
impl ChartClient for HttpChartClient {
    async fn price_series(&self, asset: AssetId, timeframe: Timeframe) -> Result<PriceSeries> {
        let query = Self::query(asset, timeframe, Utc::now().timestamp_millis());
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| ChatError::Chart(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Chart(format!("status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Chart(e.to_string()))?;
        PriceSeries::from_json(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::message::Transcript;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Whole request (headers plus declared body) has arrived
    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .find_map(|line| {
                line.to_ascii_lowercase()
                    .strip_prefix("content-length:")
                    .map(|v| v.trim().parse::<usize>().unwrap_or(0))
            })
            .unwrap_or(0);
        buf.len() >= end + 4 + length
    }

    /// Answer every connection with an empty response of `status`; returns the base URL
    async fn serve_status(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0_u8; 1024];
                while !request_complete(&buf) {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let response = format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_endpoints() {
        let chat = HttpCompletionClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(chat.endpoint(), "http://localhost:3000/api/chat");

        let chart = HttpChartClient::new("https://example.com", Duration::from_secs(1)).unwrap();
        assert_eq!(chart.endpoint, "https://example.com/api/crypto");
    }

    #[test]
    fn test_chart_query() {
        let query = HttpChartClient::query(AssetId::Cardano, Timeframe::ThreeMonths, 42);
        assert_eq!(query[0], ("symbol", "cardano".to_string()));
        assert_eq!(query[1], ("timeframe", "3mo".to_string()));
        assert_eq!(query[2], ("_", "42".to_string()));
    }

    #[test]
    fn test_parse_reply() {
        let reply = HttpCompletionClient::parse_reply(r#"{"response":"Ethereum runs smart contracts."}"#).unwrap();
        assert_eq!(reply.text, "Ethereum runs smart contracts.");
        assert!(HttpCompletionClient::parse_reply("<html>").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let client = HttpCompletionClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let request = CompletionRequest { messages: Vec::new(), max_tokens: None };
        assert!(matches!(client.complete(&request).await, Err(ChatError::Completion(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let base = serve_status("500 Internal Server Error").await;

        let chat = HttpCompletionClient::new(&base, Duration::from_secs(5)).unwrap();
        let request = CompletionRequest::from_transcript(&Transcript::seeded("Hello!"), Some(100));
        assert!(matches!(chat.complete(&request).await, Err(ChatError::CompletionStatus(500))));

        let chart = HttpChartClient::new(&base, Duration::from_secs(5)).unwrap();
        let result = chart.price_series(AssetId::Bitcoin, Timeframe::OneWeek).await;
        assert!(matches!(result, Err(ChatError::Chart(_))));
    }
}
