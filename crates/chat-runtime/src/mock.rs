//! Mock Backends
//!
//! Offline completion and chart sources for demos and tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use chat_core::{
    chart::{ChartClient, PriceSeries, Timeframe},
    detector::AssetId,
    error::Result,
    provider::{CompletionClient, CompletionReply, CompletionRequest},
};

/// Fallback answers when no asset name appears in the question
const GENERAL_ANSWERS: [&str; 5] = [
    "Cryptocurrencies are digital or virtual currencies that use cryptography for security and operate on decentralized networks called blockchains.",
    "Blockchain technology is a distributed ledger that records all transactions across a network of computers, making it secure, transparent, and resistant to modification.",
    "Crypto trading involves buying and selling digital currencies on exchanges, with prices determined by market supply and demand.",
    "NFTs (Non-Fungible Tokens) are unique digital assets that represent ownership of specific items like art, collectibles, or music on a blockchain.",
    "DeFi (Decentralized Finance) refers to financial applications built on blockchain technology that aim to recreate traditional financial systems without centralized intermediaries.",
];

/// Canned answer about one asset
const fn asset_answer(asset: AssetId) -> &'static str {
    match asset {
        AssetId::Bitcoin => "Bitcoin is a decentralized digital currency created in 2009. It uses blockchain technology to secure transactions and control the creation of new units. Bitcoin has become the most valuable and widely-adopted cryptocurrency, often referred to as digital gold.",
        AssetId::Ethereum => "Ethereum is a decentralized blockchain platform that enables smart contracts and decentralized applications (dApps). Unlike Bitcoin, Ethereum was designed to be programmable, allowing developers to build and deploy various applications on its network.",
        AssetId::Cardano => "Cardano is a proof-of-stake blockchain platform that aims to enable smart contracts, decentralized applications, and multi-asset transactions. It was founded by Charles Hoskinson, a co-founder of Ethereum, and emphasizes a research-driven approach to design.",
        AssetId::Solana => "Solana is a high-performance blockchain that focuses on fast transactions and high throughput. It uses a proof-of-history consensus combined with proof-of-stake, allowing it to process thousands of transactions per second with minimal fees.",
        AssetId::Dogecoin => "Dogecoin started as a meme cryptocurrency in 2013, based on the popular 'Doge' Shiba Inu meme. Despite its humorous origins, it gained significant popularity and value, partly due to endorsements from figures like Elon Musk.",
    }
}

/// Completion client with canned answers
///
/// Answers about the first asset whose full name appears in the newest user
/// message, otherwise a random general answer.
#[derive(Debug, Default)]
pub struct MockCompletionClient {
    delay: Duration,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate network latency
    pub const fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    fn answer(question: &str) -> &'static str {
        let lowered = question.to_lowercase();
        AssetId::ALL
            .into_iter()
            .find(|asset| lowered.contains(asset.as_str()))
            .map_or_else(
                || GENERAL_ANSWERS.choose(&mut rand::rng()).copied().unwrap_or(GENERAL_ANSWERS[0]),
                asset_answer,
            )
    }
}

#[async_trait(?Send)]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let question = request.last_user_text().unwrap_or_default();
        Ok(CompletionReply::new(Self::answer(question)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Chart client producing a deterministic random walk per asset and timeframe
#[derive(Debug, Default)]
pub struct MockChartClient;

impl MockChartClient {
    pub const fn new() -> Self {
        Self
    }

    /// Starting price derived from the asset id
    fn base_price(asset: AssetId) -> Decimal {
        let sum: u32 = asset.as_str().bytes().map(u32::from).sum();
        Decimal::from(sum % 1000 + 100)
    }

    /// Series ending at `now` (epoch seconds)
    pub fn series_at(asset: AssetId, timeframe: Timeframe, now: i64) -> Result<PriceSeries> {
        let (points, step) = match timeframe {
            Timeframe::OneDay => (24_i64, 3600_i64),
            other => (i64::from(other.days()), 86_400),
        };

        let base = Self::base_price(asset);
        let seed = asset.as_str().bytes().fold(u64::from(timeframe.days()), |acc, b| {
            acc.wrapping_mul(31).wrapping_add(u64::from(b))
        });
        let mut rng = StdRng::seed_from_u64(seed);

        let mut price = base;
        let mut timestamps = Vec::new();
        let mut prices = Vec::new();
        for i in (1..=points).rev() {
            // ±5% of the base price per step
            let basis_points: i64 = rng.random_range(-500..=500);
            price = (price + base * Decimal::from(basis_points) / dec!(10000)).max(Decimal::ONE);
            timestamps.push(now - i * step);
            prices.push(price.round_dp(2));
        }

        PriceSeries::new(timestamps, prices)
    }
}

#[async_trait(?Send)]
impl ChartClient for MockChartClient {
    async fn price_series(&self, asset: AssetId, timeframe: Timeframe) -> Result<PriceSeries> {
        Self::series_at(asset, timeframe, Utc::now().timestamp())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::message::{Transcript, Turn};

    #[tokio::test]
    async fn test_mock_answers_by_asset_name() {
        let mut transcript = Transcript::seeded("Hello!");
        transcript.push(Turn::user("Tell me about Solana", Some(AssetId::Solana)));
        let request = CompletionRequest::from_transcript(&transcript, None);

        let reply = MockCompletionClient::new().complete(&request).await.unwrap();
        assert!(reply.text.starts_with("Solana is"));
    }

    #[test]
    fn test_mock_general_answer() {
        let answer = MockCompletionClient::answer("what is a hash function");
        assert!(GENERAL_ANSWERS.contains(&answer));
        // ticker alone does not select a canned answer
        assert!(GENERAL_ANSWERS.contains(&MockCompletionClient::answer("btc?")));
    }

    #[test]
    fn test_mock_series_is_deterministic() {
        let a = MockChartClient::series_at(AssetId::Bitcoin, Timeframe::OneMonth, 1_700_000_000).unwrap();
        let b = MockChartClient::series_at(AssetId::Bitcoin, Timeframe::OneMonth, 1_700_000_000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert_eq!(*a.timestamps().last().unwrap(), 1_700_000_000 - 86_400);
        assert!(a.prices().iter().all(|p| *p >= Decimal::ONE));
    }

    #[test]
    fn test_mock_series_shapes() {
        let day = MockChartClient::series_at(AssetId::Dogecoin, Timeframe::OneDay, 0).unwrap();
        assert_eq!(day.len(), 24);
        let year = MockChartClient::series_at(AssetId::Dogecoin, Timeframe::OneYear, 0).unwrap();
        assert_eq!(year.len(), 365);
        assert_ne!(
            MockChartClient::series_at(AssetId::Ethereum, Timeframe::OneWeek, 0).unwrap(),
            MockChartClient::series_at(AssetId::Cardano, Timeframe::OneWeek, 0).unwrap()
        );
    }
}
