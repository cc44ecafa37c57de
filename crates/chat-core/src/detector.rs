//! Mention Detection
//!
//! Finds references to the supported cryptocurrencies in free-form text.
//!
//! Matching is a case-insensitive substring search over a fixed registry,
//! checked in declaration order. The first entry with any matching keyword
//! wins, so "btc vs eth" resolves to bitcoin. Keywords are not anchored to word
//! boundaries: "ethereumclassic" matches ethereum and "adapt" matches cardano.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ChatError;

/// Canonical identifier of a supported cryptocurrency
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetId {
    Bitcoin,
    Ethereum,
    Cardano,
    Solana,
    Dogecoin,
}

impl AssetId {
    /// Every supported asset, in registry order
    pub const ALL: [Self; 5] = [
        Self::Bitcoin,
        Self::Ethereum,
        Self::Cardano,
        Self::Solana,
        Self::Dogecoin,
    ];

    /// Wire identifier (e.g., "bitcoin")
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Cardano => "cardano",
            Self::Solana => "solana",
            Self::Dogecoin => "dogecoin",
        }
    }

    /// Human-readable name (e.g., "Bitcoin")
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin",
            Self::Ethereum => "Ethereum",
            Self::Cardano => "Cardano",
            Self::Solana => "Solana",
            Self::Dogecoin => "Dogecoin",
        }
    }

    /// Ticker symbol (e.g., "BTC")
    pub const fn ticker(self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
            Self::Ethereum => "ETH",
            Self::Cardano => "ADA",
            Self::Solana => "SOL",
            Self::Dogecoin => "DOGE",
        }
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetId {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ChatError::UnknownAsset(s.to_string()))
    }
}

/// One row of the asset registry
#[derive(Clone, Copy, Debug)]
pub struct AssetEntry {
    pub id: AssetId,
    pub keywords: &'static [&'static str],
}

/// Static registry; order decides ties between assets
pub static REGISTRY: [AssetEntry; 5] = [
    AssetEntry { id: AssetId::Bitcoin, keywords: &["bitcoin", "btc"] },
    AssetEntry { id: AssetId::Ethereum, keywords: &["ethereum", "eth"] },
    AssetEntry { id: AssetId::Cardano, keywords: &["cardano", "ada"] },
    AssetEntry { id: AssetId::Solana, keywords: &["solana", "sol"] },
    AssetEntry { id: AssetId::Dogecoin, keywords: &["dogecoin", "doge"] },
];

/// Detect the first registry asset mentioned in `text`
pub fn detect(text: &str) -> Option<AssetId> {
    let lowered = text.to_lowercase();

    let found = REGISTRY
        .iter()
        .find(|entry| entry.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|entry| entry.id);

    if let Some(id) = found {
        tracing::debug!(asset = %id, "Detected asset mention");
    }
    found
}
