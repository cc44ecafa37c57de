//! # chat-runtime
//!
//! Native backends for the crypto chat assistant.
//!
//! ## Completion backends
//!
//! - **HTTP** (default): `POST {api_base}/api/chat`
//! - **Ollama** (feature `ollama`): local model inference
//! - **Mock**: canned answers
//!
//! ## Chart backends
//!
//! - **HTTP** (default): `GET {api_base}/api/crypto`
//! - **CoinGecko**: public market-chart API, mock series when unreachable
//! - **Mock**: deterministic generated series
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_runtime::{Backends, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_env()?;
//! let backends = Backends::from_config(&config)?;
//! let manager = ConversationManager::new(backends.completion, backends.store, conversation_config(&config));
//! manager.initialize();
//! ```

pub mod backends;
pub mod coingecko;
pub mod config;
pub mod file_store;
pub mod http;
pub mod mock;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use backends::{chart_client, completion_client, conversation_config, Backends};
pub use coingecko::CoinGeckoChartClient;
pub use config::{ChartBackend, CompletionBackend, OllamaConfig, RuntimeConfig};
pub use file_store::FileStore;
pub use http::{HttpChartClient, HttpCompletionClient};
pub use mock::{MockChartClient, MockCompletionClient};

#[cfg(feature = "ollama")]
pub use ollama::OllamaCompletionClient;

// Re-export core types for convenience
pub use chat_core::{
    AssetId, ChartClient, ChartPanel, ChatError, CompletionClient, ConversationManager,
    KeyValueStore, Result, Timeframe, Transcript, Turn,
};
