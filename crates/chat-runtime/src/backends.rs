//! Backend Selection
//!
//! Turns a [`RuntimeConfig`] into the collaborators the conversation manager
//! and chart panels need.

use std::rc::Rc;

use chat_core::{
    chart::{ChartClient, FallbackChartClient},
    conversation::ConversationConfig,
    error::Result,
    provider::CompletionClient,
    storage::KeyValueStore,
};

use crate::coingecko::CoinGeckoChartClient;
use crate::config::{ChartBackend, CompletionBackend, RuntimeConfig};
use crate::file_store::FileStore;
use crate::http::{HttpChartClient, HttpCompletionClient};
use crate::mock::{MockChartClient, MockCompletionClient};

/// Collaborators for one chat session
pub struct Backends {
    pub completion: Rc<dyn CompletionClient>,
    pub chart: Rc<dyn ChartClient>,
    pub store: Rc<dyn KeyValueStore>,
}

impl Backends {
    /// Build every collaborator named by the configuration
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            completion: completion_client(config)?,
            chart: chart_client(config)?,
            store: Rc::new(FileStore::new(&config.history_dir)),
        })
    }
}

/// Conversation settings derived from the runtime configuration
pub fn conversation_config(config: &RuntimeConfig) -> ConversationConfig {
    ConversationConfig {
        max_tokens: Some(config.max_tokens),
        ..ConversationConfig::default()
    }
}

/// Completion client for the configured backend
pub fn completion_client(config: &RuntimeConfig) -> Result<Rc<dyn CompletionClient>> {
    let client: Rc<dyn CompletionClient> = match config.completion_backend {
        CompletionBackend::Http => Rc::new(HttpCompletionClient::new(&config.api_base, config.timeout)?),
        CompletionBackend::Mock => Rc::new(MockCompletionClient::new()),
        #[cfg(feature = "ollama")]
        CompletionBackend::Ollama => Rc::new(crate::ollama::OllamaCompletionClient::from_config(
            config.ollama.clone(),
        )),
        #[cfg(not(feature = "ollama"))]
        CompletionBackend::Ollama => {
            return Err(chat_core::error::ChatError::Config(
                "built without the `ollama` feature".into(),
            ));
        }
    };
    tracing::info!(backend = client.name(), "Completion backend ready");
    Ok(client)
}

/// Chart client for the configured backend
pub fn chart_client(config: &RuntimeConfig) -> Result<Rc<dyn ChartClient>> {
    let client: Rc<dyn ChartClient> = match config.chart_backend {
        ChartBackend::Http => Rc::new(HttpChartClient::new(&config.api_base, config.timeout)?),
        ChartBackend::CoinGecko => Rc::new(FallbackChartClient::new(
            Rc::new(CoinGeckoChartClient::new(config.timeout)?),
            Rc::new(MockChartClient::new()),
        )),
        ChartBackend::Mock => Rc::new(MockChartClient::new()),
    };
    tracing::info!(source = client.name(), "Chart backend ready");
    Ok(client)
}
