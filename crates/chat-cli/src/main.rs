//! crypto-chat terminal client
//!
//! Interactive chat with mention detection, inline price charts and history
//! persisted between runs.

mod render;
mod repl;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_core::ConversationManager;
use chat_runtime::{conversation_config, Backends, CompletionBackend, OllamaCompletionClient, RuntimeConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing; stderr keeps the transcript on stdout clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,chat_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RuntimeConfig::from_env()?;
    tracing::info!(
        api_base = %config.api_base,
        history = %config.history_dir.display(),
        "Starting crypto-chat"
    );

    if config.completion_backend == CompletionBackend::Ollama
        && !OllamaCompletionClient::from_config(config.ollama.clone()).health_check().await
    {
        tracing::warn!(
            host = %config.ollama.host,
            port = config.ollama.port,
            "Ollama is not reachable; replies will fail until it is running"
        );
    }

    let backends = Backends::from_config(&config)?;
    let manager = ConversationManager::new(
        backends.completion,
        backends.store,
        conversation_config(&config),
    );
    manager.initialize();

    repl::run(&manager, backends.chart.as_ref()).await?;

    Ok(())
}
