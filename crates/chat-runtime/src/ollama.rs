//! Ollama Completion Backend
//!
//! Implementation of `CompletionClient` for local Ollama inference.

use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
    models::ModelOptions as OllamaOptions,
    Ollama,
};

use chat_core::{
    error::{ChatError, Result},
    message::{Role, WireMessage},
    provider::{CompletionClient, CompletionReply, CompletionRequest},
};

use crate::config::OllamaConfig;

/// System prompt prepended to every Ollama conversation
pub const CRYPTO_ASSISTANT_PROMPT: &str = "You are a friendly cryptocurrency assistant. \
Explain coins, blockchains and market concepts in plain language. \
Do not give personal financial advice and say so when asked what to buy or sell.";

/// Ollama completion client
pub struct OllamaCompletionClient {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaCompletionClient {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(&config.host, config.port),
            config,
        }
    }

    /// Create with default localhost settings
    pub fn localhost() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Convert wire messages to Ollama format, system prompt first
    fn convert_messages(messages: &[WireMessage]) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::new(
            MessageRole::System,
            CRYPTO_ASSISTANT_PROMPT.to_string(),
        ))
        .chain(messages.iter().map(|m| {
            let role = match m.role {
                Role::User => MessageRole::User,
                Role::Assistant => MessageRole::Assistant,
            };
            ChatMessage::new(role, m.content.clone())
        }))
        .collect()
    }

    fn build_options(request: &CompletionRequest) -> OllamaOptions {
        let options = OllamaOptions::default();
        match request.max_tokens.and_then(|n| i32::try_from(n).ok()) {
            Some(limit) => options.num_predict(limit),
            None => options,
        }
    }

    /// Check that the Ollama daemon answers
    pub async fn health_check(&self) -> bool {
        match self.client.list_local_models().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait(?Send)]
impl CompletionClient for OllamaCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply> {
        let chat_request = ChatMessageRequest::new(
            self.config.model.clone(),
            Self::convert_messages(&request.messages),
        )
        .options(Self::build_options(request));

        let response = self
            .client
            .send_chat_messages(chat_request)
            .await
            .map_err(|e| ChatError::Completion(e.to_string()))?;

        Ok(CompletionReply::new(response.message.content))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let client = OllamaCompletionClient::localhost();
        assert_eq!(client.config().host, "http://localhost");
        assert_eq!(client.config().port, 11434);
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            WireMessage { role: Role::Assistant, content: "Hello!".into() },
            WireMessage { role: Role::User, content: "eth?".into() },
        ];

        let converted = OllamaCompletionClient::convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].content, CRYPTO_ASSISTANT_PROMPT);
        assert_eq!(converted[2].content, "eth?");
    }
}
