//! Completion Backend Strategy
//!
//! Common interface for whatever produces assistant replies: the HTTP chat
//! endpoint, a local Ollama model, or a canned mock.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_core::provider::{CompletionClient, CompletionRequest};
//!
//! let request = CompletionRequest::from_transcript(&transcript, Some(1000));
//! let reply = client.complete(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{Transcript, WireMessage};

/// Default cap on reply length sent with each request
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Request body for the completion backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Whole conversation, oldest first
    pub messages: Vec<WireMessage>,

    /// Maximum reply length hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn from_transcript(transcript: &Transcript, max_tokens: Option<u32>) -> Self {
        Self {
            messages: transcript.to_wire(),
            max_tokens,
        }
    }

    /// Text of the newest user message, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Successful completion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReply {
    /// Reply text
    #[serde(rename = "response", alias = "text")]
    pub text: String,
}

impl CompletionReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Strategy trait for completion backends
///
/// The conversation manager works exclusively through this interface.
/// Futures are not required to be `Send`: the manager runs on a single
/// event loop (browser or current-thread runtime).
#[async_trait(?Send)]
pub trait CompletionClient {
    /// Produce a reply for the whole conversation
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::AssetId;
    use crate::message::Turn;

    #[test]
    fn test_request_body() {
        let mut transcript = Transcript::seeded("Hello!");
        transcript.push(Turn::user("sol?", Some(AssetId::Solana)));

        let request = CompletionRequest::from_transcript(&transcript, Some(DEFAULT_MAX_TOKENS));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(request.last_user_text(), Some("sol?"));

        let bare = serde_json::to_value(CompletionRequest::from_transcript(&transcript, None)).unwrap();
        assert!(bare.get("max_tokens").is_none());
    }

    #[test]
    fn test_reply_accepts_both_field_names() {
        let a: CompletionReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        let b: CompletionReply = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<CompletionReply>(r#"{"message":"hi"}"#).is_err());
    }
}
