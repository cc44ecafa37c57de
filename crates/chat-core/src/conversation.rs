//! Conversation State Manager
//!
//! Owns the transcript and the "currently discussed asset" badge, drives the
//! completion backend, and persists after every mutation.
//!
//! ```text
//!   submit_user_message(text)
//!        │  detect(text) ──► mention
//!        ▼
//!   [user turn, mention] ──► persist ──► CompletionClient::complete(all turns)
//!                                             │
//!                         ok ◄────────────────┴───────────────► err
//!                          ▼                                    ▼
//!           [assistant turn, same mention]        [apology turn, no mention]
//!                          └──────────────► persist ◄───────────┘
//! ```
//!
//! State is published through a `tokio::sync::watch` channel; front ends call
//! [`ConversationManager::subscribe`] and re-render on change.

use std::rc::Rc;

use tokio::sync::watch;

use crate::detector::{detect, AssetId};
use crate::message::{Transcript, Turn};
use crate::provider::{CompletionClient, CompletionRequest, DEFAULT_MAX_TOKENS};
use crate::storage::{load_transcript, save_transcript, KeyValueStore, TRANSCRIPT_KEY};

/// Greeting that seeds a brand-new conversation
pub const WELCOME_GREETING: &str = "Hello! I'm your crypto assistant. Ask me anything about cryptocurrencies like Bitcoin, Ethereum, or blockchain technology.";

/// Greeting that replaces a cleared conversation
pub const CLEARED_GREETING: &str = "Chat history has been cleared. How can I help you today?";

/// Assistant text used when the completion backend fails
pub const APOLOGY_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Starter prompts offered while a conversation holds only its greeting
pub const SUGGESTIONS: [&str; 4] = [
    "Tell me about Bitcoin",
    "How does Ethereum work?",
    "What is blockchain?",
    "Compare BTC and ETH",
];

/// Conversation manager configuration
#[derive(Clone, Debug)]
pub struct ConversationConfig {
    /// Storage slot for the transcript
    pub storage_key: String,

    /// Reply length hint forwarded to the backend
    pub max_tokens: Option<u32>,

    /// Seed text for a new conversation
    pub welcome_greeting: String,

    /// Seed text after `clear`
    pub cleared_greeting: String,

    /// Text of the assistant turn appended on backend failure
    pub apology_text: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            storage_key: TRANSCRIPT_KEY.into(),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            welcome_greeting: WELCOME_GREETING.into(),
            cleared_greeting: CLEARED_GREETING.into(),
            apology_text: APOLOGY_TEXT.into(),
        }
    }
}

/// Observable conversation state
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationState {
    /// Full history, never empty
    pub transcript: Transcript,

    /// Most recently detected asset (badge); `None` until something is detected
    pub current_asset: Option<AssetId>,

    /// A completion request is in flight
    pub pending: bool,

    /// Bumped whenever the transcript is replaced wholesale
    generation: u64,
}

impl ConversationState {
    fn seeded(greeting: &str) -> Self {
        Self {
            transcript: Transcript::seeded(greeting),
            current_asset: None,
            pending: false,
            generation: 0,
        }
    }

    fn replace(&mut self, transcript: Transcript) {
        self.transcript = transcript;
        self.current_asset = None;
        self.generation += 1;
    }
}

/// What happened to a submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank text, nothing changed
    Ignored,
    /// Another request is in flight, nothing changed
    Busy,
    /// Reply appended
    Answered,
    /// Backend failed, apology appended
    Failed,
}

/// The conversation state manager
pub struct ConversationManager {
    completion: Rc<dyn CompletionClient>,
    store: Rc<dyn KeyValueStore>,
    config: ConversationConfig,
    state: watch::Sender<ConversationState>,
}

impl ConversationManager {
    /// Create a manager seeded with the welcome greeting.
    ///
    /// Call [`initialize`](Self::initialize) to restore persisted history.
    pub fn new(
        completion: Rc<dyn CompletionClient>,
        store: Rc<dyn KeyValueStore>,
        config: ConversationConfig,
    ) -> Self {
        let (state, _) = watch::channel(ConversationState::seeded(&config.welcome_greeting));
        Self {
            completion,
            store,
            config,
            state,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(completion: Rc<dyn CompletionClient>, store: Rc<dyn KeyValueStore>) -> Self {
        Self::new(completion, store, ConversationConfig::default())
    }

    /// Restore the persisted transcript, falling back to the welcome greeting
    pub fn initialize(&self) {
        let transcript = match load_transcript(&*self.store, &self.config.storage_key) {
            Ok(Some(transcript)) => {
                tracing::info!(turns = transcript.len(), "Restored chat history");
                transcript
            }
            Ok(None) => Transcript::seeded(&self.config.welcome_greeting),
            Err(e) => {
                tracing::warn!("Discarding persisted chat history: {}", e);
                Transcript::seeded(&self.config.welcome_greeting)
            }
        };

        self.state.send_modify(|s| s.replace(transcript));
        self.persist();
    }

    /// Send a user message and append the reply.
    ///
    /// Blank text is ignored and a second call while one is in flight is
    /// rejected; neither touches the transcript.
    pub async fn submit_user_message(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let mention = detect(text);
        let mut started = None;
        self.state.send_if_modified(|s| {
            if s.pending {
                return false;
            }
            s.transcript.push(Turn::user(text, mention));
            if mention.is_some() {
                s.current_asset = mention;
            }
            s.pending = true;
            started = Some((
                CompletionRequest::from_transcript(&s.transcript, self.config.max_tokens),
                s.generation,
            ));
            true
        });

        let Some((request, generation)) = started else {
            tracing::debug!("Rejected submission while a reply is pending");
            return SubmitOutcome::Busy;
        };
        self.persist();

        tracing::debug!(
            backend = self.completion.name(),
            messages = request.messages.len(),
            "Requesting completion"
        );
        let (reply, outcome) = match self.completion.complete(&request).await {
            Ok(reply) => (Turn::assistant(reply.text, mention), SubmitOutcome::Answered),
            Err(e) => {
                tracing::warn!(backend = self.completion.name(), "Completion failed: {}", e);
                (
                    Turn::assistant(self.config.apology_text.clone(), None),
                    SubmitOutcome::Failed,
                )
            }
        };

        self.state.send_modify(|s| {
            s.pending = false;
            if s.generation == generation {
                s.transcript.push(reply);
            } else {
                tracing::debug!("Dropping reply for a conversation that was replaced");
            }
        });
        self.persist();

        outcome
    }

    /// Reset to a single greeting turn and clear the asset badge
    pub fn clear(&self) {
        if let Err(e) = self.store.delete(&self.config.storage_key) {
            tracing::warn!("Failed to delete chat history: {}", e);
        }
        self.state
            .send_modify(|s| s.replace(Transcript::seeded(&self.config.cleared_greeting)));
        self.persist();
        tracing::info!("Chat history cleared");
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Copy of the current transcript
    pub fn transcript(&self) -> Transcript {
        self.state.borrow().transcript.clone()
    }

    pub fn current_asset(&self) -> Option<AssetId> {
        self.state.borrow().current_asset
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    fn persist(&self) {
        let state = self.state.borrow();
        if let Err(e) = save_transcript(&*self.store, &self.config.storage_key, &state.transcript) {
            tracing::warn!("Failed to persist chat history: {}", e);
        }
    }
}
