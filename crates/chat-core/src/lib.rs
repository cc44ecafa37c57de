//! # chat-core
//!
//! Cryptocurrency mention detection and conversation state for the crypto
//! chat assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ConversationManager                        │
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │  Detector  │  │  Transcript  │  │  CompletionClient    │  │
//! │  │ (registry) │──│ (watch state)│──│  (Strategy)          │  │
//! │  └────────────┘  └──────┬───────┘  └──────────────────────┘  │
//! │                         │ KeyValueStore                       │
//! └─────────────────────────┼────────────────────────────────────┘
//!                           ▼
//!             ChartPanel ──► ChartClient (Strategy)
//! ```
//!
//! Backends are traits so the same logic runs in the browser, in a terminal,
//! and under test with fakes.

pub mod chart;
pub mod conversation;
pub mod detector;
pub mod error;
pub mod message;
pub mod provider;
pub mod storage;

pub use chart::{ChartClient, ChartPanel, ChartRequest, ChartStatus, FallbackChartClient, PriceSeries, Timeframe};
pub use conversation::{ConversationConfig, ConversationManager, ConversationState, SubmitOutcome, SUGGESTIONS};
pub use detector::{detect, AssetId};
pub use error::{ChatError, Result};
pub use message::{Role, Transcript, Turn, WireMessage};
pub use provider::{CompletionClient, CompletionReply, CompletionRequest};
pub use storage::{KeyValueStore, MemoryStore};
