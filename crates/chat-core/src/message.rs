//! Conversation Turns
//!
//! Turn and transcript types shared by the state manager, the persistence
//! layer and the front ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detector::AssetId;
use crate::error::{ChatError, Result};

/// Role of a turn's author
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Assistant reply (or a synthetic greeting/apology)
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation, tagged with the asset it is about
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Author role
    pub role: Role,

    /// Text content
    #[serde(rename = "content")]
    pub text: String,

    /// Creation time, stored as RFC 3339
    #[serde(rename = "timestamp", default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Asset detected when the turn was created
    #[serde(rename = "cryptoSymbol", default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<AssetId>,
}

impl Turn {
    /// Create a new turn stamped with the current time
    pub fn new(role: Role, text: impl Into<String>, mention: Option<AssetId>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
            mention,
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>, mention: Option<AssetId>) -> Self {
        Self::new(Role::User, text, mention)
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>, mention: Option<AssetId>) -> Self {
        Self::new(Role::Assistant, text, mention)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Asset whose chart belongs next to this turn.
    ///
    /// Charts render alongside assistant replies only.
    pub fn chart_asset(&self) -> Option<AssetId> {
        match self.role {
            Role::Assistant => self.mention,
            Role::User => None,
        }
    }

    /// Relative age label ("just now", "5 min ago", "2 hours ago", "1 day ago")
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let elapsed_ms = (now - self.created_at).num_milliseconds();
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let mins = (elapsed_ms as f64 / 60_000.0).round() as i64;

        if mins < 1 {
            return "just now".into();
        }
        if mins < 60 {
            return format!("{mins} min ago");
        }

        let hours = mins / 60;
        if hours < 24 {
            return format!("{hours} hour{} ago", if hours > 1 { "s" } else { "" });
        }

        let days = hours / 24;
        format!("{days} day{} ago", if days > 1 { "s" } else { "" })
    }

    /// Reduce to the completion wire format
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.text.clone(),
        }
    }
}

/// `{role, content}` pair sent to the completion backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only conversation history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Transcript holding only an assistant greeting
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::assistant(greeting, None)],
        }
    }

    /// Parse a persisted transcript.
    ///
    /// An empty array is rejected: a live transcript always holds at least
    /// the greeting.
    pub fn from_json(raw: &str) -> Result<Self> {
        let transcript: Self = serde_json::from_str(raw)
            .map_err(|e| ChatError::MalformedTranscript(e.to_string()))?;
        if transcript.is_empty() {
            return Err(ChatError::MalformedTranscript("no turns".into()));
        }
        Ok(transcript)
    }

    /// Serialize for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Get all turns
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Get the last turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Most recent assistant turn that carries a chart
    pub fn latest_chart_asset(&self) -> Option<AssetId> {
        self.turns.iter().rev().find_map(Turn::chart_asset)
    }

    /// Whole history in the completion wire format
    pub fn to_wire(&self) -> Vec<WireMessage> {
        self.turns.iter().map(Turn::to_wire).collect()
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("Hello btc", Some(AssetId::Bitcoin));
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.text, "Hello btc");
        assert!(turn.is_user());
        assert_eq!(turn.chart_asset(), None);

        let reply = Turn::assistant("It is digital gold", Some(AssetId::Bitcoin));
        assert_eq!(reply.chart_asset(), Some(AssetId::Bitcoin));
    }

    #[test]
    fn test_persisted_shape() {
        let turn = Turn::user("eth?", Some(AssetId::Ethereum));
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "eth?");
        assert_eq!(value["cryptoSymbol"], "ethereum");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));

        let greeting = serde_json::to_value(Turn::assistant("hi", None)).unwrap();
        assert!(greeting.get("cryptoSymbol").is_none());
    }

    #[test]
    fn test_transcript_roundtrip_keeps_timestamps() {
        let mut transcript = Transcript::seeded("Hello!");
        transcript.push(Turn::user("sol", Some(AssetId::Solana)));
        let restored = Transcript::from_json(&transcript.to_json().unwrap()).unwrap();
        assert_eq!(restored, transcript);
    }

    #[test]
    fn test_missing_timestamp_and_null_mention_load() {
        let raw = r#"[{"role":"assistant","content":"Hello!","cryptoSymbol":null}]"#;
        let transcript = Transcript::from_json(raw).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].mention, None);
    }

    #[test]
    fn test_malformed_transcripts_rejected() {
        for raw in ["not json", "{}", "[]", r#"[{"role":"robot","content":"x"}]"#] {
            assert!(
                matches!(Transcript::from_json(raw), Err(ChatError::MalformedTranscript(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_wire_strips_mention() {
        let mut transcript = Transcript::seeded("Hello!");
        transcript.push(Turn::user("doge", Some(AssetId::Dogecoin)));
        let wire = serde_json::to_value(transcript.to_wire()).unwrap();
        assert_eq!(
            wire,
            serde_json::json!([
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "doge"},
            ])
        );
    }

    #[test]
    fn test_latest_chart_asset() {
        let mut transcript = Transcript::seeded("Hello!");
        assert_eq!(transcript.latest_chart_asset(), None);
        transcript.push(Turn::user("btc", Some(AssetId::Bitcoin)));
        transcript.push(Turn::assistant("...", Some(AssetId::Bitcoin)));
        transcript.push(Turn::user("and ada?", Some(AssetId::Cardano)));
        assert_eq!(transcript.latest_chart_asset(), Some(AssetId::Bitcoin));
    }

    #[test]
    fn test_age_label() {
        let turn = Turn::assistant("hi", None);
        let at = |d: Duration| turn.age_label(turn.created_at + d);
        assert_eq!(at(Duration::seconds(10)), "just now");
        assert_eq!(at(Duration::minutes(5)), "5 min ago");
        assert_eq!(at(Duration::minutes(60)), "1 hour ago");
        assert_eq!(at(Duration::hours(3)), "3 hours ago");
        assert_eq!(at(Duration::hours(24)), "1 day ago");
        assert_eq!(at(Duration::days(4)), "4 days ago");
    }
}
