//! Error Types

use thiserror::Error;

use crate::chart::CHART_ERROR_TEXT;
use crate::conversation::APOLOGY_TEXT;

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Chat error types
#[derive(Error, Debug)]
pub enum ChatError {
    /// Completion backend could not be reached or returned garbage
    #[error("Completion error: {0}")]
    Completion(String),

    /// Completion backend answered with a non-success status
    #[error("Completion backend returned status {0}")]
    CompletionStatus(u16),

    /// Chart backend could not be reached or returned a non-success status
    #[error("Chart error: {0}")]
    Chart(String),

    /// Price series failed validation
    #[error("Malformed price series: {0}")]
    MalformedSeries(String),

    /// Key-value storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted transcript could not be understood
    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    /// Unknown asset identifier
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// Unknown timeframe selector
    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Completion(_) | Self::CompletionStatus(_) => APOLOGY_TEXT.into(),
            Self::Chart(_) | Self::MalformedSeries(_) => CHART_ERROR_TEXT.into(),
            Self::UnknownAsset(id) => format!("'{id}' is not a supported cryptocurrency."),
            Self::UnknownTimeframe(tf) => {
                format!("'{tf}' is not a timeframe. Use one of 1D, 1W, 1M, 3M, 1Y.")
            }
            Self::Storage(_) | Self::MalformedTranscript(_) => {
                "Chat history could not be saved or restored.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        assert_eq!(
            ChatError::CompletionStatus(500).user_message(),
            "Sorry, I encountered an error. Please try again."
        );
        assert_eq!(ChatError::Chart("boom".into()).user_message(), CHART_ERROR_TEXT);
        assert_eq!(
            ChatError::MalformedSeries("3 timestamps but 2 prices".into()).user_message(),
            CHART_ERROR_TEXT
        );
        assert_eq!(
            ChatError::UnknownAsset("ripple".into()).user_message(),
            "'ripple' is not a supported cryptocurrency."
        );
    }
}
