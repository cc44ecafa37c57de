//! Runtime Configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded by
//! the binaries before this runs).
//!
//! | Variable                  | Default                 |
//! |---------------------------|-------------------------|
//! | `CHAT_API_BASE`           | `http://localhost:3000` |
//! | `CHAT_MAX_TOKENS`         | `1000`                  |
//! | `CHAT_COMPLETION_BACKEND` | `http`                  |
//! | `CHAT_CHART_BACKEND`      | `http`                  |
//! | `CHAT_HISTORY_DIR`        | `.crypto-chat`          |
//! | `CHAT_TIMEOUT_SECS`       | `30`                    |
//! | `OLLAMA_HOST`             | `http://localhost`      |
//! | `OLLAMA_PORT`             | `11434`                 |
//! | `OLLAMA_MODEL`            | `llama3.2`              |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chat_core::error::{ChatError, Result};
use chat_core::provider::DEFAULT_MAX_TOKENS;

/// Where assistant replies come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompletionBackend {
    /// `POST {api_base}/api/chat`
    #[default]
    Http,
    /// Local Ollama model
    Ollama,
    /// Canned answers, no network
    Mock,
}

impl FromStr for CompletionBackend {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => Err(ChatError::Config(format!("unknown completion backend '{other}'"))),
        }
    }
}

/// Where price series come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartBackend {
    /// `GET {api_base}/api/crypto`
    #[default]
    Http,
    /// CoinGecko directly, mock data when it is unreachable
    CoinGecko,
    /// Generated series, no network
    Mock,
}

impl FromStr for ChartBackend {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "coingecko" => Ok(Self::CoinGecko),
            "mock" => Ok(Self::Mock),
            other => Err(ChatError::Config(format!("unknown chart backend '{other}'"))),
        }
    }
}

/// Ollama connection settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model to chat with
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2".into(),
        }
    }
}

/// Runtime configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Base URL of the chat and market-data endpoints
    pub api_base: String,

    /// Reply length hint sent with each completion
    pub max_tokens: u32,

    pub completion_backend: CompletionBackend,

    pub chart_backend: ChartBackend,

    /// Directory holding the persisted transcript
    pub history_dir: PathBuf,

    /// HTTP request timeout
    pub timeout: Duration,

    pub ollama: OllamaConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3000".into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            completion_backend: CompletionBackend::default(),
            chart_backend: ChartBackend::default(),
            history_dir: PathBuf::from(".crypto-chat"),
            timeout: Duration::from_secs(30),
            ollama: OllamaConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_base = lookup("CHAT_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let max_tokens = parse_or("CHAT_MAX_TOKENS", &lookup, defaults.max_tokens)?;
        let completion_backend = lookup("CHAT_COMPLETION_BACKEND")
            .map(|v| v.parse::<CompletionBackend>())
            .transpose()?
            .unwrap_or_default();
        let chart_backend = lookup("CHAT_CHART_BACKEND")
            .map(|v| v.parse::<ChartBackend>())
            .transpose()?
            .unwrap_or_default();
        let history_dir = lookup("CHAT_HISTORY_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.history_dir);
        let timeout = Duration::from_secs(parse_or("CHAT_TIMEOUT_SECS", &lookup, 30)?);

        let ollama = OllamaConfig {
            host: lookup("OLLAMA_HOST").unwrap_or(defaults.ollama.host),
            port: parse_or("OLLAMA_PORT", &lookup, defaults.ollama.port)?,
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama.model),
        };

        Ok(Self {
            api_base,
            max_tokens,
            completion_backend,
            chart_backend,
            history_dir,
            timeout,
            ollama,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T> {
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| ChatError::Config(format!("{key} has invalid value '{raw}'")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.api_base, "http://localhost:3000");
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.ollama.port, 11434);
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("CHAT_API_BASE", "https://chat.example.com/"),
            ("CHAT_MAX_TOKENS", "256"),
            ("CHAT_COMPLETION_BACKEND", "Mock"),
            ("CHAT_CHART_BACKEND", "coingecko"),
            ("CHAT_TIMEOUT_SECS", "5"),
            ("OLLAMA_MODEL", "mistral"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "https://chat.example.com");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.completion_backend, CompletionBackend::Mock);
        assert_eq!(config.chart_backend, ChartBackend::CoinGecko);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.ollama.model, "mistral");
    }

    #[test]
    fn test_invalid_values() {
        assert!(RuntimeConfig::from_lookup(lookup(&[("CHAT_MAX_TOKENS", "lots")])).is_err());
        assert!(RuntimeConfig::from_lookup(lookup(&[("CHAT_CHART_BACKEND", "bloomberg")])).is_err());
        assert!(RuntimeConfig::from_lookup(lookup(&[("OLLAMA_PORT", "99999")])).is_err());
    }
}
