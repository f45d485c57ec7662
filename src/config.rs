use crate::error::{ChatError, ChatResult};
use std::env;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/chat";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for the chat endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Budget for one request, applied to every submission.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Read `CHAT_ENDPOINT`, `CHAT_API_KEY` and `CHAT_TIMEOUT_SECS`.
    pub fn from_env() -> ChatResult<Self> {
        let endpoint = env::var("CHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let api_key = env::var("CHAT_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let timeout = match env::var("CHAT_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            endpoint,
            api_key,
            timeout,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_timeout(raw: &str) -> ChatResult<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ChatError::Config(format!("CHAT_TIMEOUT_SECS is not a number: {raw}")))?;
    if secs == 0 {
        return Err(ChatError::Config(
            "CHAT_TIMEOUT_SECS must be positive".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
