use std::time::Duration;

/// Everything that can end a turn without an assistant reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("could not build message content: {0}")]
    ContentBuild(String),

    #[error("chat endpoint error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("malformed response: {0}")]
    Classification(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ChatError {
    /// Transport-class failures: status, network, timeout and cancellation.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatError::Status { .. }
                | ChatError::Transport(_)
                | ChatError::TimedOut(_)
                | ChatError::Cancelled
        )
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Classification(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
