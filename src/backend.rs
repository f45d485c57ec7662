use crate::config::Config;
use crate::error::{ChatError, ChatResult};
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Transport to the inference endpoint.
///
/// Implementations return the raw reply body; classification happens in the
/// session so every backend is judged by the same rules.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> ChatResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// `POST {messages}` to a JSON chat endpoint.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint.clone(), config.api_key.clone())
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, messages: &[ChatMessage]) -> ChatResult<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Status { status, body });
        }
        Ok(body)
    }
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<T> {
    async fn send(&self, messages: &[ChatMessage]) -> ChatResult<String> {
        (**self).send(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_wraps_messages() {
        let messages = vec![ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest {
            messages: &messages,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"messages": [{"role": "user", "content": "hi"}]})
        );
    }
}
