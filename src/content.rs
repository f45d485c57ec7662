//! Construction of user messages from raw input.
//!
//! Text-only input becomes string content. An attached image turns the
//! message into a part list whose image part carries the file inlined as a
//! `data:` URL.

use crate::error::{ChatError, ChatResult};
use crate::types::{ChatMessage, Content, ContentPart};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::path::PathBuf;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file the user attached to a turn.
#[derive(Clone, Debug, PartialEq)]
pub enum Attachment {
    /// Read from disk at build time; MIME type guessed from the extension.
    Path(PathBuf),
    /// Already in memory.
    Bytes { mime: String, data: Vec<u8> },
}

impl Attachment {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(mime: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Read the attachment and encode it as an inline data URL.
    pub async fn to_data_url(&self) -> ChatResult<String> {
        match self {
            Attachment::Path(path) => {
                let data = tokio::fs::read(path).await.map_err(|e| {
                    ChatError::ContentBuild(format!("failed to read {}: {e}", path.display()))
                })?;
                let mime = mime_guess::from_path(path)
                    .first_raw()
                    .unwrap_or(FALLBACK_MIME);
                Ok(encode_data_url(mime, &data))
            }
            Attachment::Bytes { mime, data } => {
                let mime = if mime.trim().is_empty() {
                    FALLBACK_MIME
                } else {
                    mime.as_str()
                };
                Ok(encode_data_url(mime, data))
            }
        }
    }
}

/// Raw input from the composer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserInput {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

pub fn encode_data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(data))
}

/// Build the canonical user message for one turn.
///
/// The attachment read is the only await point. On failure no message is
/// produced and the caller must not touch the ledger.
pub async fn build_user_message(input: &UserInput) -> ChatResult<ChatMessage> {
    let text = input.text.trim();

    let Some(attachment) = &input.attachment else {
        return Ok(ChatMessage::user(Content::Text(text.to_string())));
    };

    let mut parts = Vec::with_capacity(2);
    if !text.is_empty() {
        parts.push(ContentPart::text(text));
    }
    parts.push(ContentPart::image(attachment.to_data_url().await?));

    Ok(ChatMessage::user(Content::Parts(parts)))
}
