//! Classification of backend replies into ledger entries.

use crate::error::ChatResult;
use crate::types::{ChatMessage, MessageKind};
use serde::Deserialize;
use serde_json::Value;

/// Canonical form of the reply's `type` marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseType {
    Image,
    Text,
    Other,
}

impl ResponseType {
    /// `"image"` and `"img"` are the same marker.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" | "img" => ResponseType::Image,
            "text" => ResponseType::Text,
            _ => ResponseType::Other,
        }
    }
}

/// What kind of result a reply turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultKind {
    Text,
    Image,
}

#[derive(Deserialize)]
struct RawReply {
    content: String,
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    prompt: Option<Value>,
    #[serde(default)]
    proof: Option<Value>,
}

/// A reply split into its display entry, replay entry and proof.
#[derive(Clone, Debug, PartialEq)]
pub struct Classified {
    pub kind: ResultKind,
    pub display: ChatMessage,
    pub api: ChatMessage,
    pub proof: Option<Value>,
}

/// Classify a raw response body.
///
/// An image result (explicit marker, or content that looks like a path) is
/// shown as the image but replayed to the backend as the prompt that made it.
pub fn classify_response(body: &str) -> ChatResult<Classified> {
    let reply: RawReply = serde_json::from_str(body)?;

    let marker = reply
        .kind
        .as_ref()
        .and_then(Value::as_str)
        .map(ResponseType::parse);
    let proof = reply.proof.filter(|p| !p.is_null());

    let is_image = marker == Some(ResponseType::Image) || reply.content.starts_with('/');
    if is_image {
        let replay = reply
            .prompt
            .as_ref()
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| reply.content.clone());

        return Ok(Classified {
            kind: ResultKind::Image,
            display: ChatMessage::assistant(reply.content, MessageKind::Image),
            api: ChatMessage::assistant(replay, MessageKind::Text),
            proof,
        });
    }

    let message = ChatMessage::assistant(reply.content, MessageKind::Text);
    Ok(Classified {
        kind: ResultKind::Text,
        display: message.clone(),
        api: message,
        proof,
    })
}

/// The `proof` field of any JSON body, whether or not it classifies.
///
/// Null or absent yields `Ok(None)`; only unparseable JSON is an error.
pub fn reply_proof(body: &str) -> ChatResult<Option<Value>> {
    let value: Value = serde_json::from_str(body)?;
    Ok(value.get("proof").filter(|p| !p.is_null()).cloned())
}
