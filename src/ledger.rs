use crate::types::ChatMessage;
use serde_json::Value;

/// The two append-only message logs of a conversation.
///
/// `display_log` feeds the renderer, `api_log` is replayed to the backend.
/// Entries at the same index always belong to the same turn and role.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    display: Vec<ChatMessage>,
    api: Vec<ChatMessage>,
    latest_proof: Option<Value>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, message: ChatMessage) {
        self.display.push(message.clone());
        self.api.push(message);
    }

    pub fn append_assistant(&mut self, display: ChatMessage, api: ChatMessage) {
        debug_assert_eq!(display.role, api.role);
        self.display.push(display);
        self.api.push(api);
    }

    /// Overwrite the latest proof. `None` clears it.
    pub fn record_proof(&mut self, proof: Option<Value>) {
        self.latest_proof = proof;
    }

    /// Owned copy of the replay log as it stands right now.
    pub fn snapshot_for_request(&self) -> Vec<ChatMessage> {
        self.api.clone()
    }

    pub fn display_log(&self) -> &[ChatMessage] {
        &self.display
    }

    pub fn api_log(&self) -> &[ChatMessage] {
        &self.api
    }

    pub fn latest_proof(&self) -> Option<&Value> {
        self.latest_proof.as_ref()
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Paired `(display, api)` entries in order.
    pub fn entries(&self) -> impl Iterator<Item = (&ChatMessage, &ChatMessage)> {
        self.display.iter().zip(self.api.iter())
    }
}
