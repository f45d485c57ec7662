//! One request/response cycle per submission.
//!
//! A [`ChatSession`] owns the ledger and drives each turn through
//! `Idle -> Building -> AwaitingResponse -> Idle`. The user entry is recorded
//! before the network call; the assistant pair is recorded only once the
//! reply has been classified. Every failure resolves to "no assistant entry,
//! loading cleared".

use crate::backend::{ChatBackend, HttpBackend};
use crate::classify::{ResultKind, classify_response, reply_proof};
use crate::config::Config;
use crate::content::{UserInput, build_user_message};
use crate::error::{ChatError, ChatResult};
use crate::ledger::Ledger;
use crate::types::ChatMessage;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Building,
    AwaitingResponse,
}

/// How a submission ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Reply classified and both assistant entries appended.
    Resolved(ResultKind),
    /// The turn ended without an assistant entry.
    Failed(ChatError),
    /// Another turn was in flight; nothing happened.
    Busy,
}

impl TurnOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TurnOutcome::Resolved(_))
    }

    pub fn error(&self) -> Option<&ChatError> {
        match self {
            TurnOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

struct SessionState {
    ledger: Ledger,
    phase: TurnPhase,
    cancel: Option<CancellationToken>,
}

/// Handle to a conversation. Clones share the same ledger and loading flag.
#[derive(Clone)]
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    state: Arc<Mutex<SessionState>>,
    loading: Arc<AtomicBool>,
    timeout: Duration,
}

/// Clears the loading flag and turn state however the turn exits.
struct LoadingGuard {
    state: Arc<Mutex<SessionState>>,
    loading: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        {
            let mut state = lock(&self.state);
            state.phase = TurnPhase::Idle;
            state.cancel = None;
        }
        self.loading.store(false, Ordering::Release);
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChatSession {
    pub fn new(backend: impl ChatBackend + 'static, timeout: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Arc::new(Mutex::new(SessionState {
                ledger: Ledger::new(),
                phase: TurnPhase::Idle,
                cancel: None,
            })),
            loading: Arc::new(AtomicBool::new(false)),
            timeout,
        }
    }

    /// Session talking to the configured HTTP endpoint.
    pub fn from_config(config: &Config) -> Self {
        Self::new(HttpBackend::from_config(config), config.timeout)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> TurnPhase {
        lock(&self.state).phase
    }

    /// Read access to the ledger without copying it.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&lock(&self.state).ledger)
    }

    pub fn display_log(&self) -> Vec<ChatMessage> {
        self.with_ledger(|ledger| ledger.display_log().to_vec())
    }

    pub fn api_log(&self) -> Vec<ChatMessage> {
        self.with_ledger(|ledger| ledger.api_log().to_vec())
    }

    pub fn latest_proof(&self) -> Option<Value> {
        self.with_ledger(|ledger| ledger.latest_proof().cloned())
    }

    /// Abort the in-flight turn, if any. Returns whether there was one.
    pub fn cancel(&self) -> bool {
        match &lock(&self.state).cancel {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Run one turn. A call made while another turn is loading is a no-op.
    pub async fn submit(&self, input: UserInput) -> TurnOutcome {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("submission ignored: a turn is already in flight");
            return TurnOutcome::Busy;
        }
        let _guard = LoadingGuard {
            state: Arc::clone(&self.state),
            loading: Arc::clone(&self.loading),
        };

        let token = CancellationToken::new();
        {
            let mut state = lock(&self.state);
            state.phase = TurnPhase::Building;
            state.cancel = Some(token.clone());
        }

        let built = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ChatError::Cancelled),
            built = build_user_message(&input) => built,
        };
        let user = match built {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "user message not recorded");
                return TurnOutcome::Failed(err);
            }
        };

        let snapshot = {
            let mut state = lock(&self.state);
            state.ledger.append_user(user);
            state.phase = TurnPhase::AwaitingResponse;
            state.ledger.snapshot_for_request()
        };
        debug!(messages = snapshot.len(), "sending conversation");

        let body = match self.exchange(&snapshot, &token).await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "turn ended without a reply");
                return TurnOutcome::Failed(err);
            }
        };

        let mut state = lock(&self.state);
        // any parseable reply replaces the proof, even one that fails classification
        if let Ok(proof) = reply_proof(&body) {
            state.ledger.record_proof(proof);
        }
        match classify_response(&body) {
            Ok(classified) => {
                let kind = classified.kind;
                state.ledger.append_assistant(
                    classified.display.with_proof(classified.proof),
                    classified.api,
                );
                info!(?kind, turns = state.ledger.len(), "turn resolved");
                TurnOutcome::Resolved(kind)
            }
            Err(err) => {
                warn!(error = %err, "reply could not be classified");
                TurnOutcome::Failed(err)
            }
        }
    }

    async fn exchange(
        &self,
        messages: &[ChatMessage],
        token: &CancellationToken,
    ) -> ChatResult<String> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ChatError::Cancelled),
            _ = tokio::time::sleep(self.timeout) => {
                token.cancel();
                Err(ChatError::TimedOut(self.timeout))
            }
            reply = self.backend.send(messages) => reply,
        }
    }
}
