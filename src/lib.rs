pub mod backend;
pub mod classify;
pub mod config;
pub mod content;
pub mod error;
pub mod hooks;
pub mod ledger;
pub mod proof;
pub mod render;
pub mod session;
pub mod types;

pub use error::{ChatError, ChatResult};
pub use session::{ChatSession, TurnOutcome, TurnPhase};
