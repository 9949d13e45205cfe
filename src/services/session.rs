//! Responder sessions — persistent per-participant conversational context.
//!
//! DESIGN
//! ======
//! Each automated participant owns exactly one session holding its system
//! instruction and full turn history, so it "remembers" its own dialogue
//! independently of every other responder. The registry maps participant
//! ids to sessions; create and release are the only lifecycle events.
//!
//! The registry lock is a sync `Mutex` held only for map operations, never
//! across an await. Each session has its own async `Mutex` so one slow
//! generation serializes turns per responder without blocking the others.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::llm::types::{LlmError, Message};
use crate::llm::LlmChat;
use crate::state::ParticipantId;

const REPLY_MAX_TOKENS: u32 = 1024;

// =============================================================================
// INSTRUCTION PROFILES
// =============================================================================

/// How an automated participant is instructed to behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionProfile {
    /// The general-purpose main bot: responds broadly.
    MainBot,
    /// A user-designated automated participant: responds *as* that person.
    Persona { name: String },
}

impl InstructionProfile {
    /// Render the system instruction sent on every generation.
    #[must_use]
    pub fn instruction(&self) -> String {
        match self {
            Self::MainBot => "You are a helpful and friendly chatbot in a multi-user chatroom. \
                              Your name is ChatBot. Only answer general questions when no one \
                              else is being talked to. Be conversational and keep your answers \
                              relatively short."
                .to_string(),
            Self::Persona { name } => format!(
                "You are a user in a multi-user chatroom. Your name is {name}. Engage in \
                 conversation naturally and act like a real person with that name. Keep your \
                 answers relatively short."
            ),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One responder's conversational context. Turns accumulate across calls.
pub struct ResponderSession {
    llm: Arc<dyn LlmChat>,
    instruction: String,
    history: Vec<Message>,
}

impl ResponderSession {
    #[must_use]
    pub fn new(profile: &InstructionProfile, llm: Arc<dyn LlmChat>) -> Self {
        Self { llm, instruction: profile.instruction(), history: Vec::new() }
    }

    /// Send one prompt through the session, preserving prior turns.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if generation fails; the failed turn is not
    /// recorded in the history.
    pub async fn send(&mut self, prompt: &str) -> Result<String, LlmError> {
        self.history.push(Message::user(prompt));
        let response = match self
            .llm
            .chat(REPLY_MAX_TOKENS, &self.instruction, &self.history)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };
        let text = response.text();
        self.history.push(Message::assistant(text.clone()));
        Ok(text)
    }

    /// Number of recorded turns (user + assistant).
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

pub type SharedSession = Arc<tokio::sync::Mutex<ResponderSession>>;

/// Maps automated participant ids to their sessions. No session is ever
/// shared between two ids.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ParticipantId, SharedSession>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) the session bound to `id`.
    pub fn create(&self, id: ParticipantId, profile: &InstructionProfile, llm: Arc<dyn LlmChat>) {
        let session = Arc::new(tokio::sync::Mutex::new(ResponderSession::new(profile, llm)));
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(id, session);
        debug!(%id, ?profile, "session: created");
    }

    /// Look up the session bound to `id`, if it still exists.
    #[must_use]
    pub fn get(&self, id: ParticipantId) -> Option<SharedSession> {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .get(&id)
            .cloned()
    }

    /// Release the session bound to `id`. Returns `false` if none existed.
    pub fn release(&self, id: ParticipantId) -> bool {
        let removed = self
            .sessions
            .lock()
            .expect("session registry poisoned")
            .remove(&id)
            .is_some();
        if removed {
            debug!(%id, "session: released");
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .contains_key(&id)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
