//! In-process multi-user chatroom engine with AI-controlled participants.
//!
//! DESIGN
//! ======
//! The crate is a library: the host application owns a [`ChatService`],
//! drives it through `join` / `leave` / `send_message` / `set_automated`,
//! and observes every change through the notification bus. There is no
//! network surface here; transports and UIs live in the embedding program.
//!
//! Module map:
//! - `state` — log entries, the roster, and the shared mutable state
//! - `bus` — typed publish/subscribe delivering full snapshots
//! - `services::chat` — the engine's public surface and lifecycle rules
//! - `services::mention` — `@name` resolution against the live roster
//! - `services::orchestrator` — who replies, with what delay
//! - `services::session` — per-responder conversational context
//! - `llm` — provider-neutral generation boundary (Anthropic, OpenAI)

pub mod bus;
pub mod llm;
pub mod services;
pub mod state;

pub use bus::{Bus, Event, EventKind, SubscriptionId};
pub use llm::types::{ChatResponse, ContentBlock, LlmChat, LlmError, Message};
pub use llm::{LlmClient, LlmConfig};
pub use services::chat::{ChatError, ChatService, ReplyDelays};
pub use state::{
    ChatEntry, EntryKind, MAIN_BOT_ID, MAIN_BOT_NAME, Participant, ParticipantId,
};
