//! Chat service — connection lifecycle, message flow, and the public
//! surface the (external) UI layer drives.
//!
//! DESIGN
//! ======
//! `ChatService` is the single authoritative owner of the log and roster.
//! All mutation happens under one `RwLock` write guard, and every mutation
//! finishes with a bus publish carrying a full snapshot before the guard is
//! released — subscribers observe each mutation exactly once, in order.
//!
//! The main bot (`ChatBot`, reserved nil id) is auto-managed: it starts
//! when the first human joins and is torn down when, after a leave, it
//! would be the sole remaining participant.
//!
//! ERROR HANDLING
//! ==============
//! `join` is the only operation with a typed rejection (`NameTaken`).
//! Operations on a stale participant id are silent no-ops because the
//! participant may simply have left already. Generation failures never
//! reach this module; they are absorbed at the reply site.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::orchestrator;
use super::session::{InstructionProfile, SessionRegistry};
use crate::bus::{Bus, Event, EventKind, SubscriptionId};
use crate::llm::LlmChat;
use crate::state::{ChatEntry, ChatState, MAIN_BOT_ID, Participant, ParticipantId};

const GREETING: &str = "Hello everyone! I'm here to chat and answer your questions. \
                        Mention users with @username to talk to them directly!";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("display name already taken: {name}")]
    NameTaken { name: String },
}

/// Reply scheduling knobs. Tests shrink or stretch these; production uses
/// the defaults.
#[derive(Debug, Clone, Copy)]
pub struct ReplyDelays {
    /// Minimum delay before a mentioned responder starts generating.
    pub mention_min: std::time::Duration,
    /// Width of the uniform random jitter added to `mention_min`.
    pub mention_jitter: std::time::Duration,
    /// Fixed delay before an unaddressed message reaches the main bot.
    pub main_bot: std::time::Duration,
    /// Delay before the main bot's greeting after it starts.
    pub greeting: std::time::Duration,
}

impl Default for ReplyDelays {
    fn default() -> Self {
        Self {
            mention_min: std::time::Duration::from_millis(500),
            mention_jitter: std::time::Duration::from_millis(500),
            main_bot: std::time::Duration::from_millis(500),
            greeting: std::time::Duration::from_millis(1000),
        }
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// The chat engine. Construct once per room, share via `Arc`.
pub struct ChatService {
    state: RwLock<ChatState>,
    bus: Bus,
    pub(crate) sessions: SessionRegistry,
    pub(crate) llm: Arc<dyn LlmChat>,
    pub(crate) delays: ReplyDelays,
}

impl ChatService {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>) -> Arc<Self> {
        Self::with_delays(llm, ReplyDelays::default())
    }

    #[must_use]
    pub fn with_delays(llm: Arc<dyn LlmChat>, delays: ReplyDelays) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(ChatState::new()),
            bus: Bus::new(),
            sessions: SessionRegistry::new(),
            llm,
            delays,
        })
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a handler for `message` or `roster-update` events.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    /// Remove a previously registered handler.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(kind, id)
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Full copy of the message log, isolated from later mutation.
    pub async fn log(&self) -> Vec<ChatEntry> {
        self.state.read().await.entries.clone()
    }

    /// Full copy of the roster, isolated from later mutation.
    pub async fn roster(&self) -> Vec<Participant> {
        self.state.read().await.roster.clone()
    }

    pub(crate) async fn participant(&self, id: ParticipantId) -> Option<Participant> {
        self.state.read().await.find(id).cloned()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Connect a human participant.
    ///
    /// Starts the main bot if it is not already running.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NameTaken`] on a case-insensitive name collision
    /// with any connected participant; no state changes in that case.
    pub async fn join(self: &Arc<Self>, name: &str) -> Result<Participant, ChatError> {
        let (participant, bot_started) = {
            let mut state = self.state.write().await;
            if state.name_taken(name) {
                debug!(%name, "join rejected: name taken");
                return Err(ChatError::NameTaken { name: name.to_string() });
            }

            let participant = Participant::human(name);
            state.roster.push(participant.clone());
            state
                .entries
                .push(ChatEntry::system(format!("{name} has joined the chat.")));
            self.bus.publish(&Event::Message(state.entries.clone()));
            self.bus.publish(&Event::RosterUpdate(state.roster.clone()));

            let bot_started = state.find(MAIN_BOT_ID).is_none();
            if bot_started {
                state.roster.push(Participant::main_bot());
                self.sessions
                    .create(MAIN_BOT_ID, &InstructionProfile::MainBot, Arc::clone(&self.llm));
                self.bus.publish(&Event::RosterUpdate(state.roster.clone()));
            }
            (participant, bot_started)
        };

        info!(name = %participant.name, id = %participant.id, bot_started, "participant joined");
        if bot_started {
            self.schedule_greeting();
        }
        Ok(participant)
    }

    /// Disconnect a participant. Unknown ids are a silent no-op.
    ///
    /// Tears the main bot down as well when the post-leave roster is
    /// exactly the bot.
    pub async fn leave(self: &Arc<Self>, id: ParticipantId) {
        let mut state = self.state.write().await;
        let Some(participant) = state.remove(id) else {
            debug!(%id, "leave ignored: unknown participant");
            return;
        };
        self.sessions.release(id);
        state
            .entries
            .push(ChatEntry::system(format!("{} has left the chat.", participant.name)));
        self.bus.publish(&Event::Message(state.entries.clone()));
        self.bus.publish(&Event::RosterUpdate(state.roster.clone()));
        info!(name = %participant.name, %id, "participant left");

        // Keyed off post-leave roster content, not raw population size: the
        // bot goes down only when it is literally the last one standing.
        if state.roster.len() == 1 && state.roster[0].id == MAIN_BOT_ID {
            state.roster.clear();
            self.sessions.release(MAIN_BOT_ID);
            self.bus.publish(&Event::RosterUpdate(state.roster.clone()));
            info!("main bot stopped: no humans remain");
        }
    }

    /// Flip a participant's automation mode. Fixed for the main bot's
    /// reserved id; unknown ids and same-value flips are silent no-ops.
    pub async fn set_automated(self: &Arc<Self>, id: ParticipantId, automated: bool) {
        if id == MAIN_BOT_ID {
            debug!("set_automated ignored: main bot mode is fixed");
            return;
        }

        let mut state = self.state.write().await;
        let Some(participant) = state.find_mut(id) else {
            debug!(%id, "set_automated ignored: unknown participant");
            return;
        };
        if participant.is_automated == automated {
            return;
        }
        participant.is_automated = automated;
        let name = participant.name.clone();

        let notice = if automated {
            self.sessions
                .create(id, &InstructionProfile::Persona { name: name.clone() }, Arc::clone(&self.llm));
            format!("{name} is now controlled by AI.")
        } else {
            self.sessions.release(id);
            format!("{name} is now controlled by a human.")
        };
        state.entries.push(ChatEntry::system(notice));
        self.bus.publish(&Event::Message(state.entries.clone()));
        self.bus.publish(&Event::RosterUpdate(state.roster.clone()));
        info!(%name, automated, "participant mode changed");
    }

    // =========================================================================
    // MESSAGES
    // =========================================================================

    /// Append a message from a connected participant and kick off routing.
    ///
    /// Returns as soon as the entry is appended and broadcast; any automated
    /// replies are fire-and-forget. Unknown ids are a silent no-op.
    pub async fn send_message(self: &Arc<Self>, id: ParticipantId, text: &str) {
        let (author, roster) = {
            let mut state = self.state.write().await;
            let Some(author) = state.find(id).cloned() else {
                debug!(%id, "send_message ignored: unknown participant");
                return;
            };
            state
                .entries
                .push(ChatEntry::user(&author.name, text, &author.color));
            self.bus.publish(&Event::Message(state.entries.clone()));
            (author, state.roster.clone())
        };

        orchestrator::route_entry(self, &roster, &author, text);
    }

    /// Append a generated reply on behalf of an automated participant.
    /// Returns the roster snapshot for re-routing.
    pub(crate) async fn append_reply(&self, author: &Participant, text: &str) -> Vec<Participant> {
        let mut state = self.state.write().await;
        state
            .entries
            .push(ChatEntry::user(&author.name, text, &author.color));
        self.bus.publish(&Event::Message(state.entries.clone()));
        state.roster.clone()
    }

    fn schedule_greeting(self: &Arc<Self>) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(service.delays.greeting).await;
            let (bot, roster) = {
                let mut state = service.state.write().await;
                // Torn down before the greeting fired.
                let Some(bot) = state.find(MAIN_BOT_ID).cloned() else {
                    return;
                };
                state
                    .entries
                    .push(ChatEntry::user(&bot.name, GREETING, &bot.color));
                service.bus.publish(&Event::Message(state.entries.clone()));
                (bot, state.roster.clone())
            };
            orchestrator::route_entry(&service, &roster, &bot, GREETING);
        });
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
