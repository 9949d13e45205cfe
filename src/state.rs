//! Chat domain types and the authoritative in-memory store.
//!
//! DESIGN
//! ======
//! `ChatState` owns the two containers everything else only ever sees
//! copies of: the append-only message log and the participant roster.
//! All mutation goes through `ChatService`, which holds the state behind
//! a single `RwLock` and finishes every mutation with a bus publish.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Stable opaque identity of a connected participant.
pub type ParticipantId = Uuid;

/// Reserved id of the always-on main bot. Human participants are always
/// created with `Uuid::new_v4`, which can never collide with the nil id.
pub const MAIN_BOT_ID: ParticipantId = Uuid::nil();

/// Display name of the main bot.
pub const MAIN_BOT_NAME: &str = "ChatBot";

/// Author name stamped on system notices.
pub const SYSTEM_AUTHOR: &str = "System";

/// Muted color for system notices.
pub const SYSTEM_COLOR: &str = "#9E9E9E";

// =============================================================================
// COLOR ASSIGNMENT
// =============================================================================

const NAME_COLORS: &[&str] = &[
    "#F87171", "#FB923C", "#FBBF24", "#FACC15", "#A3E635", "#4ADE80", "#34D399",
    "#2DD4BF", "#22D3EE", "#38BDF8", "#60A5FA", "#818CF8", "#A78BFA", "#C084FC",
    "#E879F9", "#F472B6", "#FB7185",
];

/// Deterministically pick a display color for a name.
///
/// Same name, same color — cosmetic only, collisions between names are fine.
#[must_use]
pub fn color_for(name: &str) -> &'static str {
    let mut hash: i32 = 0;
    for c in name.chars() {
        hash = (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    NAME_COLORS[hash.unsigned_abs() as usize % NAME_COLORS.len()]
}

// =============================================================================
// PARTICIPANT
// =============================================================================

/// An entity that can author chat entries — human-driven or automated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Cosmetic display color (hex), not semantically load-bearing.
    pub color: String,
    /// `true` when replies for this participant are generated by an LLM.
    pub is_automated: bool,
}

impl Participant {
    /// Create a human participant with a fresh id.
    #[must_use]
    pub fn human(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color_for(name).to_string(),
            is_automated: false,
        }
    }

    /// The main bot's participant record.
    #[must_use]
    pub fn main_bot() -> Self {
        Self {
            id: MAIN_BOT_ID,
            name: MAIN_BOT_NAME.to_string(),
            color: color_for(MAIN_BOT_NAME).to_string(),
            is_automated: true,
        }
    }
}

// =============================================================================
// CHAT ENTRY
// =============================================================================

/// Log entry classification. System entries are informational and never
/// trigger mention resolution or automated replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    User,
    System,
}

/// A single immutable log entry. The log is append-only; entries are
/// never mutated or reordered after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    pub created_at: OffsetDateTime,
    pub kind: EntryKind,
    pub color: String,
}

impl ChatEntry {
    /// A user-authored entry (human-typed or LLM-generated).
    #[must_use]
    pub fn user(author: &str, text: &str, color: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.to_string(),
            text: text.to_string(),
            created_at: OffsetDateTime::now_utc(),
            kind: EntryKind::User,
            color: color.to_string(),
        }
    }

    /// A system notice (joins, leaves, mode changes).
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: SYSTEM_AUTHOR.to_string(),
            text: text.into(),
            created_at: OffsetDateTime::now_utc(),
            kind: EntryKind::System,
            color: SYSTEM_COLOR.to_string(),
        }
    }
}

// =============================================================================
// CHAT STATE
// =============================================================================

/// The authoritative containers: message log + roster.
#[derive(Debug, Default)]
pub struct ChatState {
    pub entries: Vec<ChatEntry>,
    pub roster: Vec<Participant>,
}

impl ChatState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive name collision check among connected participants.
    /// Departed names may be reclaimed.
    #[must_use]
    pub fn name_taken(&self, name: &str) -> bool {
        self.roster
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn find(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.roster.iter_mut().find(|p| p.id == id)
    }

    /// Remove a participant, returning the removed record if present.
    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        let idx = self.roster.iter().position(|p| p.id == id)?;
        Some(self.roster.remove(idx))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    #[must_use]
    pub fn human(name: &str) -> Participant {
        Participant::human(name)
    }

    /// An automated (persona) participant.
    #[must_use]
    pub fn automated(name: &str) -> Participant {
        let mut p = Participant::human(name);
        p.is_automated = true;
        p
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
