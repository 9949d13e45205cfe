//! Notification bus — typed publish/subscribe for chat events.
//!
//! DESIGN
//! ======
//! Pure fan-out: no payload transformation. Two event kinds, each carrying
//! a full snapshot of the container it describes, so subscribers can never
//! mutate the store through what they receive.
//!
//! Handlers run synchronously on the publishing task and must not call
//! back into `ChatService` (it still holds the state lock when publishing).
//! A panicking handler is caught and logged; delivery continues to the
//! remaining subscribers. Delivery order across handlers is unspecified.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::state::{ChatEntry, Participant};

// =============================================================================
// EVENTS
// =============================================================================

/// The two event kinds the bus understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The message log changed.
    Message,
    /// The participant roster changed.
    RosterUpdate,
}

/// An event payload: a defensively-copied snapshot of the log or roster.
#[derive(Debug, Clone, Serialize)]
pub enum Event {
    Message(Vec<ChatEntry>),
    RosterUpdate(Vec<Participant>),
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::RosterUpdate(_) => EventKind::RosterUpdate,
        }
    }
}

// =============================================================================
// SUBSCRIPTIONS
// =============================================================================

/// Token returned by [`Bus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

/// Typed pub/sub registry.
#[derive(Default)]
pub struct Bus {
    registry: Mutex<Registry>,
}

impl Bus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().expect("bus registry poisoned");
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if the subscription was not found.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock().expect("bus registry poisoned");
        let Some(handlers) = registry.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub_id, _)| *sub_id != id);
        handlers.len() != before
    }

    /// Deliver an event to every current subscriber of its kind.
    ///
    /// Each handler invocation is isolated: a panic is caught and logged so
    /// one failing subscriber cannot block delivery to the rest.
    pub fn publish(&self, event: &Event) {
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock().expect("bus registry poisoned");
            registry
                .handlers
                .get(&event.kind())
                .map(|hs| hs.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                warn!(kind = ?event.kind(), "bus: subscriber panicked, continuing delivery");
            }
        }
    }

    /// Number of live subscriptions for one event kind.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        let registry = self.registry.lock().expect("bus registry poisoned");
        registry.handlers.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[path = "bus_test.rs"]
mod tests;
