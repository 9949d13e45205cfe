//! Response orchestration — decides who replies to a message, and drives
//! the asynchronous generation.
//!
//! DESIGN
//! ======
//! Routing runs on every newly appended user-authored entry, with the
//! author always excluded from its own mentions:
//!
//! - Rule A: automated participants were mentioned — each generates exactly
//!   one direct reply after an independent randomized delay, so replies may
//!   interleave in any order.
//! - Rule B: only non-automated participants were mentioned — nobody
//!   replies, not even the main bot.
//! - Rule C: nobody was mentioned — the main bot replies to the raw text,
//!   but only when the author is human.
//!
//! A scheduled reply re-validates its target's session at wake time; if an
//! intervening leave or mode switch released it, the reply is silently
//! abandoned. That re-check is the only guard against stale replies — the
//! race window between generation start and completion is a documented
//! contract, not a bug.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use super::chat::{ChatService, ReplyDelays};
use super::mention::resolve_mentions;
use crate::state::{MAIN_BOT_ID, Participant, ParticipantId};

// =============================================================================
// ROUTING
// =============================================================================

/// Apply rules A/B/C to a freshly appended user-authored entry.
///
/// `roster` is the snapshot taken at append time; scheduling decisions are
/// made against it, while delivery re-validates against live state.
pub(crate) fn route_entry(
    service: &Arc<ChatService>,
    roster: &[Participant],
    author: &Participant,
    text: &str,
) {
    let mentioned: Vec<&Participant> = resolve_mentions(text, roster)
        .into_iter()
        .filter(|p| p.id != author.id)
        .collect();
    let automated: Vec<&&Participant> = mentioned.iter().filter(|p| p.is_automated).collect();

    if !automated.is_empty() {
        // Rule A — every mentioned automated participant replies once.
        for target in automated {
            let delay = jittered_delay(&service.delays);
            info!(
                author = %author.name,
                target = %target.name,
                delay_ms = delay.as_millis() as u64,
                "routing: scheduling mentioned-responder reply"
            );
            schedule_reply(
                Arc::clone(service),
                target.id,
                direct_reply_prompt(&author.name, &target.name, text),
                delay,
            );
        }
    } else if !mentioned.is_empty() {
        // Rule B — only humans were addressed; no automated reply at all.
        debug!(author = %author.name, "routing: only humans mentioned, nobody replies");
    } else if !author.is_automated {
        // Rule C — unaddressed human message; the main bot picks it up.
        if roster.iter().any(|p| p.id == MAIN_BOT_ID) {
            info!(author = %author.name, "routing: scheduling main-bot reply");
            schedule_reply(Arc::clone(service), MAIN_BOT_ID, text.to_string(), service.delays.main_bot);
        }
    }
}

/// Prompt for a direct reply to the author, as the mentioned participant.
fn direct_reply_prompt(author: &str, target: &str, text: &str) -> String {
    format!(
        "You are the user named {target}. The user {author} just said this to you \
         in a chat: \"{text}\". Respond to them directly as {target}."
    )
}

/// Uniform random delay in `[mention_min, mention_min + mention_jitter)`.
fn jittered_delay(delays: &ReplyDelays) -> Duration {
    let jitter_ms = u64::try_from(delays.mention_jitter.as_millis()).unwrap_or(u64::MAX);
    let extra = if jitter_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..jitter_ms)
    };
    delays.mention_min + Duration::from_millis(extra)
}

// =============================================================================
// SCHEDULED DELIVERY
// =============================================================================

fn schedule_reply(service: Arc<ChatService>, target_id: ParticipantId, prompt: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        // Boxed: delivering a reply re-enters routing, which schedules more
        // deliveries; boxing erases the otherwise-recursive future type.
        let delivery: Pin<Box<dyn Future<Output = ()> + Send>> =
            Box::pin(deliver_reply(service, target_id, prompt));
        delivery.await;
    });
}

/// Generate and append one reply, or abandon it silently.
async fn deliver_reply(service: Arc<ChatService>, target_id: ParticipantId, prompt: String) {
    // Stale-session guard: the target may have left, or been switched back
    // to human, while this reply waited out its delay.
    let Some(session) = service.sessions.get(target_id) else {
        debug!(%target_id, "reply abandoned: session released before wake");
        return;
    };
    let Some(target) = service.participant(target_id).await else {
        debug!(%target_id, "reply abandoned: participant gone before wake");
        return;
    };

    let generated = session.lock().await.send(&prompt).await;
    match generated {
        Ok(text) if text.is_empty() => {
            debug!(target = %target.name, "reply dropped: empty generation");
        }
        Ok(text) => {
            let roster = service.append_reply(&target, &text).await;
            // Generated replies re-enter routing: the author exclusion stops
            // self-recursion, but other automated participants may be
            // legitimately mentioned and triggered.
            route_entry(&service, &roster, &target, &text);
        }
        Err(e) => {
            warn!(target = %target.name, error = %e, "reply dropped: generation failed");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
