//! Chat engine services.
//!
//! ARCHITECTURE
//! ============
//! `chat` owns the authoritative state and the public surface; `mention`
//! and `orchestrator` decide who replies to what; `session` keeps each
//! automated participant's conversational memory.

pub mod chat;
pub mod mention;
pub mod orchestrator;
pub mod session;
