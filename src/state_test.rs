use super::*;

// =============================================================================
// color_for
// =============================================================================

#[test]
fn color_for_is_deterministic() {
    assert_eq!(color_for("alice"), color_for("alice"));
    assert_eq!(color_for("ChatBot"), color_for("ChatBot"));
}

#[test]
fn color_for_returns_palette_hex() {
    let color = color_for("bob");
    assert!(color.starts_with('#'));
    assert_eq!(color.len(), 7);
}

#[test]
fn color_for_empty_name() {
    // Hash of the empty string is zero — first palette entry, no panic.
    assert_eq!(color_for(""), "#F87171");
}

#[test]
fn color_for_unicode_name_does_not_panic() {
    let color = color_for("héloïse★");
    assert!(color.starts_with('#'));
}

// =============================================================================
// Participant
// =============================================================================

#[test]
fn human_participants_get_unique_ids() {
    let a = Participant::human("alice");
    let b = Participant::human("alice");
    assert_ne!(a.id, b.id);
    assert!(!a.is_automated);
}

#[test]
fn human_id_is_never_the_bot_sentinel() {
    for _ in 0..100 {
        assert_ne!(Participant::human("x").id, MAIN_BOT_ID);
    }
}

#[test]
fn main_bot_record() {
    let bot = Participant::main_bot();
    assert_eq!(bot.id, MAIN_BOT_ID);
    assert_eq!(bot.name, MAIN_BOT_NAME);
    assert!(bot.is_automated);
}

// =============================================================================
// ChatEntry
// =============================================================================

#[test]
fn user_entry_fields() {
    let entry = ChatEntry::user("alice", "hello", "#60A5FA");
    assert_eq!(entry.author, "alice");
    assert_eq!(entry.text, "hello");
    assert_eq!(entry.kind, EntryKind::User);
    assert_eq!(entry.color, "#60A5FA");
}

#[test]
fn system_entry_fields() {
    let entry = ChatEntry::system("alice has joined the chat.");
    assert_eq!(entry.author, SYSTEM_AUTHOR);
    assert_eq!(entry.kind, EntryKind::System);
    assert_eq!(entry.color, SYSTEM_COLOR);
}

#[test]
fn entry_ids_are_unique() {
    let a = ChatEntry::system("x");
    let b = ChatEntry::system("x");
    assert_ne!(a.id, b.id);
}

#[test]
fn entry_serde_round_trip() {
    let entry = ChatEntry::user("alice", "hi there", "#F87171");
    let json = serde_json::to_string(&entry).unwrap();
    let restored: ChatEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.id, entry.id);
    assert_eq!(restored.author, "alice");
    assert_eq!(restored.kind, EntryKind::User);
}

#[test]
fn entry_kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&EntryKind::User).unwrap(), "\"user\"");
    assert_eq!(serde_json::to_string(&EntryKind::System).unwrap(), "\"system\"");
}

// =============================================================================
// ChatState
// =============================================================================

#[test]
fn name_taken_is_case_insensitive() {
    let mut state = ChatState::new();
    state.roster.push(test_helpers::human("Alice"));
    assert!(state.name_taken("alice"));
    assert!(state.name_taken("ALICE"));
    assert!(!state.name_taken("bob"));
}

#[test]
fn name_taken_after_remove_is_reclaimable() {
    let mut state = ChatState::new();
    let alice = test_helpers::human("Alice");
    let id = alice.id;
    state.roster.push(alice);
    assert!(state.name_taken("alice"));
    state.remove(id);
    assert!(!state.name_taken("alice"));
}

#[test]
fn find_and_remove() {
    let mut state = ChatState::new();
    let p = test_helpers::human("bob");
    let id = p.id;
    state.roster.push(p);
    assert!(state.find(id).is_some());
    let removed = state.remove(id).unwrap();
    assert_eq!(removed.name, "bob");
    assert!(state.find(id).is_none());
    assert!(state.remove(id).is_none());
}

#[test]
fn find_mut_flips_automation() {
    let mut state = ChatState::new();
    let p = test_helpers::human("carol");
    let id = p.id;
    state.roster.push(p);
    state.find_mut(id).unwrap().is_automated = true;
    assert!(state.find(id).unwrap().is_automated);
}
