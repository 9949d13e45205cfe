use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn message_event() -> Event {
    Event::Message(vec![ChatEntry::system("test notice")])
}

fn roster_event() -> Event {
    Event::RosterUpdate(vec![crate::state::test_helpers::human("alice")])
}

// =============================================================================
// subscribe / publish
// =============================================================================

#[test]
fn publish_reaches_subscriber() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    bus.subscribe(EventKind::Message, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish(&message_event());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn publish_reaches_all_subscribers_of_kind() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let counter = hits.clone();
        bus.subscribe(EventKind::Message, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    bus.publish(&message_event());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn publish_is_filtered_by_kind() {
    let bus = Bus::new();
    let message_hits = Arc::new(AtomicUsize::new(0));
    let roster_hits = Arc::new(AtomicUsize::new(0));

    let counter = message_hits.clone();
    bus.subscribe(EventKind::Message, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = roster_hits.clone();
    bus.subscribe(EventKind::RosterUpdate, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish(&roster_event());
    assert_eq!(message_hits.load(Ordering::SeqCst), 0);
    assert_eq!(roster_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn publish_with_no_subscribers_is_a_no_op() {
    let bus = Bus::new();
    bus.publish(&message_event());
}

#[test]
fn handler_receives_snapshot_payload() {
    let bus = Bus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(EventKind::Message, move |event| {
        if let Event::Message(entries) = event {
            sink.lock().unwrap().push(entries.len());
        }
    });

    bus.publish(&Event::Message(vec![
        ChatEntry::system("a"),
        ChatEntry::system("b"),
    ]));
    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

// =============================================================================
// unsubscribe
// =============================================================================

#[test]
fn unsubscribe_stops_delivery() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let id = bus.subscribe(EventKind::Message, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(bus.unsubscribe(EventKind::Message, id));
    bus.publish(&message_event());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn unsubscribe_unknown_id_returns_false() {
    let bus = Bus::new();
    let id = bus.subscribe(EventKind::Message, |_| {});
    // Wrong kind, then double-remove.
    assert!(!bus.unsubscribe(EventKind::RosterUpdate, id));
    assert!(bus.unsubscribe(EventKind::Message, id));
    assert!(!bus.unsubscribe(EventKind::Message, id));
}

#[test]
fn unsubscribe_leaves_other_subscribers_intact() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let id = bus.subscribe(EventKind::Message, |_| {});
    bus.subscribe(EventKind::Message, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.unsubscribe(EventKind::Message, id);
    bus.publish(&message_event());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(bus.subscriber_count(EventKind::Message), 1);
}

// =============================================================================
// handler isolation
// =============================================================================

#[test]
fn panicking_handler_does_not_block_others() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));

    bus.subscribe(EventKind::Message, |_| {
        panic!("subscriber blew up");
    });
    let counter = hits.clone();
    bus.subscribe(EventKind::Message, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish(&message_event());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn panicking_handler_does_not_poison_the_bus() {
    let bus = Bus::new();
    bus.subscribe(EventKind::Message, |_| panic!("boom"));
    bus.publish(&message_event());
    // The bus stays usable after a subscriber panic.
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    bus.subscribe(EventKind::Message, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    bus.publish(&message_event());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Event
// =============================================================================

#[test]
fn event_kind_mapping() {
    assert_eq!(message_event().kind(), EventKind::Message);
    assert_eq!(roster_event().kind(), EventKind::RosterUpdate);
}

#[test]
fn event_serializes() {
    let json = serde_json::to_value(roster_event()).unwrap();
    assert!(json.get("RosterUpdate").is_some());
}
