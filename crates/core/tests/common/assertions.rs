//! Custom assertion helpers for integration tests.

use pg_protocol::ipc::Event;
use pg_protocol::run_models::ProgressSnapshot;
use tokio::sync::mpsc;

/// Assert that progress never decreases across `snapshots`.
#[allow(dead_code)]
pub fn assert_non_decreasing(snapshots: &[ProgressSnapshot]) {
    for pair in snapshots.windows(2) {
        assert!(
            pair[0].progress <= pair[1].progress,
            "progress went from {} to {}",
            pair[0].progress,
            pair[1].progress
        );
    }
}

/// Assert that `prefix` is a prefix of `full`.
#[allow(dead_code)]
pub fn assert_is_prefix(prefix: &[String], full: &[String]) {
    assert!(
        full.starts_with(prefix),
        "{prefix:?} is not a prefix of {full:?}"
    );
}

/// Assert that events open with RunStarted and end with a terminal event.
#[allow(dead_code)]
pub fn assert_event_sequence(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");

    assert!(
        matches!(events[0], Event::RunStarted { .. }),
        "First event should be RunStarted, got: {:?}",
        events[0]
    );

    let last = &events[events.len() - 1];
    assert!(
        matches!(last, Event::RunCompleted { .. } | Event::RunFailed { .. }),
        "Last event should be RunCompleted or RunFailed, got: {last:?}"
    );
}

/// Names of stages reported as completed, in order.
#[allow(dead_code)]
pub fn completed_stages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StageCompleted { stage, .. } => Some(stage.clone()),
            _ => None,
        })
        .collect()
}

/// Drain every event currently buffered in `rx`.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
