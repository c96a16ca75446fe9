//! Tests for SessionFinalizer

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::rstest;

use feelflow::application::services::SessionFinalizer;
use feelflow::application::ApplicationError;
use feelflow::domain::{DomainError, NavInput, Navigator, PendingSelection, Taxonomy};
use feelflow::infrastructure::traits::{FixedClock, SessionStore};
use feelflow::infrastructure::InMemorySessionStore;

/// Walk A(A1, A2), B down to A2.
fn pending_a2() -> PendingSelection {
    let json = r#"[
        {"id": "a", "name": "A", "children": [{"id": "a1", "name": "A1"}, {"id": "a2", "name": "A2"}]},
        {"id": "b", "name": "B"}
    ]"#;
    let mut nav = Navigator::new(Arc::new(Taxonomy::from_json(json).unwrap()));
    nav.apply(NavInput::Advance).unwrap();
    nav.apply(NavInput::Skip).unwrap();
    nav.apply(NavInput::Advance).unwrap();
    nav.pending().unwrap().clone()
}

fn finalizer(store: Arc<InMemorySessionStore>) -> SessionFinalizer {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap());
    SessionFinalizer::new("user-1", Arc::new(clock), store)
}

#[test]
fn given_pending_a2_when_finalize_then_record_matches_selection() {
    let finalizer = finalizer(Arc::new(InMemorySessionStore::new()));

    let record = finalizer.finalize(&pending_a2(), 7, "deadline").unwrap();

    assert_eq!(record.user_id, "user-1");
    assert_eq!(record.emotion_path, vec!["A", "A2"]);
    assert_eq!(record.leaf_emotion, "A2");
    assert_eq!(record.intensity, 7);
    assert_eq!(record.trigger, "deadline");
    assert_eq!(record.timestamp, "2024-03-05T10:00:00.000Z");
}

#[test]
fn given_same_inputs_and_clock_when_finalizing_twice_then_records_equal() {
    let finalizer = finalizer(Arc::new(InMemorySessionStore::new()));
    let pending = pending_a2();

    let first = finalizer.finalize(&pending, 3, "x").unwrap();
    let second = finalizer.finalize(&pending, 3, "x").unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_finalize_when_not_persisted_then_store_untouched() {
    let store = Arc::new(InMemorySessionStore::new());
    let finalizer = finalizer(Arc::clone(&store));

    finalizer.finalize(&pending_a2(), 5, "").unwrap();

    assert!(store.all().is_empty());
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(10)]
fn given_intensity_in_range_when_finalize_then_accepted(#[case] intensity: i64) {
    let finalizer = finalizer(Arc::new(InMemorySessionStore::new()));

    let record = finalizer.finalize(&pending_a2(), intensity, "").unwrap();

    assert_eq!(i64::from(record.intensity), intensity);
}

#[rstest]
#[case(0)]
#[case(11)]
#[case(-1)]
#[case(i64::MAX)]
fn given_intensity_out_of_range_when_finalize_then_rejected(#[case] intensity: i64) {
    let finalizer = finalizer(Arc::new(InMemorySessionStore::new()));

    let err = finalizer.finalize(&pending_a2(), intensity, "").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::IntensityOutOfRange { value, min: 1, max: 10 })
            if value == intensity
    ));
}

#[rstest]
#[case(0, 0)]
#[case(200, 200)]
#[case(201, 200)]
#[case(500, 200)]
fn given_trigger_length_when_finalize_then_at_most_200_chars(
    #[case] len: usize,
    #[case] expected: usize,
) {
    let finalizer = finalizer(Arc::new(InMemorySessionStore::new()));
    let trigger = "ä".repeat(len);

    let record = finalizer.finalize(&pending_a2(), 5, &trigger).unwrap();

    assert_eq!(record.trigger.chars().count(), expected);
    assert!(trigger.starts_with(&record.trigger));
}

#[test]
fn given_record_when_persist_then_store_returns_it_for_user() {
    let store = Arc::new(InMemorySessionStore::new());
    let finalizer = finalizer(Arc::clone(&store));
    let record = finalizer.finalize(&pending_a2(), 7, "deadline").unwrap();

    let id = finalizer.persist(&record).unwrap();

    let sessions = store.sessions_for_user("user-1").unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, id);
    assert_eq!(sessions[0].record, record);
    assert!(store.sessions_for_user("someone-else").unwrap().is_empty());
}
