#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use canopy_core::errors::{CanopyError, ExErrorKind};
use canopy_core::logging_facility::test_capture::init_test_capture;
use canopy_core::{log_op_end, log_op_error, log_op_start, LeafId, SeedRecord, Step, Store};
use canopy_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_ERR_KIND,
    FIELD_LEAF_COUNT, FIELD_LEAF_ID,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    assert_eq!(start_events, 1, "Should capture exactly one start event");
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = CanopyError::LeafNotFound {
        leaf_id: LeafId(9),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(
        events[0].field(FIELD_ERR_KIND),
        Some(format!("{:?}", ExErrorKind::NotFound).as_str())
    );
}

#[test]
fn test_set_field_emits_boundary_events() {
    // GIVEN a store with a leaf id unique to this test
    let capture = init_test_capture();
    let mut store = Store::plant(&vec![
        SeedRecord::new(9001, None),
        SeedRecord::new(9002, None),
    ])
    .unwrap();

    // WHEN a successful and a failing set_field run
    store.set_field(LeafId(9002), Step::parent(9001u64)).unwrap();
    store
        .set_field(LeafId(9002), Step::data("id", 1))
        .unwrap_err();

    // THEN each call logged a start and a matching end or end_error
    let ours: Vec<_> = capture
        .events_for("set_field")
        .into_iter()
        .filter(|e| e.field(FIELD_LEAF_ID) == Some("9002"))
        .collect();
    let kinds: Vec<_> = ours.iter().filter_map(|e| e.event.clone()).collect();
    assert_eq!(kinds, vec!["start", "end", "start", "end_error"]);
    assert_eq!(ours[3].field(FIELD_ERR_CODE), Some("ERR_IMMUTABLE_FIELD"));
}

#[test]
fn test_plant_emits_leaf_count() {
    let capture = init_test_capture();

    let _store = common::menu_store();

    let found = capture.count_events(|e| {
        e.op.as_deref() == Some("plant")
            && e.event.as_deref() == Some(EVENT_END)
            && e.field(FIELD_LEAF_COUNT) == Some("6")
    });
    assert!(found >= 1, "plant end event with leaf_count=6 not found");
}
