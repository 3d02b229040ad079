//! Activation Tests
//!
//! ## Scenarios Covered
//!
//! 1. Activating a leaf marks its trail current/parent/ancestor
//! 2. Re-activation after clearing
//! 3. Activation by data field (the current page's target)
//! 4. Activation deep in a chain reaches the root

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use canopy_core::{Activation, CanopyError, SeedRecord, Slot, Store};
use common::{id, menu_store};
use serde_json::json;

fn marker(store: &Store, raw: u64) -> Option<Activation> {
    store.get_leaf(id(raw)).unwrap().active
}

#[test]
fn test_activate_osu_marks_trail() {
    // GIVEN the menu
    let mut store = menu_store();
    assert!(!store.is_activated());

    // WHEN OSU is activated
    let trail = store.activate(id(66)).unwrap();

    // THEN OSU, Corvallis and Oregon carry their markers
    assert_eq!(trail, vec![id(66), id(55), id(22)]);
    assert_eq!(marker(&store, 66), Some(Activation::Current));
    assert_eq!(marker(&store, 55), Some(Activation::Parent));
    assert_eq!(marker(&store, 22), Some(Activation::Ancestor));

    // AND unrelated leaves stay unmarked
    assert_eq!(marker(&store, 44), None);
    assert_eq!(marker(&store, 33), None);
    assert_eq!(store.get_field(id(55), Slot::Active, None), Some(json!("parent")));
}

#[test]
fn test_activate_root_marks_only_itself() {
    let mut store = menu_store();

    let trail = store.activate(id(77)).unwrap();

    assert_eq!(trail, vec![id(77)]);
    assert_eq!(marker(&store, 77), Some(Activation::Current));
}

#[test]
fn test_activate_missing_leaf_fails() {
    let mut store = menu_store();
    let err = store.activate(id(404)).unwrap_err();
    assert_eq!(err, CanopyError::LeafNotFound { leaf_id: id(404) });
}

#[test]
fn test_clear_then_reactivate() {
    // GIVEN OSU is active
    let mut store = menu_store();
    store.activate(id(66)).unwrap();

    // WHEN markers are cleared and Portland is activated
    assert_eq!(store.clear_activation().unwrap(), 3);
    store.activate(id(44)).unwrap();

    // THEN only Portland's trail is marked
    assert_eq!(marker(&store, 66), None);
    assert_eq!(marker(&store, 55), None);
    assert_eq!(marker(&store, 44), Some(Activation::Current));
    assert_eq!(marker(&store, 22), Some(Activation::Parent));
}

#[test]
fn test_activate_where_target_matches() {
    // GIVEN the menu and the current page URL
    let mut store = menu_store();
    let url = json!("https://oregon.gov/corvallis/osu");

    // WHEN leaves targeting that URL are activated
    let matched = store.activate_where("target", &url).unwrap();

    // THEN OSU and its trail are marked
    assert_eq!(matched, vec![id(66)]);
    assert_eq!(marker(&store, 66), Some(Activation::Current));
    assert_eq!(marker(&store, 22), Some(Activation::Ancestor));

    // WHEN nothing matches
    let matched = store.activate_where("target", &json!("https://iowa.gov")).unwrap();

    // THEN the previous markers are gone
    assert!(matched.is_empty());
    assert!(!store.is_activated());
}

#[test]
fn test_activate_deep_leaf_marks_root() {
    // GIVEN a four-level chain 1 -> 2 -> 3 -> 4
    let seed = vec![
        SeedRecord::new(1, None),
        SeedRecord::new(2, Some(1)),
        SeedRecord::new(3, Some(2)),
        SeedRecord::new(4, Some(3)),
    ];
    let mut store = Store::plant(&seed).unwrap();
    assert_eq!(store.ancestor_path(id(4)), vec![id(1), id(2), id(3)]);

    // WHEN the bottom leaf is activated
    let trail = store.activate(id(4)).unwrap();

    // THEN the whole chain up to the root is marked
    assert_eq!(trail, vec![id(4), id(3), id(2), id(1)]);
    assert_eq!(marker(&store, 3), Some(Activation::Parent));
    assert_eq!(marker(&store, 2), Some(Activation::Ancestor));
    assert_eq!(marker(&store, 1), Some(Activation::Ancestor));
}
