//! Query Engine Tests
//!
//! ## Scenarios Covered
//!
//! 1. Slot reads through `get_field`
//! 2. Ancestor paths are root-first and exclude the leaf
//! 3. Sibling listings with and without the leaf itself
//! 4. Lookup by data field (locating the current leaf by target)

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use canopy_core::Slot;
use common::{id, menu_store};
use serde_json::json;

#[test]
fn test_get_field_reads_each_slot() {
    // GIVEN the menu
    let store = menu_store();

    // THEN each slot reads back in its untyped form
    assert_eq!(store.get_field(id(66), Slot::Parent, None), Some(json!(55)));
    assert_eq!(store.get_field(id(22), Slot::Children, None), Some(json!([44, 55])));
    assert_eq!(
        store.get_field(id(33), Slot::Data, Some("target")),
        Some(json!("https://california.gov"))
    );
    assert_eq!(store.get_field(id(33), Slot::Data, Some("missing")), None);
    assert_eq!(store.get_field(id(33), Slot::Active, None), None);
    assert_eq!(store.get_field(id(404), Slot::Parent, None), None);
}

#[test]
fn test_slot_names_parse() {
    assert_eq!("children".parse::<Slot>().unwrap(), Slot::Children);
    assert!("weight".parse::<Slot>().is_err());
}

#[test]
fn test_ancestor_path() {
    // GIVEN the menu
    let store = menu_store();

    // THEN paths are root-first and exclude the leaf itself
    assert_eq!(store.ancestor_path(id(66)), vec![id(22), id(55)]);
    assert_eq!(store.ancestor_path(id(44)), vec![id(22)]);
    assert!(store.ancestor_path(id(77)).is_empty());
    assert!(store.ancestor_path(id(404)).is_empty());
}

#[test]
fn test_siblings() {
    // GIVEN the menu
    let store = menu_store();

    // WHEN listing Portland's siblings
    let with_self: Vec<_> = store.siblings(id(44), false).into_keys().collect();
    let without_self: Vec<_> = store.siblings(id(44), true).into_keys().collect();

    // THEN Corvallis is listed, Portland only when requested
    assert_eq!(with_self, vec![id(44), id(55)]);
    assert_eq!(without_self, vec![id(55)]);

    // AND roots are siblings of each other
    let root_siblings: Vec<_> = store.siblings(id(33), true).into_keys().collect();
    assert_eq!(root_siblings, vec![id(22), id(77)]);
}

#[test]
fn test_descendant_and_depth() {
    let store = menu_store();

    assert!(store.is_descendant_of(id(66), id(22)));
    assert!(store.is_descendant_of(id(66), id(55)));
    assert!(!store.is_descendant_of(id(44), id(55)));
    assert_eq!(store.depth(id(66)), Some(2));
    assert_eq!(store.depth(id(77)), Some(0));
}

#[test]
fn test_find_current_leaf_by_target() {
    // GIVEN the menu
    let store = menu_store();

    // WHEN looking up the leaf targeting the OSU page
    let found = store.find_by_field("target", &json!("https://oregon.gov/corvallis/osu"));

    // THEN OSU is the only match
    assert_eq!(found, vec![id(66)]);
}

#[test]
fn test_grow_is_full_snapshot() {
    let store = menu_store();
    let grown = store.grow();

    assert_eq!(grown.len(), 6);
    assert_eq!(grown[&id(55)].children, vec![id(66)]);
    assert_eq!(
        store.children_of(id(55)).first().map(|leaf| leaf.id),
        Some(id(66))
    );
}
