use canopy_core::{LeafId, RecordSeed, Store, TreePolicy};
use serde_json::{json, Value};

/// Raw records of the six-leaf menu used across the suite
///
/// ```text
/// 22 Oregon            33 California        77 Iowa
/// ├── 44 Portland
/// └── 55 Corvallis
///     └── 66 OSU
/// ```
#[allow(dead_code)]
pub fn menu_records() -> Vec<Value> {
    vec![
        json!({"id": 22, "parent": null, "name": "Oregon"}),
        json!({"id": 33, "parent": null, "name": "California", "order": 1, "target": "https://california.gov"}),
        json!({"id": 44, "parent": 22, "name": "Portland"}),
        json!({"id": 55, "parent": 22, "name": "Corvallis"}),
        json!({"id": 66, "parent": 55, "name": "OSU", "target": "https://oregon.gov/corvallis/osu"}),
        json!({"id": 77, "parent": null, "name": "Iowa"}),
    ]
}

/// Plant the six-leaf menu with the default policy
#[allow(dead_code)]
pub fn menu_store() -> Store {
    Store::plant(&RecordSeed::new(menu_records())).unwrap()
}

/// Plant the six-leaf menu with a custom policy
#[allow(dead_code)]
pub fn menu_store_with(policy: TreePolicy) -> Store {
    Store::plant_with_policy(&RecordSeed::new(menu_records()), policy).unwrap()
}

/// Shorthand for building a leaf id
#[allow(dead_code)]
pub fn id(raw: u64) -> LeafId {
    LeafId(raw)
}

/// Children of a leaf, panicking if the leaf is missing
#[allow(dead_code)]
pub fn children(store: &Store, raw: u64) -> Vec<LeafId> {
    store.get_leaf(LeafId(raw)).unwrap().children.clone()
}

/// Parent of a leaf, panicking if the leaf is missing
#[allow(dead_code)]
pub fn parent(store: &Store, raw: u64) -> Option<LeafId> {
    store.get_leaf(LeafId(raw)).unwrap().parent
}
