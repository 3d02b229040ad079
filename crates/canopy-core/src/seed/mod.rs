//! Seed adapters
//!
//! A seed is the canonical flat input a store is planted from: an ordered
//! list of `{id, parent, data}` records. Adapters normalize caller-supplied
//! structures into that list. The store only depends on the `SeedAdapter`
//! capability, never on a concrete source format.
//!
//! ## Adapters
//!
//! - `Vec<SeedRecord>` / `[SeedRecord]`: already normalized
//! - [`RecordSeed`]: flat JSON objects carrying `id` and `parent`
//! - [`ForestSeed`]: leaves of an existing tree (used by `Store::subtree`)
//!
//! [`from_document`] selects an adapter from an untyped JSON document.

pub mod forest;
pub mod records;

pub use forest::ForestSeed;
pub use records::RecordSeed;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CanopyError, Result};
use crate::model::{Leaf, LeafData};

/// One normalized seed record
///
/// Ids are signed so that adapters can pass through whatever integer the
/// source carried; planting rejects zero and negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub id: i64,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub data: LeafData,
}

impl SeedRecord {
    /// Create a record with empty data
    pub fn new(id: i64, parent: Option<i64>) -> Self {
        Self {
            id,
            parent,
            data: LeafData::new(),
        }
    }

    /// Add one data field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Capability to produce a seed
pub trait SeedAdapter {
    /// Normalize the source into an ordered list of seed records
    ///
    /// # Errors
    ///
    /// Returns `InvalidSeed` if the source cannot be normalized.
    fn normalize(&self) -> Result<Vec<SeedRecord>>;
}

impl SeedAdapter for [SeedRecord] {
    fn normalize(&self) -> Result<Vec<SeedRecord>> {
        Ok(self.to_vec())
    }
}

impl SeedAdapter for Vec<SeedRecord> {
    fn normalize(&self) -> Result<Vec<SeedRecord>> {
        Ok(self.clone())
    }
}

impl<A: SeedAdapter + ?Sized> SeedAdapter for Box<A> {
    fn normalize(&self) -> Result<Vec<SeedRecord>> {
        (**self).normalize()
    }
}

/// Select a seed adapter from an untyped document
///
/// The document names its adapter:
///
/// ```json
/// {"adapter": "records", "records": [{"id": 22, "parent": null, "name": "Oregon"}]}
/// {"adapter": "forest", "leaves": [{"id": 22, "parent": null, "data": {}}]}
/// ```
///
/// `records` may be accompanied by a `fields` array restricting which
/// record fields are kept.
///
/// # Errors
/// * `NotASeedAdapter` - If the document is not an object or names no known adapter
/// * `InvalidSeed` - If the adapter payload is missing or malformed
pub fn from_document(doc: &Value) -> Result<Box<dyn SeedAdapter>> {
    let Value::Object(map) = doc else {
        return Err(CanopyError::NotASeedAdapter {
            reason: "seed document must be a JSON object".to_string(),
        });
    };

    let adapter = map
        .get("adapter")
        .and_then(Value::as_str)
        .ok_or_else(|| CanopyError::NotASeedAdapter {
            reason: "seed document does not name an adapter".to_string(),
        })?;

    match adapter {
        "records" => {
            let records = map
                .get("records")
                .and_then(Value::as_array)
                .ok_or_else(|| CanopyError::invalid_seed("records adapter needs a 'records' array"))?;
            let mut seed = RecordSeed::new(records.clone());
            if let Some(fields) = map.get("fields").and_then(Value::as_array) {
                seed = seed.with_fields(fields.iter().filter_map(Value::as_str));
            }
            Ok(Box::new(seed))
        }
        "forest" => {
            let leaves = map
                .get("leaves")
                .cloned()
                .ok_or_else(|| CanopyError::invalid_seed("forest adapter needs a 'leaves' array"))?;
            let leaves: Vec<Leaf> = serde_json::from_value(leaves)
                .map_err(|e| CanopyError::invalid_seed(format!("malformed forest leaf: {}", e)))?;
            Ok(Box::new(ForestSeed::new(leaves)))
        }
        other => Err(CanopyError::NotASeedAdapter {
            reason: format!("unknown adapter '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_builder() {
        let record = SeedRecord::new(44, Some(22)).with_field("name", "Portland");
        assert_eq!(record.id, 44);
        assert_eq!(record.parent, Some(22));
        assert_eq!(record.data.get("name"), Some(&json!("Portland")));
    }

    #[test]
    fn test_vec_is_identity_adapter() {
        let seed = vec![SeedRecord::new(22, None), SeedRecord::new(44, Some(22))];
        assert_eq!(seed.normalize().unwrap(), seed);
    }

    #[test]
    fn test_document_selects_records_adapter() {
        let doc = json!({
            "adapter": "records",
            "records": [{"id": 22, "parent": null, "name": "Oregon"}]
        });
        let records = from_document(&doc).unwrap().normalize().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 22);
    }

    #[test]
    fn test_document_selects_forest_adapter() {
        let doc = json!({
            "adapter": "forest",
            "leaves": [
                {"id": 22, "parent": null, "data": {"name": "Oregon"}},
                {"id": 44, "parent": 22}
            ]
        });
        let records = from_document(&doc).unwrap().normalize().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent, Some(22));
    }

    #[test]
    fn test_document_without_adapter_is_rejected() {
        for doc in [json!([1, 2, 3]), json!({"records": []}), json!({"adapter": "wordpress"})] {
            let result = from_document(&doc);
            assert!(
                matches!(result, Err(CanopyError::NotASeedAdapter { .. })),
                "accepted {}",
                doc
            );
        }
    }

    #[test]
    fn test_document_with_bad_payload_is_invalid_seed() {
        let doc = json!({"adapter": "forest", "leaves": [{"parent": 3}]});
        assert!(matches!(
            from_document(&doc),
            Err(CanopyError::InvalidSeed { .. })
        ));
    }
}
