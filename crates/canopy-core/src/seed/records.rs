use std::collections::BTreeSet;

use serde_json::Value;

use super::{SeedAdapter, SeedRecord};
use crate::errors::{CanopyError, Result};
use crate::model::leaf::{ID_KEY, PARENT_KEY};

/// Adapter for flat JSON records
///
/// Each record is an object with an integer `id`, an optional `parent`
/// (integer or `null`), and any number of other fields, which become the
/// leaf's data. Records are kept in input order.
#[derive(Debug, Clone, Default)]
pub struct RecordSeed {
    records: Vec<Value>,
    fields: Option<BTreeSet<String>>,
}

impl RecordSeed {
    /// Create an adapter over raw records
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            fields: None,
        }
    }

    /// Keep only the named data fields (plus `id`)
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    fn keeps(&self, key: &str) -> bool {
        key == ID_KEY
            || self
                .fields
                .as_ref()
                .map_or(true, |fields| fields.contains(key))
    }

    fn normalize_one(&self, position: usize, record: &Value) -> Result<SeedRecord> {
        let Value::Object(map) = record else {
            return Err(CanopyError::invalid_seed(format!(
                "record {} is not an object",
                position
            )));
        };

        let id = map.get(ID_KEY).and_then(Value::as_i64).ok_or_else(|| {
            CanopyError::invalid_seed(format!("record {} has no integer id", position))
        })?;

        let parent = match map.get(PARENT_KEY) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_i64().ok_or_else(|| {
                CanopyError::invalid_seed(format!("record {} has a non-integer parent", id))
            })?),
        };

        let data = map
            .iter()
            .filter(|(key, _)| key.as_str() != PARENT_KEY && self.keeps(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(SeedRecord { id, parent, data })
    }
}

impl SeedAdapter for RecordSeed {
    fn normalize(&self) -> Result<Vec<SeedRecord>> {
        self.records
            .iter()
            .enumerate()
            .map(|(position, record)| self.normalize_one(position, record))
            .collect()
    }
}
