//! Addressable leaf slots and mutation steps
//!
//! `Slot` names the four addressable parts of a leaf. `Step` is one
//! mutation against a slot, carrying a payload shaped for that slot, so a
//! mismatched slot/value pair cannot be expressed once a step exists.
//! `Step::from_slot` is the checked bridge from untyped input.

use canopy_core_types::LeafId;
use serde_json::Value;

use super::leaf::Activation;
use crate::errors::{CanopyError, Result};

/// One addressable part of a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Parent,
    Children,
    Data,
    Active,
}

impl Slot {
    /// Canonical slot name
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Parent => "parent",
            Slot::Children => "children",
            Slot::Data => "data",
            Slot::Active => "active",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Slot {
    type Err = CanopyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parent" => Ok(Slot::Parent),
            "children" => Ok(Slot::Children),
            "data" => Ok(Slot::Data),
            "active" => Ok(Slot::Active),
            other => Err(CanopyError::invalid_slot(other, "unknown slot")),
        }
    }
}

/// A single field-set step applied by the mutation engine
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Reparent the leaf; `None` detaches it to a root
    Parent(Option<LeafId>),
    /// Replace the leaf's entire children list
    Children(Vec<LeafId>),
    /// Merge one key/value pair into the leaf's data
    Data { key: String, value: Value },
    /// Overwrite the activation marker
    Active(Option<Activation>),
}

impl Step {
    /// Reparent under `parent`
    pub fn parent(parent: impl Into<LeafId>) -> Self {
        Step::Parent(Some(parent.into()))
    }

    /// Replace children with `children`
    pub fn children<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LeafId>,
    {
        Step::Children(children.into_iter().map(Into::into).collect())
    }

    /// Set data field `key` to `value`
    pub fn data(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Step::Data {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Set the activation marker
    pub fn active(marker: Activation) -> Self {
        Step::Active(Some(marker))
    }

    /// The slot this step writes
    pub fn slot(&self) -> Slot {
        match self {
            Step::Parent(_) => Slot::Parent,
            Step::Children(_) => Slot::Children,
            Step::Data { .. } => Slot::Data,
            Step::Active(_) => Slot::Active,
        }
    }

    /// Build a step from a slot and an untyped value
    ///
    /// Accepted shapes:
    /// - `parent`: a positive integer, or `null` to detach
    /// - `children`: an array of positive integers
    /// - `data`: a two-element array `[key, value]` with a string key
    /// - `active`: a marker name, or `null` to clear
    ///
    /// # Errors
    /// * `InvalidSlot` - If the value does not fit the slot
    pub fn from_slot(slot: Slot, value: Value) -> Result<Self> {
        let name = slot.as_str();
        match slot {
            Slot::Parent => match value {
                Value::Null => Ok(Step::Parent(None)),
                other => leaf_id(&other)
                    .map(|id| Step::Parent(Some(id)))
                    .ok_or_else(|| CanopyError::invalid_slot(name, "expected a leaf id or null")),
            },
            Slot::Children => {
                let Value::Array(items) = value else {
                    return Err(CanopyError::invalid_slot(name, "expected an array of leaf ids"));
                };
                items
                    .iter()
                    .map(|item| {
                        leaf_id(item).ok_or_else(|| {
                            CanopyError::invalid_slot(name, format!("'{}' is not a leaf id", item))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Step::Children)
            }
            Slot::Data => match value {
                Value::Array(mut pair) if pair.len() == 2 => {
                    let value = pair.pop().unwrap_or(Value::Null);
                    match pair.pop() {
                        Some(Value::String(key)) => Ok(Step::Data { key, value }),
                        _ => Err(CanopyError::invalid_slot(name, "data key must be a string")),
                    }
                }
                _ => Err(CanopyError::invalid_slot(name, "expected a [key, value] pair")),
            },
            Slot::Active => match value {
                Value::Null => Ok(Step::Active(None)),
                Value::String(marker) => marker
                    .parse::<Activation>()
                    .map(|m| Step::Active(Some(m)))
                    .map_err(|reason| CanopyError::invalid_slot(name, reason)),
                _ => Err(CanopyError::invalid_slot(name, "expected a marker name or null")),
            },
        }
    }
}

fn leaf_id(value: &Value) -> Option<LeafId> {
    value.as_u64().filter(|v| *v > 0).map(LeafId)
}
