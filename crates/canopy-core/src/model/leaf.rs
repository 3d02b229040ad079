use canopy_core_types::LeafId;
use serde::{Deserialize, Serialize};

/// Opaque per-leaf attributes
///
/// The store only interprets the reserved `id` key, which mirrors the
/// leaf's id and can never be overwritten.
pub type LeafData = serde_json::Map<String, serde_json::Value>;

/// Reserved data key holding the leaf's own id
pub const ID_KEY: &str = "id";

/// Data key stripped from seed records before storage
pub const PARENT_KEY: &str = "parent";

/// Activation marker set along an ancestor path
///
/// Variants are ordered by strength: `Ancestor < Parent < Current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Two or more levels above the current leaf
    Ancestor,
    /// Immediate parent of the current leaf
    Parent,
    /// The leaf matching the current context
    Current,
}

impl Activation {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Activation::Ancestor => "ancestor",
            Activation::Parent => "parent",
            Activation::Current => "current",
        }
    }

    /// Marker for the ancestor at `distance` levels above the current leaf
    ///
    /// Distance 0 is the leaf itself.
    pub fn for_distance(distance: usize) -> Self {
        match distance {
            0 => Activation::Current,
            1 => Activation::Parent,
            _ => Activation::Ancestor,
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "current" => Ok(Activation::Current),
            "parent" => Ok(Activation::Parent),
            "ancestor" => Ok(Activation::Ancestor),
            other => Err(format!("unknown activation marker '{}'", other)),
        }
    }
}

/// Leaf - one node in the hierarchy
///
/// Leaves reference each other only by id. `parent` and `children` are kept
/// consistent by the store: a leaf lists a child exactly when that child
/// names it as parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Unique identifier assigned by the seed adapter
    pub id: LeafId,

    /// Optional parent leaf (None for roots)
    pub parent: Option<LeafId>,

    /// Child leaf ids, in insertion order
    #[serde(default)]
    pub children: Vec<LeafId>,

    /// Opaque attributes; `data["id"]` mirrors `id`
    #[serde(default)]
    pub data: LeafData,

    /// Activation marker, set only by activation logic
    #[serde(default)]
    pub active: Option<Activation>,
}

impl Leaf {
    /// Create a root leaf with the given data
    ///
    /// The reserved `id` key is written into `data` and any `parent` key is
    /// dropped, so `parent` stays the single source of truth for parentage.
    pub fn new(id: LeafId, mut data: LeafData) -> Self {
        data.remove(PARENT_KEY);
        data.insert(ID_KEY.to_string(), serde_json::Value::from(id.get()));
        Self {
            id,
            parent: None,
            children: Vec::new(),
            data,
            active: None,
        }
    }

    /// Check if this leaf is a root (has no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Check if this leaf has any children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Get one data field
    pub fn data_field(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Append a child id, ignoring duplicates
    pub(crate) fn add_child(&mut self, child: LeafId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Remove a child id
    pub(crate) fn remove_child(&mut self, child: LeafId) {
        self.children.retain(|c| *c != child);
    }
}
