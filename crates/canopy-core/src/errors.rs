use canopy_core_types::LeafId;
use thiserror::Error;

/// Result type alias using CanopyError
pub type Result<T> = std::result::Result<T, CanopyError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in the Canopy system. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Construction
    NotASeedAdapter,
    InvalidSeed,

    // Addressing
    NotFound,
    InvalidSlot,

    // Mutation
    ImmutableField,
    CycleDetected,
    MutationAborted,

    // Structural
    InvariantViolation,

    // Configuration
    InvalidPolicy,

    // Integration
    Serialization,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotASeedAdapter => "ERR_NOT_A_SEED_ADAPTER",
            ExErrorKind::InvalidSeed => "ERR_INVALID_SEED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidSlot => "ERR_INVALID_SLOT",
            ExErrorKind::ImmutableField => "ERR_IMMUTABLE_FIELD",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::MutationAborted => "ERR_MUTATION_ABORTED",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::InvalidPolicy => "ERR_INVALID_POLICY",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    leaf_id: Option<LeafId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            leaf_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add leaf ID context
    pub fn with_leaf_id(mut self, id: LeafId) -> Self {
        self.leaf_id = Some(id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the leaf ID context, if any
    pub fn leaf_id(&self) -> Option<LeafId> {
        self.leaf_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(leaf_id) = self.leaf_id {
            write!(f, " (leaf_id: {})", leaf_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for Canopy operations
///
/// Every variant is an ordinary return value. A failed mutation never leaves
/// the store partially changed, whichever variant it reports.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanopyError {
    // ===== Construction Errors =====
    /// The value handed to the store cannot produce a seed
    #[error("Not a seed adapter: {reason}")]
    NotASeedAdapter { reason: String },

    /// The seed adapter produced malformed records
    #[error("Invalid seed: {reason}")]
    InvalidSeed { reason: String },

    // ===== Addressing Errors =====
    /// Leaf not found in store
    #[error("Leaf not found: {leaf_id}")]
    LeafNotFound { leaf_id: LeafId },

    /// Slot name or slot/value combination is not recognized
    #[error("Invalid slot '{slot}': {reason}")]
    InvalidSlot { slot: String, reason: String },

    // ===== Mutation Errors =====
    /// Attempt to overwrite the reserved `id` data field
    #[error("Leaf {leaf_id}: the id field is immutable")]
    IdImmutable { leaf_id: LeafId },

    /// Reparent refused because it would close a cycle
    #[error("Cycle rejected: leaf {leaf_id} cannot be placed under {new_parent}")]
    CycleRejected { leaf_id: LeafId, new_parent: LeafId },

    /// A step of a transactional mutation failed; nothing was committed
    #[error("Mutation of leaf {leaf_id} aborted at step {step}: {source}")]
    MutationAborted {
        leaf_id: LeafId,
        step: usize,
        source: Box<CanopyError>,
    },

    // ===== Structural Errors =====
    /// One of the structural invariants does not hold
    #[error("Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // ===== Configuration Errors =====
    /// Tree policy could not be parsed or failed validation
    #[error("Invalid tree policy: {reason}")]
    InvalidPolicy { reason: String },

    // ===== Integration Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Shared store lock was poisoned by a panicking writer
    #[error("Store lock poisoned: {reason}")]
    LockPoisoned { reason: String },
}

impl CanopyError {
    /// Get the canonical error kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            CanopyError::NotASeedAdapter { .. } => ExErrorKind::NotASeedAdapter,
            CanopyError::InvalidSeed { .. } => ExErrorKind::InvalidSeed,
            CanopyError::LeafNotFound { .. } => ExErrorKind::NotFound,
            CanopyError::InvalidSlot { .. } => ExErrorKind::InvalidSlot,
            CanopyError::IdImmutable { .. } => ExErrorKind::ImmutableField,
            CanopyError::CycleRejected { .. } => ExErrorKind::CycleDetected,
            CanopyError::MutationAborted { .. } => ExErrorKind::MutationAborted,
            CanopyError::InvariantViolation { .. } => ExErrorKind::InvariantViolation,
            CanopyError::InvalidPolicy { .. } => ExErrorKind::InvalidPolicy,
            CanopyError::Serialization { .. } => ExErrorKind::Serialization,
            CanopyError::LockPoisoned { .. } => ExErrorKind::Concurrency,
        }
    }

    /// Unwrap nested `MutationAborted` layers down to the failing step's error
    pub fn root_cause(&self) -> &CanopyError {
        match self {
            CanopyError::MutationAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn invalid_seed(reason: impl Into<String>) -> Self {
        CanopyError::InvalidSeed {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_slot(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        CanopyError::InvalidSlot {
            slot: slot.into(),
            reason: reason.into(),
        }
    }
}

impl From<CanopyError> for ExError {
    fn from(err: CanopyError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            CanopyError::LeafNotFound { leaf_id }
            | CanopyError::IdImmutable { leaf_id }
            | CanopyError::CycleRejected { leaf_id, .. } => ExError::new(kind)
                .with_leaf_id(leaf_id)
                .with_message(message),

            CanopyError::MutationAborted {
                leaf_id, source, ..
            } => ExError::new(kind)
                .with_leaf_id(leaf_id)
                .with_message(message)
                .with_source(ExError::from(*source)),

            CanopyError::NotASeedAdapter { .. } | CanopyError::InvalidSeed { .. } => {
                ExError::new(kind).with_op("plant").with_message(message)
            }

            _ => ExError::new(kind).with_message(message),
        }
    }
}

impl From<serde_json::Error> for CanopyError {
    fn from(err: serde_json::Error) -> Self {
        CanopyError::Serialization {
            message: err.to_string(),
        }
    }
}
