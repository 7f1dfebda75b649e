//! Error types for graph mutation and import.

use crate::id::ElementId;
use crate::model::ElementKind;
use thiserror::Error;

/// Errors reported by [`GraphModel`](crate::GraphModel) operations.
///
/// All failures are local and immediate; nothing here is retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Edge creation referenced a state id that is not in the model.
    #[error("unknown state: {0}")]
    UnknownNode(ElementId),

    /// Update or delete targeted an id that is not in the model.
    #[error("element not found: {0}")]
    NotFound(ElementId),

    /// A patch was applied to an element of a different kind.
    #[error("element {id} is not a {expected}")]
    KindMismatch { id: ElementId, expected: ElementKind },

    /// A property path or value could not be turned into a patch.
    #[error("invalid property update: {0}")]
    InvalidPatch(String),

    /// Imported JSON is missing required arrays or has malformed records.
    #[error("invalid document: {0}")]
    InvalidFormat(String),
}

impl GraphError {
    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        GraphError::InvalidFormat(reason.into())
    }
}
