//! Adapter error types

use crate::storage::StorageError;
use crate::tree::{NodePath, PathError};
use thiserror::Error;

/// Errors raised by route tree operations
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Base path missing or malformed, or an unusable route class
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The target path holds a node of an incompatible kind
    #[error(
        "Encountered existing {found} node at path \"{path}\"; only placeholders can become routes"
    )]
    Conflict { path: NodePath, found: &'static str },

    /// Relocation hit a name collision; `relocated` lists the children
    /// already moved before the collision
    #[error(
        "Cannot relocate child to \"{path}\": destination already has a child with that name ({} already relocated)",
        .relocated.len()
    )]
    ChildCollision {
        path: NodePath,
        relocated: Vec<NodePath>,
    },

    /// The destination is the source itself or lies below it
    #[error("Cannot relocate children of \"{from}\" into \"{to}\": destination lies within the source")]
    RelocationIntoSource { from: NodePath, to: NodePath },

    /// A storage failure interrupted relocation after `relocated` were moved
    #[error(
        "Relocation of \"{path}\" failed ({} already relocated): {cause}",
        .relocated.len()
    )]
    RelocationFailed {
        path: NodePath,
        relocated: Vec<NodePath>,
        #[source]
        cause: StorageError,
    },

    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("URI has no path segments: {0:?}")]
    EmptyUri(String),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
