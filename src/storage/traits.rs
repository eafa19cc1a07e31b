//! Storage trait definitions

use crate::tree::{ContentRef, Node, NodeId, NodeKind, NodePath, PathError};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("Node not found: {0}")]
    NodeNotFound(NodePath),

    #[error("Path already occupied by another node: {0}")]
    PathOccupied(NodePath),

    #[error("Parent node does not exist: {0}")]
    ParentMissing(NodePath),

    #[error("Cannot move {from} to {to}")]
    InvalidMove { from: NodePath, to: NodePath },

    #[error("The root node cannot be moved or removed")]
    RootImmutable,

    #[error("Corrupt row at {path}: {reason}")]
    CorruptRow { path: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Store is busy: another session is open")]
    Busy,

    #[error("Session is read-only")]
    ReadOnly,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A unit of work against a document store.
///
/// Writes stay pending until [`Session::save`]. Reads through the same
/// session observe its pending writes. Dropping a session discards
/// whatever has not been saved.
pub trait Session {
    /// Find the node stored at `path`
    fn find(&self, path: &NodePath) -> StorageResult<Option<Node>>;

    /// Find a node by identity, wherever it currently lives
    fn find_by_id(&self, id: &NodeId) -> StorageResult<Option<Node>>;

    /// Direct children of `path`, ordered by name
    fn list_children(&self, path: &NodePath) -> StorageResult<Vec<Node>>;

    /// Insert or update a node.
    ///
    /// The parent must exist. Persisting over a path held by a node with a
    /// different id fails with [`StorageError::PathOccupied`].
    fn persist(&mut self, node: &Node) -> StorageResult<()>;

    /// Move the node at `from`, with its subtree, to `to`
    fn move_node(&mut self, from: &NodePath, to: &NodePath) -> StorageResult<()>;

    /// Remove the node at `path` and its subtree; false if nothing was there
    fn remove(&mut self, path: &NodePath) -> StorageResult<bool>;

    /// Replace the kind of the node at `path`, keeping its id and path
    fn rewrite_kind(&mut self, path: &NodePath, kind: &NodeKind) -> StorageResult<()>;

    /// Route nodes whose content is `content`, ordered by path
    fn find_by_content(&self, content: &ContentRef) -> StorageResult<Vec<Node>>;

    /// Commit pending changes
    fn save(&mut self) -> StorageResult<()>;

    /// True if there are writes not yet saved
    fn has_pending_changes(&self) -> bool;

    /// Build a child of `parent` and persist it (uncommitted)
    fn create_child(&mut self, parent: &Node, name: &str, kind: NodeKind) -> StorageResult<Node> {
        let node = Node::child_of(parent, name, kind)?;
        self.persist(&node)?;
        Ok(node)
    }
}

/// Trait for document store backends
///
/// Implementations must be thread-safe (Send + Sync); each session is
/// used from one thread at a time.
pub trait DocumentStore: Send + Sync {
    /// Open a new read-write session.
    ///
    /// At most one session per store is open at a time. While one is
    /// alive this returns [`StorageError::Busy`] instead of waiting.
    fn session(&self) -> StorageResult<Box<dyn Session + '_>>;

    /// Open a session that only reads.
    ///
    /// Same exclusivity as [`DocumentStore::session`]; writes through it
    /// fail with [`StorageError::ReadOnly`].
    fn read_session(&self) -> StorageResult<Box<dyn Session + '_>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: DocumentStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
