//! Storage backends
//!
//! The route tree is reached through the `DocumentStore` trait, which hands
//! out `Session`s (units of work). The primary implementation is
//! `SqliteStore` for persistent storage.

mod sqlite;
mod traits;

pub use sqlite::{SqliteSession, SqliteStore};
pub use traits::{DocumentStore, OpenStore, Session, StorageError, StorageResult};
