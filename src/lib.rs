//! autoroute: Route Tree Adapter
//!
//! Materializes slash-delimited URIs as typed route nodes in a hierarchical
//! document store, and keeps that tree consistent when routes are migrated,
//! superseded or redirected.
//!
//! # Core Concepts
//!
//! - **Nodes**: documents keyed by absolute path, of kind Intermediate,
//!   Placeholder or Route
//! - **Sessions**: units of work against a store; nothing is visible to other
//!   sessions until `save`
//! - **RouteAdapter**: creates routes below a base path, migrates
//!   placeholders, relocates children, sets up redirects
//!
//! # Example
//!
//! ```
//! use autoroute::{
//!     AdapterConfig, DocumentStore, NodeKind, NodePath, OpenStore, RouteAdapter, SqliteStore,
//!     UriContext,
//! };
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! let mut session = store.session().unwrap();
//! let root = session.find(&NodePath::root()).unwrap().unwrap();
//! session.create_child(&root, "routes", NodeKind::Intermediate).unwrap();
//!
//! let adapter = RouteAdapter::new(&*session, &AdapterConfig::default()).unwrap();
//! let context = UriContext::new("/news/2020/my-article", "article:42");
//! let tag = adapter.generate_tag(&context);
//! let route = adapter.create_route(&mut *session, &context, &tag).unwrap();
//! session.save().unwrap();
//!
//! assert_eq!(route.path().as_str(), "/routes/news/2020/my-article");
//! ```

pub mod adapter;
pub mod config;
pub mod storage;
mod tree;

pub use adapter::{
    AdapterError, AdapterResult, PlaceholderPatcher, RouteAdapter, RouteStack, UriContext,
    TAG_NO_MULTILANG,
};
pub use config::{AdapterConfig, Config, ConfigError, ConfigResult};
pub use storage::{DocumentStore, OpenStore, Session, SqliteStore, StorageError, StorageResult};
pub use tree::{
    uri_segments, AutoRoute, ContentRef, Node, NodeId, NodeKind, NodeMetadata, NodePath,
    PathError, RouteData, RouteType, DEFAULT_ROUTE_CLASS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
