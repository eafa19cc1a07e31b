//! Route tree data structures

mod node;
mod path;
mod route;

#[cfg(test)]
mod tests;

pub use node::{Node, NodeId, NodeKind, NodeMetadata};
pub use path::{uri_segments, NodePath, PathError};
pub use route::{AutoRoute, ContentRef, RouteData, RouteType, DEFAULT_ROUTE_CLASS};
