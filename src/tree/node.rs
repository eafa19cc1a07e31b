//! Node representation in the route tree

use super::path::{NodePath, PathError};
use super::route::RouteData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a node
///
/// Survives moves and kind migration; the path does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a NodeId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What a node stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Structural path segment
    Intermediate,
    /// Filler node that may later become a route
    Placeholder,
    /// Typed route
    Route(RouteData),
}

impl NodeKind {
    /// Short name used for storage and error messages
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Intermediate => "intermediate",
            NodeKind::Placeholder => "placeholder",
            NodeKind::Route(_) => "route",
        }
    }
}

/// Node metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// When the node was created
    pub created_at: Option<DateTime<Utc>>,
    /// When the node was last modified
    pub modified_at: Option<DateTime<Utc>>,
}

/// A node in the route tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity
    pub id: NodeId,
    /// Location in the tree
    pub path: NodePath,
    /// Node kind and, for routes, the routing payload
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Node metadata
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Node {
    /// Create a new node at the given path
    pub fn new(path: NodePath, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            path,
            kind,
            metadata: NodeMetadata {
                created_at: Some(Utc::now()),
                ..Default::default()
            },
        }
    }

    /// Create a new node named `name` below `parent`
    pub fn child_of(parent: &Node, name: &str, kind: NodeKind) -> Result<Self, PathError> {
        Ok(Self::new(parent.path.join(name)?, kind))
    }

    /// Last path segment; empty for the root
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or("")
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, NodeKind::Placeholder)
    }

    pub fn is_route(&self) -> bool {
        matches!(self.kind, NodeKind::Route(_))
    }

    /// Routing payload if this node is a route
    pub fn route(&self) -> Option<&RouteData> {
        match &self.kind {
            NodeKind::Route(route) => Some(route),
            _ => None,
        }
    }

    /// Record a modification
    pub fn touch(&mut self) {
        self.metadata.modified_at = Some(Utc::now());
    }
}
