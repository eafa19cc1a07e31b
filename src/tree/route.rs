//! Route payload and the typed route view over a node

use super::node::{Node, NodeId, NodeKind};
use super::path::NodePath;
use serde::{Deserialize, Serialize};

/// Route class used when none is configured
pub const DEFAULT_ROUTE_CLASS: &str = "auto_route";

/// Opaque handle to the document a route points at (e.g. "article:42")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a route serves its content or redirects elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Primary,
    Redirect,
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteType::Primary => write!(f, "primary"),
            RouteType::Redirect => write!(f, "redirect"),
        }
    }
}

/// Routing payload carried by route nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteData {
    /// Route representation this node is stored as
    pub class: String,
    /// Document being routed to
    pub content: ContentRef,
    /// Locale, or the no-multilang sentinel
    pub tag: String,
    pub route_type: RouteType,
    /// Identity of the route this one redirects to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<NodeId>,
}

impl RouteData {
    /// Create a primary route payload
    pub fn primary(class: impl Into<String>, content: ContentRef, tag: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            content,
            tag: tag.into(),
            route_type: RouteType::Primary,
            redirect_target: None,
        }
    }
}

/// A node known to be a route.
///
/// Built from a [`Node`] with `TryFrom`; the conversion fails and hands the
/// node back when it is not a route.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoRoute {
    node: Node,
}

impl AutoRoute {
    /// Create a new route node at `path`
    pub fn new(path: NodePath, data: RouteData) -> Self {
        Self {
            node: Node::new(path, NodeKind::Route(data)),
        }
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn path(&self) -> &NodePath {
        &self.node.path
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn data(&self) -> &RouteData {
        match &self.node.kind {
            NodeKind::Route(route) => route,
            // Both constructors only admit route nodes.
            _ => unreachable!("AutoRoute wraps a non-route node"),
        }
    }

    fn data_mut(&mut self) -> &mut RouteData {
        match &mut self.node.kind {
            NodeKind::Route(route) => route,
            _ => unreachable!("AutoRoute wraps a non-route node"),
        }
    }

    pub fn content(&self) -> &ContentRef {
        &self.data().content
    }

    pub fn tag(&self) -> &str {
        &self.data().tag
    }

    pub fn route_type(&self) -> RouteType {
        self.data().route_type
    }

    pub fn redirect_target(&self) -> Option<NodeId> {
        self.data().redirect_target
    }

    pub fn set_content(&mut self, content: ContentRef) {
        self.data_mut().content = content;
        self.node.touch();
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.data_mut().tag = tag.into();
        self.node.touch();
    }

    pub fn set_route_type(&mut self, route_type: RouteType) {
        self.data_mut().route_type = route_type;
        self.node.touch();
    }

    pub fn set_redirect_target(&mut self, target: Option<NodeId>) {
        self.data_mut().redirect_target = target;
        self.node.touch();
    }

    pub fn as_node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }
}

impl TryFrom<Node> for AutoRoute {
    type Error = Node;

    fn try_from(node: Node) -> Result<Self, Self::Error> {
        if node.is_route() {
            Ok(Self { node })
        } else {
            Err(node)
        }
    }
}

impl From<AutoRoute> for Node {
    fn from(route: AutoRoute) -> Self {
        route.node
    }
}
