//! Placeholder patching for route stacks

use super::error::AdapterResult;
use crate::storage::Session;
use crate::tree::{uri_segments, Node, NodeKind, NodePath, PathError};

/// A run of path segments below a base path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStack {
    base: NodePath,
    /// Cumulative paths, one per pushed segment
    paths: Vec<NodePath>,
}

impl RouteStack {
    pub fn new(base: NodePath) -> Self {
        Self {
            base,
            paths: Vec::new(),
        }
    }

    /// Stack holding every non-empty segment of `uri`
    pub fn from_uri(base: NodePath, uri: &str) -> Result<Self, PathError> {
        let mut stack = Self::new(base);
        for segment in uri_segments(uri) {
            stack.push(segment)?;
        }
        Ok(stack)
    }

    pub fn push(&mut self, segment: &str) -> Result<(), PathError> {
        let next = self.full_path().join(segment)?;
        self.paths.push(next);
        Ok(())
    }

    pub fn base(&self) -> &NodePath {
        &self.base
    }

    /// Path of the deepest segment, or the base if the stack is empty
    pub fn full_path(&self) -> &NodePath {
        self.paths.last().unwrap_or(&self.base)
    }

    /// Every cumulative path, shallowest first
    pub fn full_paths(&self) -> &[NodePath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Fills the gaps of a route stack with Placeholder nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPatcher;

impl PlaceholderPatcher {
    pub fn new() -> Self {
        Self
    }

    /// Return the node at each path of `stack`, shallowest first, persisting
    /// a new Placeholder (uncommitted) wherever nothing exists yet.
    pub fn make_routes(&self, session: &mut dyn Session, stack: &RouteStack) -> AdapterResult<Vec<Node>> {
        let mut nodes = Vec::with_capacity(stack.len());
        for path in stack.full_paths() {
            let node = match session.find(path)? {
                Some(existing) => existing,
                None => {
                    let node = Node::new(path.clone(), NodeKind::Placeholder);
                    session.persist(&node)?;
                    tracing::debug!(path = %path, "Created placeholder");
                    node
                }
            };
            nodes.push(node);
        }
        Ok(nodes)
    }
}
