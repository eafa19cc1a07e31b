//! Hierarchical node paths

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when parsing or extending a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must be absolute: {0:?}")]
    NotAbsolute(String),

    #[error("path contains an empty segment: {0:?}")]
    EmptySegment(String),

    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
}

/// Split a URI into its non-empty segments.
///
/// Empty segments are discarded, so `//a//b/` yields `["a", "b"]`.
pub fn uri_segments(uri: &str) -> Vec<&str> {
    uri.split('/').filter(|s| !s.is_empty()).collect()
}

fn check_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment(segment.to_string()));
    }
    if segment == "." || segment == ".." || segment.contains('/') {
        return Err(PathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

/// Absolute path of a node in the document tree.
///
/// `/` is the root; every other path is a sequence of `/`-prefixed,
/// non-empty segments with no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath(String);

impl NodePath {
    /// The root path `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate an absolute path
    pub fn parse(path: impl Into<String>) -> Result<Self, PathError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute(path));
        }
        if path == "/" {
            return Ok(Self::root());
        }
        for segment in path[1..].split('/') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(path));
            }
            check_segment(segment)?;
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments from the root down; empty for the root itself
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Last segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Parent path, `None` for the root
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append a single segment
    pub fn join(&self, segment: &str) -> Result<NodePath, PathError> {
        check_segment(segment)?;
        if self.is_root() {
            Ok(Self(format!("/{}", segment)))
        } else {
            Ok(Self(format!("{}/{}", self.0, segment)))
        }
    }

    /// Append every non-empty segment of a URI
    pub fn join_uri(&self, uri: &str) -> Result<NodePath, PathError> {
        uri_segments(uri)
            .into_iter()
            .try_fold(self.clone(), |path, segment| path.join(segment))
    }

    /// True if `other` lies strictly below this path
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> NodePath {
        NodePath::parse(s).unwrap()
    }

    #[test]
    fn uri_segments_discard_empty_segments() {
        assert_eq!(uri_segments("//a//b/"), vec!["a", "b"]);
        assert_eq!(uri_segments("/news/2020/my-article"), vec!["news", "2020", "my-article"]);
        assert!(uri_segments("///").is_empty());
    }

    #[test]
    fn parse_rejects_relative_and_malformed_paths() {
        assert!(matches!(NodePath::parse("routes"), Err(PathError::NotAbsolute(_))));
        assert!(matches!(NodePath::parse("/routes/"), Err(PathError::EmptySegment(_))));
        assert!(matches!(NodePath::parse("/a//b"), Err(PathError::EmptySegment(_))));
        assert!(matches!(NodePath::parse("/a/../b"), Err(PathError::InvalidSegment(_))));
    }

    #[test]
    fn root_has_no_name_or_parent() {
        let root = NodePath::root();
        assert!(root.is_root());
        assert_eq!(root.name(), None);
        assert_eq!(root.parent(), None);
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn parent_and_name() {
        let p = path("/routes/news/2020");
        assert_eq!(p.name(), Some("2020"));
        assert_eq!(p.parent(), Some(path("/routes/news")));
        assert_eq!(path("/routes").parent(), Some(NodePath::root()));
        assert_eq!(p.depth(), 3);
    }

    #[test]
    fn join_validates_segment() {
        assert_eq!(NodePath::root().join("routes").unwrap(), path("/routes"));
        assert_eq!(path("/routes").join("news").unwrap(), path("/routes/news"));
        assert!(path("/routes").join("a/b").is_err());
        assert!(path("/routes").join("").is_err());
    }

    #[test]
    fn join_uri_appends_non_empty_segments() {
        let joined = path("/routes").join_uri("//news/2020/").unwrap();
        assert_eq!(joined, path("/routes/news/2020"));
        assert_eq!(path("/routes").join_uri("/").unwrap(), path("/routes"));
    }

    #[test]
    fn ancestor_check_respects_segment_boundaries() {
        assert!(path("/routes").is_ancestor_of(&path("/routes/news")));
        assert!(!path("/routes").is_ancestor_of(&path("/routes")));
        assert!(!path("/routes").is_ancestor_of(&path("/routes-old/news")));
        assert!(NodePath::root().is_ancestor_of(&path("/routes")));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&path("/routes/news")).unwrap();
        assert_eq!(json, "\"/routes/news\"");
        let bad: Result<NodePath, _> = serde_json::from_str("\"news\"");
        assert!(bad.is_err());
    }
}
