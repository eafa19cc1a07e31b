//! Input values for route creation

use crate::tree::ContentRef;

/// Tag given to routes whose context carries no locale
pub const TAG_NO_MULTILANG: &str = "no-multilang";

/// What the caller wants routed: a URI, the content behind it and,
/// for translated content, the locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriContext {
    /// Slash-delimited URI relative to the route base path
    pub uri: String,
    pub locale: Option<String>,
    pub content: ContentRef,
}

impl UriContext {
    pub fn new(uri: impl Into<String>, content: impl Into<ContentRef>) -> Self {
        Self {
            uri: uri.into(),
            locale: None,
            content: content.into(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}
