//! Route tree materialization, placeholder migration and child relocation

use super::error::{AdapterError, AdapterResult};
use super::types::{UriContext, TAG_NO_MULTILANG};
use crate::config::AdapterConfig;
use crate::storage::{Session, StorageError};
use crate::tree::{
    uri_segments, AutoRoute, ContentRef, Node, NodeKind, NodePath, RouteData, RouteType,
};

/// Binds route operations to a document store below a base path.
///
/// The adapter holds no session of its own: every operation takes the
/// caller's session, and only [`RouteAdapter::remove_route`] saves it.
#[derive(Debug, Clone)]
pub struct RouteAdapter {
    base_path: NodePath,
    route_class: String,
}

impl RouteAdapter {
    /// Create an adapter, checking that the configured base path exists.
    pub fn new(session: &dyn Session, config: &AdapterConfig) -> AdapterResult<Self> {
        let base_path = NodePath::parse(config.route_basepath.as_str()).map_err(|e| {
            AdapterError::Configuration(format!(
                "invalid route_basepath \"{}\": {}",
                config.route_basepath, e
            ))
        })?;
        if config.route_class.trim().is_empty() {
            return Err(AdapterError::Configuration(
                "route_class must not be empty".to_string(),
            ));
        }

        let adapter = Self {
            base_path,
            route_class: config.route_class.clone(),
        };
        adapter.base_node(session)?;
        Ok(adapter)
    }

    pub fn base_path(&self) -> &NodePath {
        &self.base_path
    }

    pub fn route_class(&self) -> &str {
        &self.route_class
    }

    fn base_node(&self, session: &dyn Session) -> AdapterResult<Node> {
        session.find(&self.base_path)?.ok_or_else(|| {
            AdapterError::Configuration(format!(
                "The route_basepath configuration points to a non-existent path \"{}\"",
                self.base_path
            ))
        })
    }

    /// The locale of the context, or the no-multilang sentinel
    pub fn generate_tag(&self, uri_context: &UriContext) -> String {
        match uri_context.locale.as_deref() {
            Some(locale) if !locale.is_empty() => locale.to_string(),
            _ => TAG_NO_MULTILANG.to_string(),
        }
    }

    /// Materialize the node chain for `uri_context.uri` below the base path
    /// and return the route at its head.
    ///
    /// Missing intermediate segments are created as Intermediate nodes;
    /// existing ones are reused. The head is created as a new Primary route,
    /// or migrated in place if a Placeholder sits there. Any other node at
    /// the head is a [`AdapterError::Conflict`]. Nothing is saved.
    pub fn create_route(
        &self,
        session: &mut dyn Session,
        uri_context: &UriContext,
        tag: &str,
    ) -> AdapterResult<AutoRoute> {
        let mut parent = self.base_node(session)?;

        let mut segments = uri_segments(&uri_context.uri);
        let head = segments
            .pop()
            .ok_or_else(|| AdapterError::EmptyUri(uri_context.uri.clone()))?;

        for segment in segments {
            let path = parent.path.join(segment)?;
            parent = match session.find(&path)? {
                Some(existing) => existing,
                None => {
                    tracing::debug!(path = %path, "Creating intermediate node");
                    session.create_child(&parent, segment, NodeKind::Intermediate)?
                }
            };
        }

        let path = parent.path.join(head)?;
        match session.find(&path)? {
            None => {
                let route = AutoRoute::new(
                    path,
                    RouteData::primary(&self.route_class, uri_context.content.clone(), tag),
                );
                session.persist(route.as_node())?;
                tracing::info!(
                    path = %route.path(),
                    content = %route.content(),
                    tag,
                    "Created route"
                );
                Ok(route)
            }
            Some(existing) if existing.is_placeholder() => self.migrate_placeholder(
                session,
                existing,
                uri_context.content.clone(),
                tag,
                RouteType::Primary,
            ),
            Some(existing) => {
                tracing::warn!(path = %path, kind = existing.kind.name(), "Route path conflict");
                Err(AdapterError::Conflict {
                    path,
                    found: existing.kind.name(),
                })
            }
        }
    }

    /// Turn a Placeholder into a route in place, keeping its path and id.
    ///
    /// Children of the node are left where they are.
    pub fn migrate_placeholder(
        &self,
        session: &mut dyn Session,
        node: Node,
        content: ContentRef,
        tag: &str,
        route_type: RouteType,
    ) -> AdapterResult<AutoRoute> {
        if !node.is_placeholder() {
            return Err(AdapterError::Conflict {
                path: node.path,
                found: node.kind.name(),
            });
        }

        let mut data = RouteData::primary(&self.route_class, content, tag);
        data.route_type = route_type;
        session.rewrite_kind(&node.path, &NodeKind::Route(data))?;

        let route = match session.find_by_id(&node.id)?.map(AutoRoute::try_from) {
            Some(Ok(route)) if route.path() == &node.path => route,
            Some(Ok(route)) => {
                tracing::error!(id = %node.id, expected = %node.path, found = %route.path(), "Migrated node changed path");
                return Err(AdapterError::InternalConsistency(format!(
                    "node {} moved from \"{}\" to \"{}\" during migration",
                    node.id,
                    node.path,
                    route.path()
                )));
            }
            Some(Err(reloaded)) => {
                tracing::error!(id = %node.id, path = %node.path, kind = reloaded.kind.name(), "Migrated node is not a route");
                return Err(AdapterError::InternalConsistency(format!(
                    "node {} at \"{}\" is still a {} after migration",
                    node.id,
                    node.path,
                    reloaded.kind.name()
                )));
            }
            None => {
                tracing::error!(id = %node.id, path = %node.path, "Migrated node disappeared");
                return Err(AdapterError::InternalConsistency(format!(
                    "node {} at \"{}\" could not be reloaded after migration",
                    node.id, node.path
                )));
            }
        };

        tracing::info!(path = %route.path(), content = %route.content(), "Migrated placeholder to route");
        Ok(route)
    }

    /// Move every direct child of `source` under `dest`, keeping names.
    ///
    /// `dest` must not be `source` or lie below it. Stops at the first name
    /// collision ([`AdapterError::ChildCollision`]) or storage failure
    /// ([`AdapterError::RelocationFailed`]); both report the children
    /// already moved, and nothing is undone.
    pub fn relocate_children(
        &self,
        session: &mut dyn Session,
        source: &AutoRoute,
        dest: &AutoRoute,
    ) -> AdapterResult<Vec<NodePath>> {
        if source.path() == dest.path() || source.path().is_ancestor_of(dest.path()) {
            tracing::warn!(from = %source.path(), to = %dest.path(), "Relocation into own subtree");
            return Err(AdapterError::RelocationIntoSource {
                from: source.path().clone(),
                to: dest.path().clone(),
            });
        }

        let children = session.list_children(source.path())?;
        let mut relocated = Vec::with_capacity(children.len());

        for child in children {
            let target = dest.path().join(child.name())?;
            let occupied = match session.find(&target) {
                Ok(found) => found.is_some(),
                Err(cause) => return Err(relocation_failed(child.path, relocated, cause)),
            };
            if occupied {
                tracing::warn!(
                    from = %child.path,
                    to = %target,
                    relocated = relocated.len(),
                    "Child relocation collision"
                );
                return Err(AdapterError::ChildCollision {
                    path: target,
                    relocated,
                });
            }
            if let Err(cause) = session.move_node(&child.path, &target) {
                return Err(relocation_failed(child.path, relocated, cause));
            }
            relocated.push(target);
        }

        tracing::info!(
            from = %source.path(),
            to = %dest.path(),
            count = relocated.len(),
            "Relocated route children"
        );
        Ok(relocated)
    }

    /// Point `old` at `new` as a redirect. In memory only.
    pub fn create_redirect(&self, old: &mut AutoRoute, new: &AutoRoute) {
        old.set_redirect_target(Some(new.id()));
        old.set_route_type(RouteType::Redirect);
    }

    /// Remove a route and everything below it, then save
    pub fn remove_route(&self, session: &mut dyn Session, route: &AutoRoute) -> AdapterResult<()> {
        if !session.remove(route.path())? {
            return Err(StorageError::NodeNotFound(route.path().clone()).into());
        }
        session.save()?;
        tracing::info!(path = %route.path(), "Removed route");
        Ok(())
    }

    /// The route stored at `base_path + uri`, if that node is a route
    pub fn find_route_for_uri(
        &self,
        session: &dyn Session,
        uri: &str,
    ) -> AdapterResult<Option<AutoRoute>> {
        let path = self.base_path.join_uri(uri)?;
        Ok(session
            .find(&path)?
            .and_then(|node| AutoRoute::try_from(node).ok()))
    }

    /// Every route pointing at `content`, ordered by path
    pub fn referring_routes(
        &self,
        session: &dyn Session,
        content: &ContentRef,
    ) -> AdapterResult<Vec<AutoRoute>> {
        Ok(session
            .find_by_content(content)?
            .into_iter()
            .filter_map(|node| AutoRoute::try_from(node).ok())
            .collect())
    }

    /// The route a redirect points at, if it still exists
    pub fn resolve_redirect(
        &self,
        session: &dyn Session,
        route: &AutoRoute,
    ) -> AdapterResult<Option<AutoRoute>> {
        let Some(target) = route.redirect_target() else {
            return Ok(None);
        };
        Ok(session
            .find_by_id(&target)?
            .and_then(|node| AutoRoute::try_from(node).ok()))
    }
}

fn relocation_failed(path: NodePath, relocated: Vec<NodePath>, cause: StorageError) -> AdapterError {
    tracing::warn!(path = %path, relocated = relocated.len(), error = %cause, "Child relocation failed");
    AdapterError::RelocationFailed {
        path,
        relocated,
        cause,
    }
}
