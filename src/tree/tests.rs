//! Serialization tests with document fixtures

use serde_json::{json, Value};

/// Fixture: a route node as written by the store
fn route_node_fixture() -> Value {
    json!({
        "id": "5f0c7f0e-2f7a-4c1e-9d55-0f2b6a3c9e11",
        "path": "/routes/news/2020/my-article",
        "kind": "route",
        "class": "auto_route",
        "content": "article:42",
        "tag": "en",
        "route_type": "primary",
        "metadata": {
            "created_at": "2020-05-01T10:00:00Z"
        }
    })
}

/// Fixture: a redirect route pointing at another node
fn redirect_node_fixture() -> Value {
    json!({
        "id": "9a1d8a52-6b55-4b8f-8a4e-1d3c2b7e0f00",
        "path": "/routes/news/old-article",
        "kind": "route",
        "class": "auto_route",
        "content": "article:42",
        "tag": "no-multilang",
        "route_type": "redirect",
        "redirect_target": "5f0c7f0e-2f7a-4c1e-9d55-0f2b6a3c9e11"
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::tree::{
        AutoRoute, ContentRef, Node, NodeId, NodeKind, NodePath, RouteData, RouteType,
        DEFAULT_ROUTE_CLASS,
    };

    fn route_node(path: &str) -> Node {
        Node::new(
            NodePath::parse(path).unwrap(),
            NodeKind::Route(RouteData::primary(
                DEFAULT_ROUTE_CLASS,
                ContentRef::new("article:42"),
                "en",
            )),
        )
    }

    #[test]
    fn node_id_serializes_as_uuid_string() {
        let id: NodeId = "5f0c7f0e-2f7a-4c1e-9d55-0f2b6a3c9e11".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"5f0c7f0e-2f7a-4c1e-9d55-0f2b6a3c9e11\"");
    }

    #[test]
    fn route_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RouteType::Primary).unwrap(), "\"primary\"");
        assert_eq!(serde_json::to_string(&RouteType::Redirect).unwrap(), "\"redirect\"");
    }

    #[test]
    fn structural_kinds_serialize_as_tag_only() {
        let node = Node::new(NodePath::parse("/routes/news").unwrap(), NodeKind::Intermediate);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "intermediate");
        assert!(json.get("content").is_none());

        let node = Node::new(NodePath::parse("/routes/news").unwrap(), NodeKind::Placeholder);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "placeholder");
    }

    #[test]
    fn route_payload_is_flattened_into_node() {
        let json = serde_json::to_value(route_node("/routes/a")).unwrap();
        assert_eq!(json["kind"], "route");
        assert_eq!(json["content"], "article:42");
        assert_eq!(json["route_type"], "primary");
        // No redirect target on primary routes
        assert!(json.get("redirect_target").is_none());
    }

    #[test]
    fn can_deserialize_route_node_fixture() {
        let result: Result<Node, _> = serde_json::from_value(route_node_fixture());
        assert!(result.is_ok(), "Failed to deserialize route fixture: {:?}", result.err());

        let node = result.unwrap();
        assert_eq!(node.path.as_str(), "/routes/news/2020/my-article");
        let route = node.route().unwrap();
        assert_eq!(route.content.as_str(), "article:42");
        assert_eq!(route.tag, "en");
        assert_eq!(route.route_type, RouteType::Primary);
        assert!(node.metadata.created_at.is_some());
    }

    #[test]
    fn can_deserialize_redirect_node_fixture() {
        let node: Node = serde_json::from_value(redirect_node_fixture()).unwrap();
        let route = AutoRoute::try_from(node).unwrap();
        assert_eq!(route.route_type(), RouteType::Redirect);
        assert_eq!(
            route.redirect_target(),
            Some("5f0c7f0e-2f7a-4c1e-9d55-0f2b6a3c9e11".parse().unwrap())
        );
    }

    #[test]
    fn node_roundtrip() {
        let node = route_node("/routes/news/my-article");
        let json = serde_json::to_string(&node).unwrap();
        let node2: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, node2);
    }

    #[test]
    fn auto_route_rejects_non_route_nodes() {
        let placeholder = Node::new(NodePath::parse("/routes/a").unwrap(), NodeKind::Placeholder);
        let id = placeholder.id;
        let rejected = AutoRoute::try_from(placeholder).unwrap_err();
        assert_eq!(rejected.id, id);
    }

    #[test]
    fn auto_route_setters_update_payload() {
        let mut route = AutoRoute::try_from(route_node("/routes/a")).unwrap();
        let target = NodeId::new();

        route.set_route_type(RouteType::Redirect);
        route.set_redirect_target(Some(target));
        route.set_tag("de");

        assert_eq!(route.route_type(), RouteType::Redirect);
        assert_eq!(route.redirect_target(), Some(target));
        assert_eq!(route.tag(), "de");
        assert!(route.as_node().metadata.modified_at.is_some());
    }
}
