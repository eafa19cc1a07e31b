//! Shared helpers for route tree integration tests

use autoroute::{AdapterConfig, DocumentStore, NodeKind, NodePath, OpenStore, SqliteStore};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoroute=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Adapter configuration rooted at `base`
pub fn config(base: &str) -> AdapterConfig {
    AdapterConfig {
        route_basepath: base.to_string(),
        ..Default::default()
    }
}

/// Create every segment of `base` as an Intermediate node and save
pub fn create_base(store: &SqliteStore, base: &str) {
    let base = NodePath::parse(base).unwrap();
    let mut session = store.session().unwrap();
    let mut current = session.find(&NodePath::root()).unwrap().unwrap();
    for segment in base.segments() {
        let path = current.path.join(segment).unwrap();
        current = match session.find(&path).unwrap() {
            Some(existing) => existing,
            None => session
                .create_child(&current, segment, NodeKind::Intermediate)
                .unwrap(),
        };
    }
    session.save().unwrap();
}

/// File-backed store with `base` already created
pub fn file_store(dir: &Path, base: &str) -> SqliteStore {
    let store = SqliteStore::open(dir.join("routes.db")).unwrap();
    create_base(&store, base);
    store
}

pub fn path(s: &str) -> NodePath {
    NodePath::parse(s).unwrap()
}
