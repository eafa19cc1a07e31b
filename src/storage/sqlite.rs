//! SQLite storage backend

use super::traits::{DocumentStore, OpenStore, Session, StorageError, StorageResult};
use crate::tree::{ContentRef, Node, NodeId, NodeKind, NodeMetadata, NodePath, RouteData};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Columns selected for every node query, in `NodeRow` order
const NODE_COLUMNS: &str = "id, path, kind, route_json, metadata_json";

/// (id, path, kind, route_json, metadata_json)
type NodeRow = (String, String, String, Option<String>, String);

/// SQLite-backed document store
///
/// One table keyed by path; `parent_path` indexes the tree shape.
/// Thread-safe via internal mutex on the connection. A session holds the
/// connection for its whole lifetime; opening another one meanwhile fails
/// with [`StorageError::Busy`]. Read-write sessions run inside an
/// immediate transaction, read sessions inside a deferred one, so readers
/// in other processes do not block writers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema and the root node
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                path TEXT PRIMARY KEY,
                parent_path TEXT,
                id TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                route_json TEXT,
                metadata_json TEXT NOT NULL
            );

            -- Child listing
            CREATE INDEX IF NOT EXISTS idx_nodes_parent
                ON nodes(parent_path);

            -- Referrer lookups only scan routes
            CREATE INDEX IF NOT EXISTS idx_nodes_kind
                ON nodes(kind);

            -- WAL lets deferred readers in other connections run during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;

        let root = Node::new(NodePath::root(), NodeKind::Intermediate);
        conn.execute(
            "INSERT OR IGNORE INTO nodes (path, parent_path, id, kind, route_json, metadata_json)
             VALUES ('/', NULL, ?1, ?2, NULL, ?3)",
            params![
                root.id.to_string(),
                root.kind.name(),
                serde_json::to_string(&root.metadata)?
            ],
        )?;

        Ok(())
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize a node to (id, kind, route_json, metadata_json)
    fn node_to_row(node: &Node) -> StorageResult<(String, &'static str, Option<String>, String)> {
        let route_json = match &node.kind {
            NodeKind::Route(route) => Some(serde_json::to_string(route)?),
            _ => None,
        };
        Ok((
            node.id.to_string(),
            node.kind.name(),
            route_json,
            serde_json::to_string(&node.metadata)?,
        ))
    }

    /// Deserialize a node from database columns
    fn row_to_node(row: NodeRow) -> StorageResult<Node> {
        let (id, path, kind, route_json, metadata_json) = row;
        let corrupt = |reason: String| StorageError::CorruptRow {
            path: path.clone(),
            reason,
        };

        let id: NodeId = id.parse().map_err(|e: uuid::Error| corrupt(e.to_string()))?;
        let node_path = NodePath::parse(path.as_str()).map_err(|e| corrupt(e.to_string()))?;
        let kind = match (kind.as_str(), route_json) {
            ("intermediate", _) => NodeKind::Intermediate,
            ("placeholder", _) => NodeKind::Placeholder,
            ("route", Some(json)) => NodeKind::Route(serde_json::from_str::<RouteData>(&json)?),
            ("route", None) => return Err(corrupt("route without payload".to_string())),
            (other, _) => return Err(corrupt(format!("unknown kind '{}'", other))),
        };
        let metadata: NodeMetadata = serde_json::from_str(&metadata_json)?;

        Ok(Node {
            id,
            path: node_path,
            kind,
            metadata,
        })
    }

    fn query_nodes<P: rusqlite::Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> StorageResult<Vec<Node>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(Self::row_to_node(row?)?);
        }
        Ok(nodes)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl SqliteStore {
    fn open_session(&self, read_only: bool) -> StorageResult<SqliteSession<'_>> {
        let conn = match self.conn.try_lock() {
            Ok(conn) => conn,
            Err(TryLockError::WouldBlock) => return Err(StorageError::Busy),
            Err(TryLockError::Poisoned(_)) => return Err(StorageError::LockPoisoned),
        };
        let session = SqliteSession {
            conn,
            pending: false,
            read_only,
        };
        session.begin()?;
        Ok(session)
    }
}

impl DocumentStore for SqliteStore {
    fn session(&self) -> StorageResult<Box<dyn Session + '_>> {
        Ok(Box::new(self.open_session(false)?))
    }

    fn read_session(&self) -> StorageResult<Box<dyn Session + '_>> {
        Ok(Box::new(self.open_session(true)?))
    }
}

/// Session over a locked SQLite connection
pub struct SqliteSession<'a> {
    conn: MutexGuard<'a, Connection>,
    pending: bool,
    read_only: bool,
}

impl SqliteSession<'_> {
    fn begin(&self) -> StorageResult<()> {
        let sql = if self.read_only {
            "BEGIN DEFERRED"
        } else {
            "BEGIN IMMEDIATE"
        };
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn ensure_writable(&self) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        Ok(())
    }

    fn exists(&self, path: &NodePath) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM nodes WHERE path = ?1",
                params![path.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl Session for SqliteSession<'_> {
    fn find(&self, path: &NodePath) -> StorageResult<Option<Node>> {
        let sql = format!("SELECT {} FROM nodes WHERE path = ?1", NODE_COLUMNS);
        Ok(SqliteStore::query_nodes(&self.conn, &sql, params![path.as_str()])?
            .into_iter()
            .next())
    }

    fn find_by_id(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let sql = format!("SELECT {} FROM nodes WHERE id = ?1", NODE_COLUMNS);
        Ok(SqliteStore::query_nodes(&self.conn, &sql, params![id.to_string()])?
            .into_iter()
            .next())
    }

    fn list_children(&self, path: &NodePath) -> StorageResult<Vec<Node>> {
        let sql = format!(
            "SELECT {} FROM nodes WHERE parent_path = ?1 ORDER BY path",
            NODE_COLUMNS
        );
        SqliteStore::query_nodes(&self.conn, &sql, params![path.as_str()])
    }

    fn persist(&mut self, node: &Node) -> StorageResult<()> {
        self.ensure_writable()?;
        let parent = node.path.parent().ok_or(StorageError::RootImmutable)?;
        if !self.exists(&parent)? {
            return Err(StorageError::ParentMissing(parent));
        }

        let (id, kind, route_json, metadata_json) = SqliteStore::node_to_row(node)?;
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM nodes WHERE path = ?1",
                params![node.path.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some_and(|existing| existing != id) {
            return Err(StorageError::PathOccupied(node.path.clone()));
        }

        self.conn.execute(
            r#"
            INSERT INTO nodes (path, parent_path, id, kind, route_json, metadata_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(path) DO UPDATE SET
                kind = excluded.kind,
                route_json = excluded.route_json,
                metadata_json = excluded.metadata_json
            "#,
            params![
                node.path.as_str(),
                parent.as_str(),
                id,
                kind,
                route_json,
                metadata_json
            ],
        )?;
        self.pending = true;

        Ok(())
    }

    fn move_node(&mut self, from: &NodePath, to: &NodePath) -> StorageResult<()> {
        self.ensure_writable()?;
        if from.is_root() || to.is_root() {
            return Err(StorageError::RootImmutable);
        }
        if from == to || from.is_ancestor_of(to) {
            return Err(StorageError::InvalidMove {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if !self.exists(from)? {
            return Err(StorageError::NodeNotFound(from.clone()));
        }
        if self.exists(to)? {
            return Err(StorageError::PathOccupied(to.clone()));
        }
        let to_parent = to.parent().ok_or(StorageError::RootImmutable)?;
        if !self.exists(&to_parent)? {
            return Err(StorageError::ParentMissing(to_parent));
        }

        // Descendants: swap the `from` prefix for `to` in path and parent_path
        self.conn.execute(
            r#"
            UPDATE nodes SET
                path = ?2 || substr(path, length(?1) + 1),
                parent_path = ?2 || substr(parent_path, length(?1) + 1)
            WHERE substr(path, 1, length(?1) + 1) = ?1 || '/'
            "#,
            params![from.as_str(), to.as_str()],
        )?;
        self.conn.execute(
            "UPDATE nodes SET path = ?2, parent_path = ?3 WHERE path = ?1",
            params![from.as_str(), to.as_str(), to_parent.as_str()],
        )?;
        self.pending = true;

        tracing::debug!(from = %from, to = %to, "Moved node");
        Ok(())
    }

    fn remove(&mut self, path: &NodePath) -> StorageResult<bool> {
        self.ensure_writable()?;
        if path.is_root() {
            return Err(StorageError::RootImmutable);
        }

        let rows = self.conn.execute(
            "DELETE FROM nodes WHERE path = ?1 OR substr(path, 1, length(?1) + 1) = ?1 || '/'",
            params![path.as_str()],
        )?;
        if rows > 0 {
            self.pending = true;
            tracing::debug!(path = %path, removed = rows, "Removed subtree");
        }
        Ok(rows > 0)
    }

    fn rewrite_kind(&mut self, path: &NodePath, kind: &NodeKind) -> StorageResult<()> {
        self.ensure_writable()?;
        let route_json = match kind {
            NodeKind::Route(route) => Some(serde_json::to_string(route)?),
            _ => None,
        };

        let rows = self.conn.execute(
            r#"
            UPDATE nodes SET
                kind = ?2,
                route_json = ?3,
                metadata_json = json_set(metadata_json, '$.modified_at', ?4)
            WHERE path = ?1
            "#,
            params![
                path.as_str(),
                kind.name(),
                route_json,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::NodeNotFound(path.clone()));
        }
        self.pending = true;

        Ok(())
    }

    fn find_by_content(&self, content: &ContentRef) -> StorageResult<Vec<Node>> {
        let sql = format!(
            "SELECT {} FROM nodes
             WHERE kind = 'route' AND json_extract(route_json, '$.content') = ?1
             ORDER BY path",
            NODE_COLUMNS
        );
        SqliteStore::query_nodes(&self.conn, &sql, params![content.as_str()])
    }

    fn save(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        self.begin()?;
        self.pending = false;
        Ok(())
    }

    fn has_pending_changes(&self) -> bool {
        self.pending
    }
}

impl Drop for SqliteSession<'_> {
    fn drop(&mut self) {
        if self.pending {
            tracing::debug!("Discarding unsaved session changes");
        }
        if !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %e, "Failed to roll back session");
            }
        }
    }
}
