//! SQLite connection store implementation

use crate::config::{OperatingMode, SixDegreesConfig};
use crate::graph::{ConnectionPath, Identity};
use crate::{Result, SixDegreesError};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS edges (
        from_id INTEGER NOT NULL,
        to_id INTEGER NOT NULL,
        last_updated INTEGER NOT NULL,
        PRIMARY KEY (from_id, to_id)
    );

    CREATE TABLE IF NOT EXISTS searches (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        searcher INTEGER NOT NULL,
        from_id INTEGER NOT NULL,
        to_id INTEGER NOT NULL,
        path_json TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_id);
    CREATE INDEX IF NOT EXISTS idx_searches_pair ON searches(from_id, to_id, created_at);
"#;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to SQLite database file; `None` keeps everything in memory
    pub path: Option<PathBuf>,

    /// Enable WAL mode for better concurrency
    pub wal_mode: bool,

    /// Destructive operations are only allowed in development
    pub mode: OperatingMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("sixdegrees");
        path.push("graph.db");

        Self {
            path: Some(path),
            wal_mode: true,
            mode: OperatingMode::Development,
        }
    }
}

impl StoreConfig {
    /// Store settings for the configured database file and operating mode
    pub fn from_settings(config: &SixDegreesConfig) -> Self {
        Self {
            path: Some(config.database.resolved_path()),
            wal_mode: config.database.wal_mode,
            mode: config.mode,
        }
    }
}

/// An observed adjacency between two identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: Identity,
    pub to: Identity,
    pub last_updated: DateTime<Utc>,
}

impl Edge {
    /// The endpoint opposite `identity`, if the edge touches it
    pub fn other(&self, identity: Identity) -> Option<Identity> {
        if self.from == identity {
            Some(self.to)
        } else if self.to == identity {
            Some(self.from)
        } else {
            None
        }
    }
}

/// A logged search outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub id: i64,
    pub searcher: Identity,
    pub from: Identity,
    pub to: Identity,
    /// Serialized path, as written (JSON array)
    pub path_json: String,
    pub created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Parse the stored path; `None` if it no longer parses
    pub fn path(&self) -> Option<ConnectionPath> {
        ConnectionPath::from_json(&self.path_json)
    }
}

/// Filter for [`ConnectionStore::recent_searches`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub from: Option<Identity>,
    pub to: Option<Identity>,
    pub limit: Option<usize>,
}

impl SearchFilter {
    /// Exact `(from, to)` pair
    pub fn pair(from: Identity, to: Identity) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub edge_count: usize,
    pub search_count: usize,
}

/// Persistent edge cache and search log
///
/// Cheap to clone; clones share the same connection and initialization
/// state. The connection lock is only held for the duration of a single
/// synchronous SQLite call.
#[derive(Clone)]
pub struct ConnectionStore {
    conn: Arc<Mutex<Connection>>,
    initialized: Arc<OnceCell<()>>,
    config: Arc<StoreConfig>,
}

impl std::fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStore")
            .field("config", &self.config)
            .field("initialized", &self.initialized.initialized())
            .finish()
    }
}

impl ConnectionStore {
    /// Open the database and initialize the schema
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::connect(config)?;
        store.initialize().await?;
        Ok(store)
    }

    /// Open a private in-memory store
    pub async fn in_memory(mode: OperatingMode) -> Result<Self> {
        Self::open(StoreConfig {
            path: None,
            wal_mode: false,
            mode,
        })
        .await
    }

    /// Open the database without touching the schema.
    ///
    /// The schema is created by [`initialize`](Self::initialize), which
    /// every operation awaits first.
    pub fn connect(config: StoreConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => {
                // Create parent directory if needed
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                tracing::info!(path = %path.display(), "Opening connection store");
                Connection::open(path)?
            }
            None => {
                tracing::debug!("Opening in-memory connection store");
                Connection::open_in_memory()?
            }
        };

        if config.wal_mode && config.path.is_some() {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            initialized: Arc::new(OnceCell::new()),
            config: Arc::new(config),
        })
    }

    /// Create the schema once.
    ///
    /// Concurrent callers wait on the same in-flight initialization; once it
    /// has succeeded further calls return immediately. A failed attempt
    /// leaves the store uninitialized so the next caller retries.
    pub async fn initialize(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                let conn = self.conn.lock().await;
                tracing::debug!("Initializing connection store schema");
                create_schema(&conn)
            })
            .await?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    /// Insert or refresh the `(from, to)` edge
    pub async fn upsert_edge(&self, from: Identity, to: Identity) -> Result<()> {
        self.upsert_edges(&[(from, to)]).await
    }

    /// Insert or refresh many edges in one transaction
    pub async fn upsert_edges(&self, edges: &[(Identity, Identity)]) -> Result<()> {
        if edges.is_empty() {
            return Ok(());
        }
        self.initialize().await?;

        let now = now_millis();
        let conn = self.conn.lock().await;
        with_schema_retry(&conn, |conn| {
            let tx = conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT OR REPLACE INTO edges (from_id, to_id, last_updated) VALUES (?1, ?2, ?3)",
                )?;
                for (from, to) in edges {
                    stmt.execute(params![from.get(), to.get(), now])?;
                }
            }
            tx.commit()
        })?;

        tracing::trace!(edges = edges.len(), "Edges upserted");
        Ok(())
    }

    /// All edges touching `identity`, in either direction.
    ///
    /// Never fails: storage errors are logged and yield an empty list.
    pub async fn edges_from(&self, identity: Identity) -> Vec<Edge> {
        match self.try_edges_from(identity).await {
            Ok(edges) => edges,
            Err(e) => {
                tracing::warn!(identity = %identity, error = %e, "Failed to read stored edges");
                Vec::new()
            }
        }
    }

    async fn try_edges_from(&self, identity: Identity) -> Result<Vec<Edge>> {
        self.initialize().await?;
        let conn = self.conn.lock().await;

        let rows = read_or_create(&conn, |conn| {
            let mut stmt = conn.prepare_cached(
                r#"
                SELECT from_id, to_id, last_updated FROM edges
                WHERE from_id = ?1 OR to_id = ?1
                ORDER BY last_updated DESC
                "#,
            )?;
            let rows = stmt.query_map(params![identity.get()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(from, to, updated)| {
                Some(Edge {
                    from: Identity::new(from)?,
                    to: Identity::new(to)?,
                    last_updated: from_millis(updated),
                })
            })
            .collect())
    }

    /// Whether an edge between `a` and `b` is stored, in either direction.
    ///
    /// Storage errors read as `false`.
    pub async fn has_edge_between(&self, a: Identity, b: Identity) -> bool {
        match self.try_has_edge_between(a, b).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(a = %a, b = %b, error = %e, "Failed to check stored edge");
                false
            }
        }
    }

    async fn try_has_edge_between(&self, a: Identity, b: Identity) -> Result<bool> {
        self.initialize().await?;
        let conn = self.conn.lock().await;

        read_or_create(&conn, |conn| {
            conn.prepare_cached(
                r#"
                SELECT 1 FROM edges
                WHERE (from_id = ?1 AND to_id = ?2) OR (from_id = ?2 AND to_id = ?1)
                LIMIT 1
                "#,
            )?
            .exists(params![a.get(), b.get()])
        })
    }

    /// Distinct identities sharing a stored edge with `identity`
    pub async fn stored_neighbors(&self, identity: Identity) -> Vec<Identity> {
        let mut neighbors: Vec<Identity> = self
            .edges_from(identity)
            .await
            .iter()
            .filter_map(|edge| edge.other(identity))
            .filter(|other| *other != identity)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Append a search outcome to the log, returning its row id
    pub async fn record_search(
        &self,
        searcher: Identity,
        from: Identity,
        to: Identity,
        path: &ConnectionPath,
    ) -> Result<i64> {
        self.initialize().await?;

        let path_json = path.to_json();
        let now = now_millis();
        let conn = self.conn.lock().await;
        let id = with_schema_retry(&conn, |conn| {
            conn.execute(
                r#"
                INSERT INTO searches (searcher, from_id, to_id, path_json, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![searcher.get(), from.get(), to.get(), &path_json, now],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        tracing::debug!(id, searcher = %searcher, from = %from, to = %to, "Search recorded");
        Ok(id)
    }

    /// Matching searches, most recent first.
    ///
    /// Never fails: storage errors are logged and yield an empty list.
    pub async fn recent_searches(&self, filter: SearchFilter) -> Vec<SearchRecord> {
        match self.try_recent_searches(filter).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(?filter, error = %e, "Failed to read recent searches");
                Vec::new()
            }
        }
    }

    async fn try_recent_searches(&self, filter: SearchFilter) -> Result<Vec<SearchRecord>> {
        self.initialize().await?;

        let mut sql = String::from(
            "SELECT id, searcher, from_id, to_id, path_json, created_at FROM searches WHERE 1=1",
        );
        let mut args: Vec<i64> = Vec::new();
        if let Some(from) = filter.from {
            sql.push_str(" AND from_id = ?");
            args.push(from.get());
        }
        if let Some(to) = filter.to {
            sql.push_str(" AND to_id = ?");
            args.push(to.get());
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let conn = self.conn.lock().await;
        let rows = read_or_create(&conn, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, searcher, from, to, path_json, created_at)| {
                Some(SearchRecord {
                    id,
                    searcher: Identity::new(searcher)?,
                    from: Identity::new(from)?,
                    to: Identity::new(to)?,
                    path_json,
                    created_at: from_millis(created_at),
                })
            })
            .collect())
    }

    /// Drop and recreate all state. Refused in production.
    pub async fn reset_all(&self) -> Result<()> {
        if self.config.mode == OperatingMode::Production {
            return Err(SixDegreesError::Forbidden(
                "resetting the connection store is only available in development".to_string(),
            ));
        }
        self.initialize().await?;

        tracing::info!("Resetting connection store");
        let conn = self.conn.lock().await;
        conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS edges;
            DROP TABLE IF EXISTS searches;
            "#,
        )?;
        create_schema(&conn)
    }

    /// Get store statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        self.initialize().await?;
        let conn = self.conn.lock().await;

        let edge_count: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        let search_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))?;

        Ok(StoreStats {
            edge_count: edge_count as usize,
            search_count: search_count as usize,
        })
    }

    /// Timestamp of a single stored edge, if present
    pub async fn edge_updated_at(&self, from: Identity, to: Identity) -> Option<DateTime<Utc>> {
        self.initialize().await.ok()?;
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT last_updated FROM edges WHERE from_id = ?1 AND to_id = ?2",
            params![from.get(), to.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .ok()
        .flatten()
        .map(from_millis)
    }

    /// Get the database path (`None` for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }

    pub fn mode(&self) -> OperatingMode {
        self.config.mode
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("no such table")
    )
}

/// Run a write; if a table has gone missing, recreate the schema and retry once
fn with_schema_retry<T>(
    conn: &Connection,
    op: impl Fn(&Connection) -> rusqlite::Result<T>,
) -> Result<T> {
    match op(conn) {
        Err(e) if is_missing_table(&e) => {
            tracing::warn!(error = %e, "Store table missing, recreating schema");
            create_schema(conn)?;
            Ok(op(conn)?)
        }
        other => Ok(other?),
    }
}

/// Run a read; a missing table is recreated and reads as empty
fn read_or_create<T: Default>(
    conn: &Connection,
    op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
) -> Result<T> {
    match op(conn) {
        Err(e) if is_missing_table(&e) => {
            tracing::info!(error = %e, "Store table missing on read, recreating schema");
            create_schema(conn)?;
            Ok(T::default())
        }
        other => Ok(other?),
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn id(raw: i64) -> Identity {
        Identity::new(raw).unwrap()
    }

    fn path(raw: &[i64]) -> ConnectionPath {
        ConnectionPath::from_identities(raw.iter().map(|r| id(*r)).collect()).unwrap()
    }

    async fn memory_store() -> ConnectionStore {
        ConnectionStore::in_memory(OperatingMode::Development)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_creation_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            path: Some(temp_dir.path().join("nested").join("graph.db")),
            ..Default::default()
        };

        let store = ConnectionStore::open(config).await.unwrap();
        assert!(store.path().unwrap().exists());
        assert!(store.is_initialized());
    }

    #[tokio::test]
    async fn test_store_and_retrieve_edges() {
        let store = memory_store().await;
        store.upsert_edge(id(1), id(2)).await.unwrap();

        let edges = store.edges_from(id(1)).await;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, id(1));
        assert_eq!(edges[0].to, id(2));

        // Symmetric lookup from the other endpoint
        let edges = store.edges_from(id(2)).await;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].other(id(2)), Some(id(1)));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = memory_store().await;
        store.upsert_edge(id(1), id(2)).await.unwrap();
        let first = store.edge_updated_at(id(1), id(2)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        store.upsert_edge(id(1), id(2)).await.unwrap();
        let second = store.edge_updated_at(id(1), id(2)).await.unwrap();

        assert_eq!(store.stats().await.unwrap().edge_count, 1);
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_unknown_identity_has_no_edges() {
        let store = memory_store().await;
        assert!(store.edges_from(id(42)).await.is_empty());
        assert!(store.stored_neighbors(id(42)).await.is_empty());
    }

    #[tokio::test]
    async fn test_stored_neighbors_dedup() {
        let store = memory_store().await;
        store
            .upsert_edges(&[(id(1), id(2)), (id(2), id(1)), (id(3), id(1))])
            .await
            .unwrap();
        assert_eq!(store.stored_neighbors(id(1)).await, vec![id(2), id(3)]);
    }

    #[tokio::test]
    async fn test_record_search_assigns_ids() {
        let store = memory_store().await;
        let first = store
            .record_search(id(1), id(2), id(3), &path(&[2, 4, 3]))
            .await
            .unwrap();
        let second = store
            .record_search(id(1), id(2), id(3), &path(&[2, 5, 3]))
            .await
            .unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_recent_searches_most_recent_first() {
        let store = memory_store().await;
        store
            .record_search(id(1), id(2), id(3), &path(&[2, 4, 3]))
            .await
            .unwrap();
        store
            .record_search(id(9), id(7), id(8), &path(&[7, 8]))
            .await
            .unwrap();
        store
            .record_search(id(1), id(2), id(3), &path(&[2, 5, 3]))
            .await
            .unwrap();

        let pair = store
            .recent_searches(SearchFilter::pair(id(2), id(3)))
            .await;
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].path(), Some(path(&[2, 5, 3])));
        assert_eq!(pair[1].path(), Some(path(&[2, 4, 3])));

        let latest = store
            .recent_searches(SearchFilter::default().with_limit(1))
            .await;
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].from, id(2));

        let none = store
            .recent_searches(SearchFilter::pair(id(3), id(2)))
            .await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_missing_table_recreated_on_write() {
        let store = memory_store().await;
        {
            let conn = store.conn.lock().await;
            conn.execute_batch("DROP TABLE edges; DROP TABLE searches;")
                .unwrap();
        }

        // Reads degrade to empty and repair the schema
        assert!(store.edges_from(id(1)).await.is_empty());

        {
            let conn = store.conn.lock().await;
            conn.execute_batch("DROP TABLE edges;").unwrap();
        }
        // Writes repair the schema and succeed
        store.upsert_edge(id(1), id(2)).await.unwrap();
        assert_eq!(store.edges_from(id(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_has_edge_between_either_direction() {
        let store = memory_store().await;
        store.upsert_edge(id(2), id(1)).await.unwrap();
        store.upsert_edge(id(2), id(3)).await.unwrap();

        assert!(store.has_edge_between(id(1), id(2)).await);
        assert!(store.has_edge_between(id(2), id(1)).await);
        assert!(!store.has_edge_between(id(1), id(3)).await);
        assert!(!store.has_edge_between(id(7), id(8)).await);
    }

    #[tokio::test]
    async fn test_search_survives_failed_cache_writes() {
        use crate::graph::SnapshotProvider;
        use crate::search::PathFinder;

        let store = memory_store().await;
        store.initialize().await.unwrap();
        {
            let conn = store.conn.lock().await;
            conn.pragma_update(None, "query_only", true).unwrap();
        }
        assert!(store.upsert_edge(id(1), id(2)).await.is_err());

        let provider = SnapshotProvider::from_follows([(1, 2), (2, 3)]);
        let finder = PathFinder::new(provider, store.clone());
        let found = finder.find_path(id(1), id(3)).await.unwrap();

        assert_eq!(found, path(&[1, 2, 3]));
        assert_eq!(store.stats().await.unwrap().edge_count, 0);
    }

    #[tokio::test]
    async fn test_reset_all_in_development() {
        let store = memory_store().await;
        store.upsert_edge(id(1), id(2)).await.unwrap();
        store
            .record_search(id(1), id(1), id(2), &path(&[1, 2]))
            .await
            .unwrap();

        store.reset_all().await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.search_count, 0);
    }

    #[tokio::test]
    async fn test_reset_refused_in_production() {
        let store = ConnectionStore::in_memory(OperatingMode::Production)
            .await
            .unwrap();
        store.upsert_edge(id(1), id(2)).await.unwrap();

        let result = store.reset_all().await;
        assert!(matches!(result, Err(SixDegreesError::Forbidden(_))));
        assert_eq!(store.stats().await.unwrap().edge_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConnectionStore::connect(StoreConfig {
            path: Some(temp_dir.path().join("graph.db")),
            ..Default::default()
        })
        .unwrap();
        assert!(!store.is_initialized());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.initialize().await })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }

        assert!(store.is_initialized());
        store.upsert_edge(id(1), id(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_upserts_same_key() {
        let store = memory_store().await;
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert_edge(id(5), id(6)).await })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }
        assert_eq!(store.stats().await.unwrap().edge_count, 1);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            path: Some(temp_dir.path().join("graph.db")),
            ..Default::default()
        };

        {
            let store = ConnectionStore::open(config.clone()).await.unwrap();
            store.upsert_edge(id(1), id(2)).await.unwrap();
            store
                .record_search(id(1), id(1), id(2), &path(&[1, 2]))
                .await
                .unwrap();
        }

        let store = ConnectionStore::open(config).await.unwrap();
        assert_eq!(store.stored_neighbors(id(1)).await, vec![id(2)]);
        assert_eq!(
            store.recent_searches(SearchFilter::pair(id(1), id(2))).await.len(),
            1
        );
    }

    #[test]
    fn test_edge_other() {
        let edge = Edge {
            from: id(1),
            to: id(2),
            last_updated: Utc::now(),
        };
        assert_eq!(edge.other(id(1)), Some(id(2)));
        assert_eq!(edge.other(id(2)), Some(id(1)));
        assert_eq!(edge.other(id(3)), None);
    }
}
