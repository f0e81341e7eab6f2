//! Repository Pattern for the shuffle collection
//!
//! [`ShuffleStore`] decouples the publisher and the query handler from the
//! backing store, so the same business logic runs against SQLite in
//! production and an in-memory map in tests.
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │   ScheduledPublisher     │   │   ShuffleQueryHandler    │
//! │   count_all + append     │   │   latest                 │
//! └────────────┬─────────────┘   └────────────┬─────────────┘
//!              └──────────────┬───────────────┘
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │    ShuffleStore     │
//!                  └──────────┬──────────┘
//!                 ┌───────────┴───────────┐
//!                 ▼                       ▼
//!        ┌─────────────────┐     ┌─────────────────┐
//!        │     SQLite      │     │     Memory      │
//!        └─────────────────┘     └─────────────────┘
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{ShuffleDocument, ShuffleRecord};

// ============================================================================
// Repository Trait
// ============================================================================

/// Append-and-read-latest access to the shuffle collection
#[async_trait]
pub trait ShuffleStore: Send + Sync {
    /// Total number of persisted records.
    ///
    /// Only used to derive the next entry number; concurrent writers may
    /// observe the same count.
    async fn count_all(&self) -> Result<u64>;

    /// The record with the greatest document key, or `None` when empty
    async fn latest(&self) -> Result<Option<ShuffleRecord>>;

    /// Write a new record under `record.document_key`.
    ///
    /// Keys are write-once: an existing key yields [`Error::DocumentExists`]
    /// and the stored record is left untouched.
    async fn append(&self, record: &ShuffleRecord) -> Result<()>;
}

/// Thread-safe shared store handle
pub type SharedShuffleStore = Arc<dyn ShuffleStore>;

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of [`ShuffleStore`]
///
/// One table per collection with the document key as primary key and the
/// JSON body alongside it. The connection sits behind a `Mutex`; queries run
/// on the blocking thread pool.
pub struct SqliteShuffleStore {
    conn: Arc<Mutex<Connection>>,
    table: Arc<str>,
}

impl SqliteShuffleStore {
    /// Open (or create) a store at `path`
    pub fn open(path: impl AsRef<Path>, collection: &str) -> Result<Self> {
        let path = path.as_ref();
        validate_collection(collection)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::store_unavailable("open", e.to_string()))?;

        // WAL lets readers proceed while the publisher writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self::from_connection(conn, collection)?;
        tracing::info!(path = %path.display(), collection, "SQLite shuffle store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory(collection: &str) -> Result<Self> {
        validate_collection(collection)?;
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::store_unavailable("open", e.to_string()))?;
        Self::from_connection(conn, collection)
    }

    fn from_connection(conn: Connection, collection: &str) -> Result<Self> {
        conn.execute_batch(&format!(
            r#"
                CREATE TABLE IF NOT EXISTS {collection} (
                    document_key TEXT PRIMARY KEY,
                    body TEXT NOT NULL
                );
                "#
        ))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: Arc::from(collection),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table = Arc::clone(&self.table);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::store_unavailable(operation, "connection lock poisoned"))?;
            f(&conn, &table)
        })
        .await
        .map_err(|e| Error::store_unavailable(operation, e.to_string()))?
    }
}

#[async_trait]
impl ShuffleStore for SqliteShuffleStore {
    async fn count_all(&self) -> Result<u64> {
        self.with_conn("count_all", |conn, table| {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .map_err(|e| Error::store_unavailable("count_all", e.to_string()))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn latest(&self) -> Result<Option<ShuffleRecord>> {
        let row = self
            .with_conn("latest", |conn, table| {
                conn.query_row(
                    &format!(
                        "SELECT document_key, body FROM {table} ORDER BY document_key DESC LIMIT 1"
                    ),
                    [],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()
                .map_err(|e| Error::store_unavailable("latest", e.to_string()))
            })
            .await?;

        match row {
            Some((key, body)) => {
                let document: ShuffleDocument = serde_json::from_str(&body)?;
                Ok(Some(ShuffleRecord::new(key, document)))
            }
            None => Ok(None),
        }
    }

    async fn append(&self, record: &ShuffleRecord) -> Result<()> {
        let key = record.document_key.clone();
        let body = serde_json::to_string(&record.document)?;

        self.with_conn("append", move |conn, table| {
            let result = conn.execute(
                &format!("INSERT INTO {table} (document_key, body) VALUES (?1, ?2)"),
                params![key, body],
            );

            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(Error::DocumentExists { key })
                }
                Err(e) => Err(Error::store_unavailable("append", e.to_string())),
            }
        })
        .await
    }
}

/// Collection names become SQL identifiers, so only `[A-Za-z0-9_]` is allowed
fn validate_collection(collection: &str) -> Result<()> {
    let valid = !collection.is_empty()
        && !collection.starts_with(|c: char| c.is_ascii_digit())
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "collection name '{collection}' must match [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}

// ============================================================================
// In-memory Implementation
// ============================================================================

/// In-memory implementation of [`ShuffleStore`]
///
/// A `BTreeMap` keeps documents ordered by key, so `latest` is the last entry.
#[derive(Default)]
pub struct MemoryShuffleStore {
    documents: RwLock<BTreeMap<String, ShuffleDocument>>,
}

impl MemoryShuffleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records
    pub fn len(&self) -> Result<usize> {
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::store_unavailable("len", "lock poisoned"))?;
        Ok(documents.len())
    }

    /// Check if empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ShuffleStore for MemoryShuffleStore {
    async fn count_all(&self) -> Result<u64> {
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::store_unavailable("count_all", "lock poisoned"))?;
        Ok(documents.len() as u64)
    }

    async fn latest(&self) -> Result<Option<ShuffleRecord>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::store_unavailable("latest", "lock poisoned"))?;
        Ok(documents
            .iter()
            .next_back()
            .map(|(key, doc)| ShuffleRecord::new(key.clone(), doc.clone())))
    }

    async fn append(&self, record: &ShuffleRecord) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| Error::store_unavailable("append", "lock poisoned"))?;

        if documents.contains_key(&record.document_key) {
            return Err(Error::DocumentExists {
                key: record.document_key.clone(),
            });
        }
        documents.insert(record.document_key.clone(), record.document.clone());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::{identity, CLASSIC_SIZE, LITE_SIZE};

    fn create_test_stores() -> Vec<Box<dyn ShuffleStore>> {
        vec![
            Box::new(SqliteShuffleStore::in_memory("daily_shuffle").unwrap()),
            Box::new(MemoryShuffleStore::new()),
        ]
    }

    fn record(key: &str, entry_number: u64) -> ShuffleRecord {
        ShuffleRecord::new(
            key,
            ShuffleDocument {
                timestamp: format!("display {key}"),
                entry_number,
                lite: identity(LITE_SIZE).unwrap(),
                classic: identity(CLASSIC_SIZE).unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn test_empty_store() {
        for store in create_test_stores() {
            assert_eq!(store.count_all().await.unwrap(), 0);
            assert!(store.latest().await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_append_then_latest() {
        for store in create_test_stores() {
            let only = record("2024-01-01T00:00:00.000Z", 1);
            store.append(&only).await.unwrap();

            assert_eq!(store.count_all().await.unwrap(), 1);
            assert_eq!(store.latest().await.unwrap(), Some(only));
        }
    }

    #[tokio::test]
    async fn test_latest_is_greatest_key() {
        for store in create_test_stores() {
            let first = record("2024-01-01T00:00:00.000Z", 1);
            let second = record("2024-01-02T00:00:00.000Z", 2);
            store.append(&first).await.unwrap();
            store.append(&second).await.unwrap();

            assert_eq!(store.latest().await.unwrap(), Some(second));
        }
    }

    #[tokio::test]
    async fn test_latest_ignores_insertion_order() {
        for store in create_test_stores() {
            let newer = record("2024-05-01T12:00:00.000Z", 2);
            let older = record("2024-04-30T12:00:00.000Z", 1);
            store.append(&newer).await.unwrap();
            store.append(&older).await.unwrap();

            let latest = store.latest().await.unwrap().unwrap();
            assert_eq!(latest.document_key, "2024-05-01T12:00:00.000Z");
        }
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        for store in create_test_stores() {
            let original = record("2024-01-01T00:00:00.000Z", 1);
            store.append(&original).await.unwrap();

            let clash = record("2024-01-01T00:00:00.000Z", 99);
            let err = store.append(&clash).await.unwrap_err();
            assert!(matches!(err, Error::DocumentExists { .. }));

            assert_eq!(store.count_all().await.unwrap(), 1);
            assert_eq!(store.latest().await.unwrap(), Some(original));
        }
    }

    #[test]
    fn test_invalid_collection_name() {
        assert!(SqliteShuffleStore::in_memory("daily shuffle").is_err());
        assert!(SqliteShuffleStore::in_memory("x; DROP TABLE y").is_err());
        assert!(SqliteShuffleStore::in_memory("1st").is_err());
        assert!(SqliteShuffleStore::in_memory("").is_err());
        assert!(SqliteShuffleStore::in_memory("dailyShuffle").is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_body_is_serialization_error() {
        let store = SqliteShuffleStore::in_memory("daily_shuffle").unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO daily_shuffle (document_key, body) VALUES (?1, ?2)",
                params!["2024-01-01T00:00:00.000Z", "{not json"],
            )
            .unwrap();
        }

        let err = store.latest().await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_memory_store_utilities() {
        let store = MemoryShuffleStore::new();
        assert!(store.is_empty().unwrap());

        store
            .append(&record("2024-01-01T00:00:00.000Z", 1))
            .await
            .unwrap();

        assert!(!store.is_empty().unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_poisoned_lock_is_an_error() {
        let store = Arc::new(MemoryShuffleStore::new());
        store
            .append(&record("2024-01-01T00:00:00.000Z", 1))
            .await
            .unwrap();

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(Error::StoreUnavailable { .. })));
        assert!(store.is_empty().is_err());
        assert!(store.count_all().await.is_err());
        assert!(store.latest().await.is_err());
    }
}
