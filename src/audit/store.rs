//! Audit trail storage with async `SQLite` operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use super::error::AuditError;
use super::schema::SCHEMA;
use super::types::AuditRecord;

/// Returns the default path for the audit database.
///
/// This is `~/.local/share/billsplit/audit.db` on Unix systems.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billsplit")
        .join("audit.db")
}

/// Append-only store of [`AuditRecord`]s.
///
/// Owns record identifiers: inserts assign a strictly increasing rowid, updates
/// are keyed by it. Uses `SQLite` for persistent storage with async operations
/// via `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct AuditStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl AuditStore {
    /// Open an audit store at the specified path.
    ///
    /// Creates parent directories if they don't exist and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot
    /// be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    AuditError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let path_clone = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, AuditError> {
            let conn =
                Connection::open(&path_clone).map_err(|source| AuditError::DatabaseOpen {
                    path: path_clone,
                    source,
                })?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open an in-memory audit store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or the schema cannot
    /// be applied.
    pub async fn open_in_memory() -> Result<Self, AuditError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, AuditError> {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert a freshly started record and return its assigned identifier.
    ///
    /// Only the request half of the record is written; outcome columns keep
    /// their defaults until [`mark_completed`](Self::mark_completed) or
    /// [`mark_failed`](Self::mark_failed).
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_started(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let operation = record.operation.clone();
        let endpoint = record.endpoint.clone();
        let request = record.request.clone();
        let request_time = record.request_time.to_rfc3339();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<i64, AuditError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO records (operation, endpoint, request, request_time)
                 VALUES (?1, ?2, ?3, ?4)",
                params![operation, endpoint, request, request_time],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Transition a record to its successful terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_completed(
        &self,
        id: i64,
        response: String,
        response_time: DateTime<Utc>,
        duration_ms: i64,
    ) -> Result<(), AuditError> {
        let response_time = response_time.to_rfc3339();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), AuditError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "UPDATE records
                 SET response = ?1, response_time = ?2, duration_ms = ?3, successful = 1
                 WHERE id = ?4",
                params![response, response_time, duration_ms, id],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Transition a record to its failed terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_failed(
        &self,
        id: i64,
        error_message: String,
        response_time: DateTime<Utc>,
        duration_ms: i64,
    ) -> Result<(), AuditError> {
        let response_time = response_time.to_rfc3339();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), AuditError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "UPDATE records
                 SET error_message = ?1, response_time = ?2, duration_ms = ?3, successful = 0
                 WHERE id = ?4",
                params![error_message, response_time, duration_ms, id],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Mean execution duration across successful records for an operation.
    ///
    /// Returns `None` when no successful records exist for the name, rather
    /// than a storage-layer default.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn average_duration_ms(
        &self,
        operation: impl Into<String>,
    ) -> Result<Option<f64>, AuditError> {
        let operation = operation.into();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<f64>, AuditError> {
            let conn = conn.blocking_lock();
            // AVG over zero rows yields SQL NULL, surfaced here as None.
            let avg: Option<f64> = conn.query_row(
                "SELECT AVG(duration_ms) FROM records WHERE operation = ?1 AND successful = 1",
                params![operation],
                |row| row.get(0),
            )?;
            Ok(avg)
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Get recent records in reverse insertion order with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn recent(&self, limit: usize, offset: usize) -> Result<Vec<AuditRecord>, AuditError> {
        self.query(None, None, limit, offset).await
    }

    /// Query records, optionally filtered by operation name and success flag,
    /// in reverse insertion order with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(
        &self,
        operation: Option<String>,
        successful: Option<bool>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditRecord>, AuditError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<AuditRecord>, AuditError> {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(
                "SELECT id, operation, endpoint, request, response, request_time,
                        response_time, duration_ms, error_message, successful
                 FROM records
                 WHERE (?1 IS NULL OR operation = ?1)
                   AND (?2 IS NULL OR successful = ?2)
                 ORDER BY id DESC LIMIT ?3 OFFSET ?4",
            )?;

            let records = stmt
                .query_map(
                    params![
                        operation,
                        successful,
                        i64::try_from(limit).unwrap_or(i64::MAX),
                        i64::try_from(offset).unwrap_or(i64::MAX)
                    ],
                    row_to_record,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Get records for an operation name in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_operation(
        &self,
        operation: impl Into<String>,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, AuditError> {
        let operation = operation.into();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<AuditRecord>, AuditError> {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(
                "SELECT id, operation, endpoint, request, response, request_time,
                        response_time, duration_ms, error_message, successful
                 FROM records WHERE operation = ?1 ORDER BY id LIMIT ?2",
            )?;

            let records = stmt
                .query_map(
                    params![operation, i64::try_from(limit).unwrap_or(i64::MAX)],
                    row_to_record,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Look up a single record by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<AuditRecord>, AuditError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<AuditRecord>, AuditError> {
            let conn = conn.blocking_lock();
            let record = conn
                .query_row(
                    "SELECT id, operation, endpoint, request, response, request_time,
                            response_time, duration_ms, error_message, successful
                     FROM records WHERE id = ?1",
                    params![id],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }

    /// Count total records in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<u64, AuditError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, AuditError> {
            let conn = conn.blocking_lock();
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
            Ok(count.unsigned_abs())
        })
        .await
        .map_err(|_| AuditError::TaskCancelled)?
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    let request_time: String = row.get(5)?;
    let response_time: Option<String> = row.get(6)?;

    Ok(AuditRecord {
        id: Some(row.get(0)?),
        operation: row.get(1)?,
        endpoint: row.get(2)?,
        request: row.get(3)?,
        response: row.get(4)?,
        request_time: parse_timestamp(&request_time),
        response_time: response_time.as_deref().map(parse_timestamp),
        duration_ms: row.get(7)?,
        error_message: row.get(8)?,
        successful: row.get(9)?,
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(operation: &str) -> AuditRecord {
        AuditRecord::started(
            operation,
            format!("/api/math/{operation}"),
            &serde_json::json!({"a": 1.0, "b": 2.0}),
        )
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let store = AuditStore::open_in_memory().await.unwrap();
        assert!(store.path().is_none());
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = AuditStore::open_in_memory().await.unwrap();

        let first = store.insert_started(&started("add")).await.unwrap();
        let second = store.insert_started(&started("add")).await.unwrap();
        let third = store.insert_started(&started("divide")).await.unwrap();

        assert!(first < second);
        assert!(second < third);
    }

    #[tokio::test]
    async fn test_mark_completed() {
        let store = AuditStore::open_in_memory().await.unwrap();
        let id = store.insert_started(&started("add")).await.unwrap();

        store
            .mark_completed(id, "3.0".to_string(), Utc::now(), 12)
            .await
            .unwrap();

        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert!(record.successful);
        assert_eq!(record.response, "3.0");
        assert_eq!(record.duration_ms, Some(12));
        assert!(record.error_message.is_empty());
        assert!(record.response_time.is_some());
    }

    #[tokio::test]
    async fn test_mark_failed() {
        let store = AuditStore::open_in_memory().await.unwrap();
        let id = store.insert_started(&started("divide")).await.unwrap();

        store
            .mark_failed(id, "Cannot divide by zero".to_string(), Utc::now(), 3)
            .await
            .unwrap();

        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert!(!record.successful);
        assert_eq!(record.error_message, "Cannot divide by zero");
        assert!(record.response.is_empty());
        assert_eq!(record.duration_ms, Some(3));
    }

    #[tokio::test]
    async fn test_average_duration_successful_only() {
        let store = AuditStore::open_in_memory().await.unwrap();

        for duration in [10, 20, 30] {
            let id = store.insert_started(&started("add")).await.unwrap();
            store
                .mark_completed(id, "1.0".to_string(), Utc::now(), duration)
                .await
                .unwrap();
        }

        // A failed record with a wild duration must not affect the mean.
        let id = store.insert_started(&started("add")).await.unwrap();
        store
            .mark_failed(id, "boom".to_string(), Utc::now(), 10_000)
            .await
            .unwrap();

        // Neither must another operation's records.
        let id = store.insert_started(&started("divide")).await.unwrap();
        store
            .mark_completed(id, "1.0".to_string(), Utc::now(), 500)
            .await
            .unwrap();

        let avg = store.average_duration_ms("add").await.unwrap().unwrap();
        assert!((avg - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_average_duration_no_records() {
        let store = AuditStore::open_in_memory().await.unwrap();
        assert!(store.average_duration_ms("add").await.unwrap().is_none());

        // Failed-only records still yield the sentinel.
        let id = store.insert_started(&started("add")).await.unwrap();
        store
            .mark_failed(id, "boom".to_string(), Utc::now(), 5)
            .await
            .unwrap();
        assert!(store.average_duration_ms("add").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recent_pagination() {
        let store = AuditStore::open_in_memory().await.unwrap();

        for _ in 0..5 {
            store.insert_started(&started("add")).await.unwrap();
        }

        let page = store.recent(3, 0).await.unwrap();
        assert_eq!(page.len(), 3);
        // Reverse insertion order.
        assert!(page[0].id > page[1].id);

        let rest = store.recent(3, 3).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn test_query_filters() {
        let store = AuditStore::open_in_memory().await.unwrap();

        let ok = store.insert_started(&started("add")).await.unwrap();
        store
            .mark_completed(ok, "2.0".to_string(), Utc::now(), 1)
            .await
            .unwrap();

        let bad = store.insert_started(&started("divide")).await.unwrap();
        store
            .mark_failed(bad, "Cannot divide by zero".to_string(), Utc::now(), 1)
            .await
            .unwrap();

        store.insert_started(&started("add")).await.unwrap();

        let adds = store
            .query(Some("add".to_string()), None, 100, 0)
            .await
            .unwrap();
        assert_eq!(adds.len(), 2);

        let failures = store.query(None, Some(false), 100, 0).await.unwrap();
        // The in-flight record counts as not-yet-successful.
        assert_eq!(failures.len(), 2);

        let failed_divides = store
            .query(Some("divide".to_string()), Some(false), 100, 0)
            .await
            .unwrap();
        assert_eq!(failed_divides.len(), 1);
        assert_eq!(failed_divides[0].error_message, "Cannot divide by zero");
    }

    #[tokio::test]
    async fn test_find_by_operation() {
        let store = AuditStore::open_in_memory().await.unwrap();

        store.insert_started(&started("add")).await.unwrap();
        store.insert_started(&started("divide")).await.unwrap();
        store.insert_started(&started("add")).await.unwrap();

        let adds = store.find_by_operation("add", 100).await.unwrap();
        assert_eq!(adds.len(), 2);
        assert!(adds.iter().all(|r| r.operation == "add"));
        assert!(adds[0].id < adds[1].id);
    }

    #[tokio::test]
    async fn test_find_by_id_nonexistent() {
        let store = AuditStore::open_in_memory().await.unwrap();
        assert!(store.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count() {
        let store = AuditStore::open_in_memory().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        store.insert_started(&started("add")).await.unwrap();
        store.insert_started(&started("add")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("deep").join("audit.db");

        let store = AuditStore::open(&db_path).await.unwrap();
        assert_eq!(store.path(), Some(db_path.as_path()));
        assert!(db_path.exists());
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(path.ends_with("billsplit/audit.db"));
    }
}
