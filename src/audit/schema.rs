//! Database schema for the audit trail.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the audit database.
pub const SCHEMA: &str = r"
-- Enable WAL mode for better concurrent read/write performance
PRAGMA journal_mode = WAL;

-- Records table: one row per handled request, append-only.
-- Identifiers are assigned here and only here; AUTOINCREMENT keeps them
-- strictly increasing in insertion order.
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    endpoint TEXT NOT NULL,
    request TEXT NOT NULL,
    response TEXT NOT NULL DEFAULT '',
    request_time TEXT NOT NULL,
    response_time TEXT,
    duration_ms INTEGER,
    error_message TEXT NOT NULL DEFAULT '',
    successful INTEGER NOT NULL DEFAULT 0
);

-- Schema version table for migrations
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Indexes for the query surface (by operation, by outcome, by time)
CREATE INDEX IF NOT EXISTS idx_records_operation ON records(operation);
CREATE INDEX IF NOT EXISTS idx_records_successful ON records(successful);
CREATE INDEX IF NOT EXISTS idx_records_request_time ON records(request_time);
";

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }

    #[test]
    fn test_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        for table in ["records", "schema_version"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {table} should exist");
        }
    }

    #[test]
    fn test_schema_creates_indexes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let expected_indexes = [
            "idx_records_operation",
            "idx_records_successful",
            "idx_records_request_time",
        ];

        for index_name in expected_indexes {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?",
                    [index_name],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Index {index_name} should exist");
        }
    }

    #[test]
    fn test_schema_assigns_increasing_ids() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        for _ in 0..3 {
            conn.execute(
                "INSERT INTO records (operation, endpoint, request, request_time)
                 VALUES ('add', '/api/math/add', '{}', datetime('now'))",
                [],
            )
            .unwrap();
        }

        let mut stmt = conn.prepare("SELECT id FROM records ORDER BY id").unwrap();
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_schema_outcome_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO records (operation, endpoint, request, request_time)
             VALUES ('divide', '/api/math/divide', '{}', datetime('now'))",
            [],
        )
        .unwrap();

        let (response, error_message, successful): (String, String, bool) = conn
            .query_row(
                "SELECT response, error_message, successful FROM records WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();

        assert!(response.is_empty());
        assert!(error_message.is_empty());
        assert!(!successful);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Apply schema twice - should not error due to IF NOT EXISTS
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='records'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
