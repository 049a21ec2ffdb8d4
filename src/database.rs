//! SQLite database layer for history and master storage
//!
//! Two logical tables: deduplicated `history_items` keyed by content hash,
//! and `master_items` keyed by (sourceId, position) with per-source metadata
//! in `master_sources`. Uses r2d2 connection pooling so the poller's writes
//! and the UI's reads don't block each other.

use crate::models::{HistoryItem, MasterItem, MasterSource};
use chrono::{DateTime, TimeZone, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Import errors stored on a source are truncated to this length.
const MAX_SOURCE_ERROR_CHARS: usize = 500;

/// Render a timestamp in the on-disk format. Sub-second precision is kept so
/// recency ordering reflects true observation order within one second.
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// Parse timestamp string from database to DateTime<Utc>
fn parse_db_timestamp(timestamp_str: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S"))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(|_| Utc::now())
}

/// Whether an error is a UNIQUE-constraint failure (duplicate content hash
/// or duplicate (sourceId, position)).
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Thread-safe database wrapper using connection pooling
///
/// WAL mode enables readers to proceed without blocking the writer. Every
/// public operation is a single statement or a single transaction, so
/// concurrent readers always observe complete rows and complete snapshots.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open or create a database at the given path with connection pooling
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;
                PRAGMA foreign_keys=ON;
                PRAGMA mmap_size=67108864;
                PRAGMA cache_size=-32000;
            ",
            )?;
            Ok(())
        });

        let pool = Pool::builder().max_size(8).build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;
                PRAGMA foreign_keys=ON;
            ",
            )?;
            Ok(())
        });

        // In-memory needs single connection to maintain state
        let pool = Pool::builder().max_size(1).build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Get a connection from the pool
    fn get_conn(&self) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Set up the database schema
    fn setup_schema(&self) -> StoreResult<()> {
        let conn = self.get_conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS history_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                contentHash TEXT NOT NULL UNIQUE,
                createdAt TEXT NOT NULL,
                lastTouchedAt TEXT NOT NULL,
                touchCount INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS master_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sourceKey TEXT NOT NULL UNIQUE,
                isEnabled INTEGER NOT NULL DEFAULT 1,
                lastModifiedAt TEXT,
                lastError TEXT
            );

            CREATE TABLE IF NOT EXISTS master_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sourceId INTEGER NOT NULL REFERENCES master_sources(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                position INTEGER NOT NULL,
                UNIQUE(sourceId, position)
            );

            CREATE INDEX IF NOT EXISTS idx_history_hash ON history_items(contentHash);
            CREATE INDEX IF NOT EXISTS idx_history_touched ON history_items(lastTouchedAt);
            CREATE INDEX IF NOT EXISTS idx_master_items_source ON master_items(sourceId);
        "#,
        )?;

        Ok(())
    }

    /// Get the database size in bytes
    pub fn database_size(&self) -> StoreResult<i64> {
        let conn = self.get_conn()?;
        let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok(page_count * page_size)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get total number of history rows
    pub fn count_history(&self) -> StoreResult<u64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM history_items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Insert a new history row, returns the row ID.
    /// Fails with a UNIQUE violation if the hash already exists; the caller
    /// resolves that by retrying as a touch.
    pub fn insert_history(&self, content: &str, hash: &str, now: DateTime<Utc>) -> StoreResult<i64> {
        let conn = self.get_conn()?;
        let timestamp_str = format_timestamp(now);
        conn.execute(
            r#"INSERT INTO history_items (content, contentHash, createdAt, lastTouchedAt, touchCount)
               VALUES (?1, ?2, ?3, ?3, 1)"#,
            params![content, hash, timestamp_str],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fold a repeat observation into the existing row for `hash`:
    /// bump `lastTouchedAt` and increment `touchCount` in one statement.
    /// Returns the row ID, or None if no row carries that hash.
    pub fn touch_history(&self, hash: &str, now: DateTime<Utc>) -> StoreResult<Option<i64>> {
        let conn = self.get_conn()?;
        let timestamp_str = format_timestamp(now);
        let updated = conn.execute(
            "UPDATE history_items SET lastTouchedAt = ?1, touchCount = touchCount + 1 WHERE contentHash = ?2",
            params![timestamp_str, hash],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        let id: i64 = conn.query_row(
            "SELECT id FROM history_items WHERE contentHash = ?1",
            [hash],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }

    /// Fetch the most recent history rows, newest first.
    /// Ties on `lastTouchedAt` go to the most recently inserted row.
    pub fn recent_history(&self, limit: usize) -> StoreResult<Vec<HistoryItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, content, contentHash, createdAt, lastTouchedAt, touchCount
               FROM history_items
               ORDER BY lastTouchedAt DESC, id DESC
               LIMIT ?1"#,
        )?;
        let items = stmt
            .query_map([limit as i64], Self::row_to_history_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Fetch history rows feeding the match engine, optionally pre-filtered
    /// with a LIKE pattern (see `history::subsequence_like_pattern`). The
    /// pattern is a pure optimization and must be over-inclusive.
    pub fn history_candidates(&self, like_pattern: Option<&str>) -> StoreResult<Vec<HistoryItem>> {
        let conn = self.get_conn()?;
        let sql_filtered = r#"SELECT id, content, contentHash, createdAt, lastTouchedAt, touchCount
               FROM history_items
               WHERE LOWER(content) LIKE ?1 ESCAPE '\'
               ORDER BY lastTouchedAt DESC, id DESC"#;
        let sql_all = r#"SELECT id, content, contentHash, createdAt, lastTouchedAt, touchCount
               FROM history_items
               ORDER BY lastTouchedAt DESC, id DESC"#;

        let items = match like_pattern {
            Some(pattern) => {
                let mut stmt = conn.prepare(sql_filtered)?;
                let rows = stmt
                    .query_map([pattern], Self::row_to_history_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(sql_all)?;
                let rows = stmt
                    .query_map([], Self::row_to_history_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(items)
    }

    /// Delete a history row by ID. Deleting a missing ID is a no-op.
    pub fn delete_history(&self, id: i64) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM history_items WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete all history rows. Master tables are untouched.
    pub fn clear_history(&self) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM history_items", [])?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Master operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a source by key if unknown; returns its row ID either way.
    pub fn upsert_source(&self, key: &str) -> StoreResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO master_sources (sourceKey) VALUES (?1) ON CONFLICT(sourceKey) DO NOTHING",
            [key],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM master_sources WHERE sourceKey = ?1",
            [key],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Replace all items for a source in one transaction: delete the old set,
    /// insert the new set, stamp `lastModifiedAt`, clear any sticky error and
    /// re-enable the source. Any failure rolls the whole operation back, so a
    /// concurrent reader sees either the old snapshot or the new one.
    pub fn replace_source_items(
        &self,
        source_id: i64,
        items: &[(String, i64)],
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM master_items WHERE sourceId = ?1", [source_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO master_items (sourceId, content, position) VALUES (?1, ?2, ?3)",
            )?;
            for (content, position) in items {
                stmt.execute(params![source_id, content, position])?;
            }
        }
        tx.execute(
            "UPDATE master_sources SET lastModifiedAt = ?1, lastError = NULL, isEnabled = 1 WHERE id = ?2",
            params![format_timestamp(now), source_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Fetch all items from enabled, error-free sources, joined with the
    /// owning source's modification timestamp.
    pub fn enabled_master_items(&self) -> StoreResult<Vec<MasterItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT mi.id, mi.sourceId, mi.content, mi.position, ms.lastModifiedAt
               FROM master_items mi
               JOIN master_sources ms ON mi.sourceId = ms.id
               WHERE ms.isEnabled = 1 AND ms.lastError IS NULL
               ORDER BY mi.sourceId, mi.position"#,
        )?;
        let items = stmt
            .query_map([], Self::row_to_master_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Drop a source and its items (FK cascade). Unknown keys are a no-op.
    pub fn remove_source(&self, key: &str) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM master_sources WHERE sourceKey = ?1", [key])?;
        Ok(())
    }

    /// Flip the settings-owned enabled flag for a source.
    pub fn set_source_enabled(&self, key: &str, enabled: bool) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE master_sources SET isEnabled = ?1 WHERE sourceKey = ?2",
            params![enabled as i64, key],
        )?;
        Ok(())
    }

    /// Record a sticky import error on a source and disable it. Registers the
    /// source first so a never-indexed failing source is still listed.
    pub fn set_source_error(&self, key: &str, error: &str) -> StoreResult<()> {
        self.upsert_source(key)?;
        let truncated: String = error.chars().take(MAX_SOURCE_ERROR_CHARS).collect();
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE master_sources SET lastError = ?1, isEnabled = 0 WHERE sourceKey = ?2",
            params![truncated, key],
        )?;
        Ok(())
    }

    /// List all registered sources with their metadata.
    pub fn list_sources(&self) -> StoreResult<Vec<MasterSource>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, sourceKey, isEnabled, lastModifiedAt, lastError FROM master_sources ORDER BY id",
        )?;
        let sources = stmt
            .query_map([], Self::row_to_master_source)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row mapping
    // ─────────────────────────────────────────────────────────────────────────

    fn row_to_history_item(row: &rusqlite::Row) -> rusqlite::Result<HistoryItem> {
        let created_at: String = row.get(3)?;
        let last_touched_at: String = row.get(4)?;
        Ok(HistoryItem {
            id: row.get(0)?,
            content: row.get(1)?,
            content_hash: row.get(2)?,
            created_at: parse_db_timestamp(&created_at).timestamp(),
            last_touched_at: parse_db_timestamp(&last_touched_at).timestamp(),
            touch_count: row.get(5)?,
        })
    }

    fn row_to_master_item(row: &rusqlite::Row) -> rusqlite::Result<MasterItem> {
        let modified: Option<String> = row.get(4)?;
        Ok(MasterItem {
            id: row.get(0)?,
            source_id: row.get(1)?,
            content: row.get(2)?,
            position: row.get(3)?,
            source_modified_at: modified.map(|ts| parse_db_timestamp(&ts).timestamp()),
        })
    }

    fn row_to_master_source(row: &rusqlite::Row) -> rusqlite::Result<MasterSource> {
        let enabled: i64 = row.get(2)?;
        let modified: Option<String> = row.get(3)?;
        Ok(MasterSource {
            id: row.get(0)?,
            key: row.get(1)?,
            enabled: enabled != 0,
            last_modified_at: modified.map(|ts| parse_db_timestamp(&ts).timestamp()),
            last_error: row.get(4)?,
        })
    }
}
