//! MagpieStore - the API surface collaborators talk to
//!
//! Owns the database plus the history and master components and exposes the
//! unified search over both. Search is a pure read: gather candidates, score
//! with the match engine, rank, truncate. The clipboard poller writes through
//! `record` (or a `Recorder`) while the UI queries concurrently; SQLite's WAL
//! and the connection pool provide the serialization boundary.

use crate::config::SearchConfig;
use crate::database::{Database, StoreResult};
use crate::history::ContentStore;
use crate::master::MasterIndex;
use crate::models::{HistoryItem, MasterSource, RecordOutcome, SearchCandidate};
use crate::ranking;
use crate::search::Query;
use chrono::Utc;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Thread-safe recall store over SQLite.
pub struct MagpieStore {
    db: Arc<Database>,
    history: ContentStore,
    master: MasterIndex,
    config: RwLock<SearchConfig>,
}

impl MagpieStore {
    /// Open or create a store at the given path with default tuning.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self::assemble(Database::open(path)?, SearchConfig::default()))
    }

    /// Open a store backed by an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::assemble(
            Database::open_in_memory()?,
            SearchConfig::default(),
        ))
    }

    /// Open with explicit tuning, e.g. loaded via `SearchConfig::load`.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: SearchConfig) -> StoreResult<Self> {
        Ok(Self::assemble(Database::open(path)?, config))
    }

    fn assemble(db: Database, config: SearchConfig) -> Self {
        let db = Arc::new(db);
        Self {
            history: ContentStore::new(Arc::clone(&db)),
            master: MasterIndex::new(Arc::clone(&db)),
            config: RwLock::new(config),
            db,
        }
    }

    /// The volatile half of the store.
    pub fn history(&self) -> &ContentStore {
        &self.history
    }

    /// The durable half of the store.
    pub fn master(&self) -> &MasterIndex {
        &self.master
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clipboard poller surface
    // ─────────────────────────────────────────────────────────────────────────

    /// Record an observed capture; see [`ContentStore::record`].
    pub fn record(&self, content: &str) -> StoreResult<RecordOutcome> {
        self.history.record(content)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Spreadsheet importer surface
    // ─────────────────────────────────────────────────────────────────────────

    /// Atomically reindex a curated source; see [`MasterIndex::replace`].
    pub fn replace_source(&self, source_key: &str, items: &[(String, i64)]) -> StoreResult<()> {
        self.master.replace(source_key, items)
    }

    pub fn remove_source(&self, source_key: &str) -> StoreResult<()> {
        self.master.remove_source(source_key)
    }

    pub fn mark_source_error(&self, source_key: &str, error: &str) -> StoreResult<()> {
        self.master.mark_source_error(source_key, error)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI / query surface
    // ─────────────────────────────────────────────────────────────────────────

    /// Search history and (optionally) master items, ranked by blended
    /// recency and match quality. Candidates from both stores are merged
    /// before the limit is applied, so the result is the global top-N.
    /// An empty query matches everything, ordered by recency.
    pub fn search(
        &self,
        query: &str,
        include_durable: bool,
        limit: usize,
    ) -> StoreResult<Vec<SearchCandidate>> {
        let config = self.config.read().clone();
        let parsed = Query::parse(query);

        let prefilter = if parsed.is_empty() { None } else { Some(query) };
        let mut candidates: Vec<SearchCandidate> = self
            .history
            .candidates(prefilter)?
            .into_iter()
            .map(SearchCandidate::from_history)
            .collect();

        if include_durable {
            candidates.extend(
                self.master
                    .all_enabled()?
                    .into_iter()
                    .map(SearchCandidate::from_master),
            );
        }

        let now = Utc::now().timestamp();
        let mut ranked = ranking::rank(candidates, &parsed, &config, now);
        ranked.truncate(limit);

        tracing::debug!(query, results = ranked.len(), "search completed");
        Ok(ranked)
    }

    /// Most recent history items; see [`ContentStore::recent`].
    pub fn recent(&self, limit: usize) -> StoreResult<Vec<HistoryItem>> {
        self.history.recent(limit)
    }

    /// Render a timestamp relative to now ("Just now", "3 days ago", ...).
    pub fn time_ago(&self, timestamp: Option<i64>) -> String {
        ranking::time_ago(timestamp, Utc::now().timestamp())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings surface
    // ─────────────────────────────────────────────────────────────────────────

    pub fn delete_item(&self, id: i64) -> StoreResult<()> {
        self.history.delete(id)
    }

    pub fn clear_history(&self) -> StoreResult<()> {
        self.history.clear()
    }

    pub fn set_source_enabled(&self, source_key: &str, enabled: bool) -> StoreResult<()> {
        self.master.set_source_enabled(source_key, enabled)
    }

    pub fn sources(&self) -> StoreResult<Vec<MasterSource>> {
        self.master.sources()
    }

    /// Current search tuning.
    pub fn config(&self) -> SearchConfig {
        self.config.read().clone()
    }

    /// Swap the search tuning; takes effect on the next search.
    pub fn set_config(&self, config: SearchConfig) {
        *self.config.write() = config;
    }

    /// Get the database size in bytes
    pub fn database_size(&self) -> StoreResult<i64> {
        self.db.database_size()
    }
}
