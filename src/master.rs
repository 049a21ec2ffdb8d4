//! MasterIndex - curated snippet collections, reindexed wholesale
//!
//! Each source (one spreadsheet, typically) owns a snapshot of items that is
//! replaced as a unit. Items are never edited individually. A source that
//! fails to import carries a sticky error and stays out of search until a
//! reindex succeeds again; its previous good data is never destroyed by a
//! failed attempt.

use crate::database::{Database, StoreResult};
use crate::models::{MasterItem, MasterSource};
use chrono::Utc;
use std::sync::Arc;

/// Read-mostly overlay of curated items participating in search.
pub struct MasterIndex {
    db: Arc<Database>,
}

impl MasterIndex {
    pub(crate) fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Atomically replace a source's items with a fresh snapshot.
    ///
    /// Registers the source on first sight. The swap happens in one
    /// transaction: on any failure the previous snapshot remains intact and
    /// visible, and the error is returned for the importer to report.
    /// Success stamps the source's modification time, clears any sticky
    /// error and re-enables it.
    pub fn replace(&self, source_key: &str, items: &[(String, i64)]) -> StoreResult<()> {
        let source_id = self.db.upsert_source(source_key)?;
        let now = Utc::now();
        match self.db.replace_source_items(source_id, items, now) {
            Ok(()) => {
                tracing::info!(source = source_key, count = items.len(), "reindexed master source");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(source = source_key, error = %err, "master reindex failed, previous snapshot kept");
                Err(err)
            }
        }
    }

    /// All items from enabled, error-free sources.
    pub fn all_enabled(&self) -> StoreResult<Vec<MasterItem>> {
        self.db.enabled_master_items()
    }

    /// Drop a source and everything it indexed. Unknown keys are a no-op.
    pub fn remove_source(&self, source_key: &str) -> StoreResult<()> {
        tracing::info!(source = source_key, "removing master source");
        self.db.remove_source(source_key)
    }

    /// Settings-owned toggle. Enabling a source with a sticky error does not
    /// surface it; the error must be cleared by a successful reindex first.
    pub fn set_source_enabled(&self, source_key: &str, enabled: bool) -> StoreResult<()> {
        self.db.set_source_enabled(source_key, enabled)
    }

    /// Record an import failure (e.g. an unreadable file) on a source and
    /// exclude it from search until the next successful reindex.
    pub fn mark_source_error(&self, source_key: &str, error: &str) -> StoreResult<()> {
        tracing::warn!(source = source_key, error, "master source import failed");
        self.db.set_source_error(source_key, error)
    }

    /// All registered sources with their enabled/error/modified metadata.
    pub fn sources(&self) -> StoreResult<Vec<MasterSource>> {
        self.db.list_sources()
    }
}
