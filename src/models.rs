//! Core data models for Magpie
//!
//! A small closed set of typed rows: volatile history items, durable master
//! items, and the per-query `SearchCandidate` view that unions them for
//! ranking.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A deduplicated clipboard capture stored in the history table.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub id: i64,
    pub content: String,
    /// Deduplication key; unique across all rows.
    pub content_hash: String,
    /// Unix seconds of the first observation.
    pub created_at: i64,
    /// Unix seconds of the most recent observation (re-copy).
    pub last_touched_at: i64,
    /// Number of times this exact content has been observed.
    pub touch_count: i64,
}

/// A curated snippet imported from an external collection.
///
/// Master items are never mutated field-by-field; a reindex replaces the
/// whole set for their source in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterItem {
    pub id: i64,
    pub source_id: i64,
    pub content: String,
    /// Original ordinal position within the source collection.
    pub position: i64,
    /// Unix seconds of the owning source's last successful reindex.
    pub source_modified_at: Option<i64>,
}

/// Per-source metadata for curated collections.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterSource {
    pub id: i64,
    /// Caller-chosen stable identifier, e.g. a spreadsheet path.
    pub key: String,
    pub enabled: bool,
    pub last_modified_at: Option<i64>,
    /// Sticky import error; cleared by the next successful reindex.
    pub last_error: Option<String>,
}

/// Outcome of recording observed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First observation: a new row was inserted.
    Inserted { id: i64 },
    /// Repeat observation: the existing row's recency was updated.
    Touched { id: i64 },
    /// Empty or whitespace-only content; nothing was stored.
    Ignored,
}

impl RecordOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            RecordOutcome::Inserted { id } | RecordOutcome::Touched { id } => Some(*id),
            RecordOutcome::Ignored => None,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, RecordOutcome::Inserted { .. })
    }
}

/// A scored search result drawn from either store.
///
/// Constructed per query; scoring fields are filled in by the ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub history_id: Option<i64>,
    pub master_id: Option<i64>,
    pub content: String,
    /// Durable (master) items decay slower in ranking than volatile
    /// (clipboard) items.
    pub is_durable: bool,
    /// `last_touched_at` for history, `source_modified_at` for master.
    pub timestamp: Option<i64>,
    pub match_quality: f64,
    pub recency_score: f64,
    pub combined_score: f64,
}

impl SearchCandidate {
    pub fn from_history(item: HistoryItem) -> Self {
        Self {
            history_id: Some(item.id),
            master_id: None,
            content: item.content,
            is_durable: false,
            timestamp: Some(item.last_touched_at),
            match_quality: 0.0,
            recency_score: 0.0,
            combined_score: 0.0,
        }
    }

    pub fn from_master(item: MasterItem) -> Self {
        Self {
            history_id: None,
            master_id: Some(item.id),
            content: item.content,
            is_durable: true,
            timestamp: item.source_modified_at,
            match_quality: 0.0,
            recency_score: 0.0,
            combined_score: 0.0,
        }
    }

    /// Row id in the owning table, used as the final sort tiebreaker.
    pub(crate) fn row_id(&self) -> i64 {
        self.history_id.or(self.master_id).unwrap_or(0)
    }
}

/// Hash content for deduplication using Rust's default hasher.
pub fn hash_string(s: &str) -> String {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish().to_string()
}
