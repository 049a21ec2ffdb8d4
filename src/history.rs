//! ContentStore - deduplicated clipboard history with recency bookkeeping
//!
//! One row per distinct content, keyed by hash. Re-copies touch the existing
//! row instead of inserting a duplicate. The dedup invariant holds even when
//! two pollers race on identical content: the UNIQUE constraint rejects the
//! losing insert, which is then retried as a touch.

use crate::database::{is_unique_violation, Database, StoreError, StoreResult};
use crate::models::{hash_string, HistoryItem, RecordOutcome};
use chrono::Utc;
use std::sync::Arc;

/// Captures longer than this are truncated before hashing, matching the
/// poller's practical cap on clipboard payloads.
pub const MAX_CONTENT_CHARS: usize = 1_000_000;

/// Deduplicated store of observed text with recency metadata.
pub struct ContentStore {
    db: Arc<Database>,
}

impl ContentStore {
    pub(crate) fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record an observed capture.
    ///
    /// New content inserts a row; repeat content touches the existing row
    /// (bumps `last_touched_at`, increments `touch_count`). Empty or
    /// whitespace-only content is ignored, not an error. Exactly one row
    /// mutation happens per non-ignored call.
    pub fn record(&self, content: &str) -> StoreResult<RecordOutcome> {
        if content.trim().is_empty() {
            return Ok(RecordOutcome::Ignored);
        }
        let content = truncate_chars(content, MAX_CONTENT_CHARS);
        let hash = hash_string(content);
        let now = Utc::now();

        match self.db.insert_history(content, &hash, now) {
            Ok(id) => {
                tracing::debug!(id, "recorded new history item");
                Ok(RecordOutcome::Inserted { id })
            }
            Err(StoreError::Sqlite(ref e)) if is_unique_violation(e) => {
                // The row already exists, or a concurrent record() of the same
                // content won the insert; either way fold this observation in.
                match self.db.touch_history(&hash, now)? {
                    Some(id) => {
                        tracing::debug!(id, "touched existing history item");
                        Ok(RecordOutcome::Touched { id })
                    }
                    // Row deleted between the failed insert and the touch
                    None => {
                        let id = self.db.insert_history(content, &hash, now)?;
                        Ok(RecordOutcome::Inserted { id })
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// The most recently touched items, newest first. Ties on the touch
    /// timestamp go to the most recently inserted row.
    pub fn recent(&self, limit: usize) -> StoreResult<Vec<HistoryItem>> {
        self.db.recent_history(limit)
    }

    /// Delete one item. Deleting a nonexistent id is a no-op.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        self.db.delete_history(id)
    }

    /// Remove all history. Master items are unaffected.
    pub fn clear(&self) -> StoreResult<()> {
        tracing::info!("clearing clipboard history");
        self.db.clear_history()
    }

    /// Candidate rows for the match engine. With a query, applies the
    /// subsequence LIKE pre-filter in SQL; it is the same chars-in-order
    /// predicate the matcher uses, so it can only exclude rows the matcher
    /// would reject anyway.
    pub fn candidates(&self, query: Option<&str>) -> StoreResult<Vec<HistoryItem>> {
        let pattern = query.and_then(subsequence_like_pattern);
        self.db.history_candidates(pattern.as_deref())
    }

    pub fn len(&self) -> StoreResult<u64> {
        self.db.count_history()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Build a `%a%b%c%` LIKE pattern from a query: lowercased, whitespace
/// stripped, LIKE metacharacters escaped. Returns None for an effectively
/// empty query (no filtering).
pub(crate) fn subsequence_like_pattern(query: &str) -> Option<String> {
    let cleaned: String = query
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(cleaned.len() * 3 + 1);
    pattern.push('%');
    for c in cleaned.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
        pattern.push('%');
    }
    Some(pattern)
}

/// Truncate at a char boundary without reallocating.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
