//! Recency-weighted ranking over matched candidates
//!
//! Blends match quality with an exponential recency decay into one score.
//! Durable (master) items decay over a much longer horizon than volatile
//! (clipboard) items, so curated snippets stay competitive for days while
//! stale captures sink quickly.

use crate::config::SearchConfig;
use crate::models::SearchCandidate;
use crate::search::{match_quality, Query};
use chrono::{TimeZone, Utc};
use std::cmp::Ordering;

/// Exponential recency decay: e^(-elapsed / decay). Brand-new items score
/// 1.0 and decay toward 0. Absent timestamps score as brand new; clock skew
/// (timestamps in the future) is clamped rather than rewarded.
pub fn recency_score(timestamp: Option<i64>, now: i64, decay_secs: f64) -> f64 {
    let ts = timestamp.unwrap_or(now);
    let elapsed = (now - ts).max(0) as f64;
    (-elapsed / decay_secs).exp()
}

/// Score, filter and order candidates for a query.
///
/// Non-matching candidates are dropped; the rest get
/// `combined = w_r * recency + w_q * quality` with weights normalized to sum
/// to 1. The ordering is total and deterministic: combined score, then most
/// recent first, then volatile before durable, then newest row id.
pub fn rank(
    candidates: Vec<SearchCandidate>,
    query: &Query,
    config: &SearchConfig,
    now: i64,
) -> Vec<SearchCandidate> {
    let (recency_weight, quality_weight) = config.normalized_weights();

    let mut scored: Vec<SearchCandidate> = Vec::with_capacity(candidates.len());
    for mut candidate in candidates {
        let quality = match match_quality(query, &candidate.content, config) {
            Some(q) => q,
            None => continue,
        };
        if quality < config.min_quality {
            continue;
        }

        let decay_secs = if candidate.is_durable {
            config.master_decay_secs
        } else {
            config.clipboard_decay_secs
        } as f64;
        let recency = recency_score(candidate.timestamp, now, decay_secs);

        candidate.match_quality = quality;
        candidate.recency_score = recency;
        candidate.combined_score = recency_weight * recency + quality_weight * quality;
        scored.push(candidate);
    }

    scored.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
            .then_with(|| a.is_durable.cmp(&b.is_durable))
            .then_with(|| b.row_id().cmp(&a.row_id()))
    });
    scored
}

/// Render a timestamp as a human-readable relative string.
///
/// Fixed buckets: under a minute, minutes, hours, "Yesterday", days, weeks,
/// then an absolute short date. Missing timestamps render as "Unknown".
pub fn time_ago(timestamp: Option<i64>, now: i64) -> String {
    let ts = match timestamp {
        Some(ts) => ts,
        None => return "Unknown".to_string(),
    };

    let seconds = now - ts;
    if seconds < 60 {
        return "Just now".to_string();
    }
    if seconds < 3600 {
        let mins = seconds / 60;
        return format!("{} min{} ago", mins, plural(mins));
    }
    if seconds < 86_400 {
        let hours = seconds / 3600;
        return format!("{} hour{} ago", hours, plural(hours));
    }

    let days = seconds / 86_400;
    if days == 1 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{} days ago", days);
    }
    if days < 30 {
        let weeks = days / 7;
        return format!("{} week{} ago", weeks, plural(weeks));
    }

    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "Unknown".to_string(),
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
