//! Matching and ranking invariants
//!
//! Pins the scoring contract: greedy left-to-right matching with density
//! quality, exponential recency decay with separate horizons per item kind,
//! and the fixed relative-time buckets. All against a frozen clock so every
//! assertion is exact.

use magpie_core::ranking::{rank, recency_score, time_ago};
use magpie_core::search::{match_quality, Query};
use magpie_core::{SearchCandidate, SearchConfig};

const NOW: i64 = 1_700_000_000;

fn quality(query: &str, text: &str) -> Option<f64> {
    match_quality(&Query::parse(query), text, &SearchConfig::default())
}

fn candidate(content: &str, is_durable: bool, timestamp: i64, id: i64) -> SearchCandidate {
    SearchCandidate {
        history_id: (!is_durable).then_some(id),
        master_id: is_durable.then_some(id),
        content: content.to_string(),
        is_durable,
        timestamp: Some(timestamp),
        match_quality: 0.0,
        recency_score: 0.0,
        combined_score: 0.0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Match determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn canonical_quality_fixtures() {
    assert_eq!(quality("abc", "aXbXc"), Some(0.6));
    assert_eq!(quality("abc", "abc"), Some(1.0));
    assert_eq!(quality("xyz", "abc"), None);
}

#[test]
fn empty_query_matches_everything_perfectly() {
    assert_eq!(quality("", "anything"), Some(1.0));
    assert_eq!(quality("", ""), Some(1.0));
}

#[test]
fn query_whitespace_is_ignored_but_text_structure_is_searched() {
    // "L p" matches L in "LL", then p inside "Pro"
    assert!(quality("L p", "LL Pro 18mm").is_some());

    // Multi-line content is matched across lines as one text
    let block = "*18 mm* :\nLL Pro 18 mm 8 x 4 - 3\nZVK XL 18 mm 8 x 4 - 10\nTotal : *19* Pcs.";
    for query in ["L p", "1884", "lz", "ZK"] {
        assert!(
            quality(query, block).is_some(),
            "query {query:?} should match the sample block"
        );
    }
}

#[test]
fn same_inputs_always_score_the_same() {
    let first = quality("grade 100", "MARLEX A Grade 100% 35 mm BWP Flush Door");
    for _ in 0..10 {
        assert_eq!(
            quality("grade 100", "MARLEX A Grade 100% 35 mm BWP Flush Door"),
            first
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recency and blending
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn more_recent_identical_candidate_scores_strictly_higher() {
    let candidates = vec![
        candidate("identical text", false, NOW - 7200, 1),
        candidate("identical text", false, NOW - 60, 2),
    ];
    let ranked = rank(candidates, &Query::parse("identical"), &SearchConfig::default(), NOW);
    assert_eq!(ranked[0].history_id, Some(2));
    assert!(ranked[0].combined_score > ranked[1].combined_score);
}

#[test]
fn durable_decay_is_never_steeper_than_volatile() {
    let config = SearchConfig::default();
    for age in [0, 60, 3600, 86_400, 604_800, 86_400 * 30] {
        let volatile = recency_score(Some(NOW - age), NOW, config.clipboard_decay_secs as f64);
        let durable = recency_score(Some(NOW - age), NOW, config.master_decay_secs as f64);
        assert!(
            durable >= volatile,
            "at age {age}s durable ({durable}) must not trail volatile ({volatile})"
        );
    }
}

#[test]
fn week_old_master_item_outranks_week_old_clipboard_item() {
    let age = NOW - 604_800;
    let candidates = vec![
        candidate("shared snippet", false, age, 1),
        candidate("shared snippet", true, age, 2),
    ];
    let ranked = rank(candidates, &Query::parse("shared"), &SearchConfig::default(), NOW);
    assert!(ranked[0].is_durable);
}

#[test]
fn ranking_filters_then_orders() {
    let candidates = vec![
        candidate("the abc snippet", false, NOW - 60, 1),
        candidate("no match here", false, NOW, 2),
        candidate("a very scattered axxxxxxbxxxxxxc", false, NOW, 3),
    ];
    let ranked = rank(candidates, &Query::parse("abc"), &SearchConfig::default(), NOW);

    // Non-matching content is gone; both matches are present and ordered
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|c| c.match_quality > 0.0));
    assert!(ranked[0].combined_score >= ranked[1].combined_score);
    // The contiguous recent match wins over the scattered one
    assert_eq!(ranked[0].history_id, Some(1));
}

#[test]
fn scores_are_attached_to_results() {
    let ranked = rank(
        vec![candidate("abc", false, NOW, 1)],
        &Query::parse("abc"),
        &SearchConfig::default(),
        NOW,
    );
    let result = &ranked[0];
    assert_eq!(result.match_quality, 1.0);
    assert!((result.recency_score - 1.0).abs() < 1e-9);
    assert!((result.combined_score - 1.0).abs() < 1e-9);
}

// ─────────────────────────────────────────────────────────────────────────────
// Relative time buckets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn time_ago_bucket_boundaries() {
    assert_eq!(time_ago(Some(NOW - 45), NOW), "Just now");
    assert_eq!(time_ago(Some(NOW - 90), NOW), "1 min ago");
    assert_eq!(time_ago(Some(NOW - 3700), NOW), "1 hour ago");
    assert_eq!(time_ago(Some(NOW - 90_000), NOW), "Yesterday");
    assert_eq!(time_ago(Some(NOW - 86_400 * 10), NOW), "1 week ago");
    assert_eq!(time_ago(None, NOW), "Unknown");
}

#[test]
fn time_ago_pluralizes_with_count() {
    assert_eq!(time_ago(Some(NOW - 120), NOW), "2 mins ago");
    assert_eq!(time_ago(Some(NOW - 3600 * 5), NOW), "5 hours ago");
    assert_eq!(time_ago(Some(NOW - 86_400 * 2), NOW), "2 days ago");
    assert_eq!(time_ago(Some(NOW - 86_400 * 14), NOW), "2 weeks ago");
}
