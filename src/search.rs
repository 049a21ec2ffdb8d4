//! Greedy left-to-right fuzzy matching
//!
//! A query matches a candidate when its characters appear in the candidate in
//! order, not necessarily adjacent. Quality is the density of the matched
//! span: contiguous matches score 1.0, scattered matches approach 0.
//!
//! The walk is greedy — each character takes the earliest position after the
//! previous match. That does not always find the tightest possible span, and
//! that is the contract: ranking is tuned against the greedy placements, so
//! do not replace this with an optimal-span search.

use crate::config::SearchConfig;

/// Characters that open a word for the boundary bonus, besides whitespace.
const SEPARATORS: [char; 2] = ['-', '_'];

/// A normalized query: lowercased with all whitespace stripped.
/// Parse once per keystroke, reuse across every candidate.
#[derive(Debug, Clone)]
pub struct Query {
    chars: Vec<char>,
    compact: String,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let chars: Vec<char> = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        let compact = chars.iter().collect();
        Self { chars, compact }
    }

    /// An empty query matches everything at quality 1.0.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }
}

/// Score a candidate against a query.
///
/// Returns `None` when some query character cannot be found in order, and
/// `Some(quality)` in `(0.0, 1.0]` otherwise. All characters of the candidate
/// participate — newlines, punctuation and digits included — so matches may
/// span the entire text.
pub fn match_quality(query: &Query, text: &str, config: &SearchConfig) -> Option<f64> {
    if query.is_empty() {
        return Some(1.0);
    }

    let target: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    // Greedy earliest-position walk; never backtracks, never reuses a position
    let mut next = 0usize;
    let mut positions = Vec::with_capacity(query.len());
    for &qc in &query.chars {
        let offset = target[next..].iter().position(|&tc| tc == qc)?;
        let at = next + offset;
        positions.push(at);
        next = at + 1;
    }

    let span = positions[positions.len() - 1] - positions[0] + 1;
    let mut quality = query.len() as f64 / span as f64;

    // Contiguous occurrence in the whitespace-compacted candidate earns the
    // substring bonus even when the on-screen text has spaces inside it
    if config.substring_bonus != 1.0 {
        let compact_target: String = target.iter().filter(|c| !c.is_whitespace()).collect();
        if compact_target.contains(query.compact.as_str()) {
            quality = (quality * config.substring_bonus).min(1.0);
        }
    }

    if config.word_boundary_bonus > 0.0 {
        let mut boost = 1.0;
        for &pos in &positions {
            if pos == 0 || is_boundary(target[pos - 1]) {
                boost += config.word_boundary_bonus;
            }
        }
        quality = (quality * boost).min(1.0);
    }

    Some(quality)
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality(query: &str, text: &str) -> Option<f64> {
        match_quality(&Query::parse(query), text, &SearchConfig::default())
    }

    #[test]
    fn test_contiguous_match_is_perfect() {
        assert_eq!(quality("abc", "abc"), Some(1.0));
    }

    #[test]
    fn test_spread_match_scores_by_density() {
        // Positions 0, 2, 4 -> span 5, quality 3/5
        assert_eq!(quality("abc", "aXbXc"), Some(0.6));
    }

    #[test]
    fn test_missing_character_fails() {
        assert_eq!(quality("xyz", "abc"), None);
        assert_eq!(quality("abcd", "abc"), None);
    }

    #[test]
    fn test_order_matters() {
        assert_eq!(quality("ba", "ab"), None);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(quality("", "anything at all"), Some(1.0));
        assert_eq!(quality("", ""), Some(1.0));
        assert_eq!(quality("   \t", "anything"), Some(1.0));
    }

    #[test]
    fn test_query_whitespace_is_stripped_but_text_is_preserved() {
        // "L p" -> "lp"; matches L in "LL" then p in "Pro"
        let result = quality("L p", "LL Pro 18mm");
        assert!(result.is_some());
        // span 4 gives 0.5; "lp" occurs in the compacted "llpro18mm",
        // so the substring bonus lifts it to 0.6
        assert!((result.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_match_spans_lines() {
        let text = "*18 mm* :\nLL Pro 18 mm 8 x 4 - 3\nZVK XL 18 mm 8 x 4 - 10";
        assert!(quality("lz", text).is_some());
        assert!(quality("1884", text).is_some());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(quality("ABC", "abc"), Some(1.0));
        assert_eq!(quality("abc", "ABC"), Some(1.0));
    }

    #[test]
    fn test_substring_bonus_is_capped() {
        // Exact substring already at density 1.0 stays at 1.0
        assert_eq!(quality("hello", "hello"), Some(1.0));
        assert_eq!(quality("ell", "hello"), Some(1.0));
    }

    #[test]
    fn test_greedy_walk_is_not_optimal() {
        // Greedy anchors on the first 'a' (span 5) even though the later
        // 'a' would give a contiguous span. The substring bonus still
        // applies, since "ab" does occur contiguously. 2/5 * 1.2 = 0.48.
        let result = quality("ab", "aXXab").unwrap();
        assert!((result - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_word_boundary_bonus_disabled_by_default() {
        // With the bonus on, the boundary match at position 0 lifts quality
        let boosted = SearchConfig {
            word_boundary_bonus: 0.05,
            ..SearchConfig::default()
        };
        let plain = quality("abc", "aXbXc").unwrap();
        let with_bonus = match_quality(&Query::parse("abc"), "aXbXc", &boosted).unwrap();
        assert_eq!(plain, 0.6);
        assert!((with_bonus - 0.6 * 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_word_boundary_counts_separators() {
        let boosted = SearchConfig {
            word_boundary_bonus: 0.05,
            substring_bonus: 1.0,
            ..SearchConfig::default()
        };
        // 's' opens the text, 'c' follows '_': two boundaries
        let result = match_quality(&Query::parse("sc"), "snake_case", &boosted).unwrap();
        let expected = (2.0 / 7.0) * 1.10;
        assert!((result - expected).abs() < 1e-9);
    }

    #[test]
    fn test_quality_never_exceeds_one() {
        let generous = SearchConfig {
            substring_bonus: 5.0,
            word_boundary_bonus: 1.0,
            ..SearchConfig::default()
        };
        for text in ["abc", "a b c", "abcabc"] {
            let q = match_quality(&Query::parse("abc"), text, &generous).unwrap();
            assert!(q <= 1.0, "quality {q} exceeded 1.0 for {text:?}");
        }
    }

    #[test]
    fn test_unicode_query_and_text() {
        assert_eq!(quality("héllo", "héllo"), Some(1.0));
        assert!(quality("日本", "日X本").is_some());
    }
}
