//! Search tuning configuration with JSON persistence
//!
//! The bonus multipliers and decay horizons are deliberately configuration
//! rather than constants: they are tuning values, and callers (the settings
//! dialog) may adjust them at runtime.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Weight of recency in the combined score. Normalized against
    /// `quality_weight` at scoring time, so the pair need not sum to 1.
    pub recency_weight: f64,
    pub quality_weight: f64,
    /// Decay horizon for volatile (clipboard) items, in seconds.
    pub clipboard_decay_secs: u64,
    /// Decay horizon for durable (master) items, in seconds.
    pub master_decay_secs: u64,
    /// Matches below this quality are dropped from results.
    pub min_quality: f64,
    /// Multiplier applied when the compacted query occurs contiguously in
    /// the compacted candidate. Capped so quality never exceeds 1.0.
    pub substring_bonus: f64,
    /// Per-character increment for matches landing on a word boundary.
    /// Disabled (0.0) by default.
    pub word_boundary_bonus: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            recency_weight: 0.7,
            quality_weight: 0.3,
            clipboard_decay_secs: 86_400,  // 24 hours
            master_decay_secs: 604_800,    // 7 days
            min_quality: 0.0,
            substring_bonus: 1.2,
            word_boundary_bonus: 0.0,
        }
    }
}

impl SearchConfig {
    /// The (recency, quality) weights scaled to sum to 1.0.
    /// A degenerate zero sum falls back to an even split.
    pub fn normalized_weights(&self) -> (f64, f64) {
        let sum = self.recency_weight + self.quality_weight;
        if sum <= 0.0 {
            return (0.5, 0.5);
        }
        (self.recency_weight / sum, self.quality_weight / sum)
    }

    /// Load configuration from a JSON file. A missing file yields defaults;
    /// an unreadable or malformed file is logged and yields defaults rather
    /// than failing startup.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(
                        path = %path.as_ref().display(),
                        error = %err,
                        "malformed search config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
