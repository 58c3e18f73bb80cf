//! Tuning knobs for the palette engine.

use std::time::Duration;

/// Behavioral constants, overridable by the embedder (tests shorten the
/// debounce; real hosts mostly take the defaults).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Hard cap on any displayed result list.
    pub result_cap: usize,
    /// Fuzzy scores at or below this are dropped.
    pub fuzzy_threshold: f32,
    /// Quiet period before a dynamic backend search fires.
    pub debounce: Duration,
    /// Minimum trimmed query length that triggers dynamic loading.
    pub min_dynamic_query: usize,
    /// Per-entity result limit for dynamic searches.
    pub dynamic_limit: usize,
    pub recents_cap: usize,
    pub history_cap: usize,
    /// Lifetime of cached full datasets.
    pub cache_ttl: Duration,
    /// Queries longer than this are truncated during sanitization.
    pub max_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_cap: 12,
            fuzzy_threshold: 0.3,
            debounce: Duration::from_millis(300),
            min_dynamic_query: 2,
            dynamic_limit: 5,
            recents_cap: 5,
            history_cap: 10,
            cache_ttl: Duration::from_secs(300),
            max_query_len: 200,
        }
    }
}
