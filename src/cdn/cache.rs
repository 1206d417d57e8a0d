//! Per-response record of processed URLs.

use rustc_hash::FxHashMap;

use crate::utils::hash;

/// Outcome recorded for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Replaced,
    Skipped,
}

/// Replaced/Skipped map keyed by the hash of a normalized URL.
///
/// Created empty for each response and dropped with it, so a URL is
/// processed at most once per document.
#[derive(Debug, Default)]
pub struct ReplacementCache {
    entries: FxHashMap<u64, CacheState>,
}

impl ReplacementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<CacheState> {
        self.entries.get(&hash::compute(url)).copied()
    }

    /// Known in either state.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(&hash::compute(url))
    }

    pub fn is_replaced(&self, url: &str) -> bool {
        self.get(url) == Some(CacheState::Replaced)
    }

    /// Record `Replaced`; overrides an earlier `Skipped`.
    pub fn mark_replaced(&mut self, url: &str) {
        self.entries.insert(hash::compute(url), CacheState::Replaced);
    }

    /// Record `Skipped` unless the URL was already replaced.
    pub fn mark_skipped(&mut self, url: &str) {
        self.entries
            .entry(hash::compute(url))
            .or_insert(CacheState::Skipped);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states() {
        let mut cache = ReplacementCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("/static/a.css"), None);

        cache.mark_skipped("/static/a.css");
        assert_eq!(cache.get("/static/a.css"), Some(CacheState::Skipped));
        assert!(cache.contains("/static/a.css"));
        assert!(!cache.is_replaced("/static/a.css"));

        cache.mark_replaced("/static/a.css");
        assert!(cache.is_replaced("/static/a.css"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_skip_never_downgrades_replaced() {
        let mut cache = ReplacementCache::new();
        cache.mark_replaced("/static/b.js");
        cache.mark_skipped("/static/b.js");
        assert!(cache.is_replaced("/static/b.js"));
    }
}
