use std::collections::VecDeque;
use tracing::debug;

/// Default number of remembered searches.
pub const RECENT_SEARCH_CAPACITY: usize = 10;

/// Bounded, most-recent-first list of committed queries.
///
/// A query already present is neither added again nor moved to the front.
#[derive(Debug, Clone)]
pub struct RecentSearches {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Remember a query. Returns whether it was added.
    pub fn record(&mut self, query: &str) -> bool {
        if query.is_empty() || self.contains(query) {
            return false;
        }

        self.entries.push_front(query.to_string());
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!(evicted, "recent search dropped");
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Exact, case-sensitive lookup.
    pub fn contains(&self, query: &str) -> bool {
        self.entries.iter().any(|entry| entry == query)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(RECENT_SEARCH_CAPACITY)
    }
}
