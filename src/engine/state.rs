use std::collections::BTreeSet;

use crate::model::{CategoryFilter, OfferId, PaymentMethod};

use super::config::EngineConfig;
use super::history::RecentSearches;

/// Selections and history of one browsing session.
///
/// Only the engine mutates it, one intent at a time.
#[derive(Debug, Clone)]
pub struct SessionState {
    payment_method: PaymentMethod,
    category: CategoryFilter,
    favorites: BTreeSet<OfferId>,
    favorites_only: bool,
    query: String,
    recent: RecentSearches,
    /// Query of the results view currently open, if any.
    committed: Option<String>,
    /// Offer open in the detail view.
    selected_offer: Option<OfferId>,
}

impl SessionState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            payment_method: config.default_payment_method,
            category: CategoryFilter::All,
            favorites: BTreeSet::new(),
            favorites_only: false,
            query: String::new(),
            recent: RecentSearches::new(config.recent_capacity),
            committed: None,
            selected_offer: None,
        }
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn favorites(&self) -> &BTreeSet<OfferId> {
        &self.favorites
    }

    pub fn is_favorite(&self, id: OfferId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn recent_searches(&self) -> &RecentSearches {
        &self.recent
    }

    pub fn committed_query(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn selected_offer(&self) -> Option<OfferId> {
        self.selected_offer
    }

    pub(super) fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub(super) fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    /// Add the offer if absent, remove it otherwise. Returns whether it is now a favorite.
    pub(super) fn toggle_favorite(&mut self, id: OfferId) -> bool {
        if self.favorites.remove(&id) {
            false
        } else {
            self.favorites.insert(id);
            true
        }
    }

    pub(super) fn set_favorites_only(&mut self, enabled: bool) {
        self.favorites_only = enabled;
    }

    pub(super) fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub(super) fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Open the results view for `query` and remember it.
    pub(super) fn commit(&mut self, query: String) -> bool {
        let recorded = self.recent.record(&query);
        self.query.clone_from(&query);
        self.committed = Some(query);
        recorded
    }

    pub(super) fn close_results(&mut self) {
        self.committed = None;
        self.query.clear();
    }

    pub(super) fn clear_recent(&mut self) {
        self.recent.clear();
    }

    pub(super) fn select_offer(&mut self, id: Option<OfferId>) {
        self.selected_offer = id;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
