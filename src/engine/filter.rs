use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::model::{CategoryFilter, Offer, OfferId, PaymentMethod};
use crate::search::Query;

use super::state::SessionState;

/// The four predicates of the home grid, ANDed together.
#[derive(Debug, Clone)]
pub struct Filter<'s> {
    pub payment_method: PaymentMethod,
    pub category: CategoryFilter,
    /// `Some` when only favorites are shown.
    pub favorites: Option<&'s BTreeSet<OfferId>>,
    pub query: Query,
}

impl<'s> Filter<'s> {
    pub fn from_state(state: &'s SessionState) -> Self {
        Self {
            payment_method: state.payment_method(),
            category: state.category(),
            favorites: state.favorites_only().then(|| state.favorites()),
            query: Query::new(state.query()),
        }
    }

    pub fn matches(&self, offer: &Offer) -> bool {
        offer.payment_method == self.payment_method
            && self.category.accepts(offer.category)
            && self
                .favorites
                .is_none_or(|favorites| favorites.contains(&offer.id))
            && (self.query.is_empty() || self.query.matches(offer))
    }

    /// Matching offers in catalog order.
    pub fn apply<'c>(&self, catalog: &'c Catalog) -> Vec<&'c Offer> {
        catalog.iter().filter(|offer| self.matches(offer)).collect()
    }
}
