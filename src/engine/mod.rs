//! Offer browsing engine.
//!
//! The engine owns the catalog and the session state. It applies user
//! intents one at a time and derives every view (home grid, suggestions,
//! grouped search results, detail view) from the current state on demand.
//! Also supports async stream of intents.

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::catalog::Catalog;
use crate::model::{Category, CategoryFilter, Intent, Offer, OfferId, PaymentMethod};
use crate::search::{self, SearchResults};

mod config;
pub use config::EngineConfig;

mod error;
pub use error::EngineError;

mod filter;
pub use filter::Filter;

mod history;
pub use history::{RECENT_SEARCH_CAPACITY, RecentSearches};

mod state;
pub use state::SessionState;

/// The offer browsing engine.
pub struct Engine {
    catalog: Catalog,
    state: SessionState,
    config: EngineConfig,
}

/// Public API
impl Engine {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    pub fn with_config(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            state: SessionState::new(&config),
            config,
        }
    }

    /// Run the engine with the given intent stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Intent> + Unpin) {
        while let Some(intent) = stream.next().await {
            // a rejected intent must not stop the session, it is already logged
            let _ = self.apply(intent);
        }
    }

    /// Apply a single intent on top of the current session state
    pub fn apply(&mut self, intent: Intent) -> Result<(), EngineError> {
        let result = match &intent {
            Intent::SelectPaymentMethod(method) => {
                self.apply_select_payment_method(*method);
                Ok(())
            }
            Intent::SelectCategory(category) => self.apply_select_category(*category),
            Intent::ToggleFavorite(id) => self.apply_toggle_favorite(*id),
            Intent::SetFavoritesOnly(enabled) => {
                self.state.set_favorites_only(*enabled);
                Ok(())
            }
            Intent::UpdateQuery(text) => {
                self.state.set_query(text.clone());
                Ok(())
            }
            Intent::CommitSearch(text) => {
                self.apply_commit_search(text.clone());
                Ok(())
            }
            Intent::PickSuggestion(id) => self.apply_pick_suggestion(*id),
            Intent::CloseResults => {
                self.state.close_results();
                Ok(())
            }
            Intent::ClearQuery => {
                self.state.clear_query();
                Ok(())
            }
            Intent::ClearRecentSearches => {
                self.state.clear_recent();
                Ok(())
            }
            Intent::OpenOffer(id) => self.apply_open_offer(*id),
            Intent::CloseOffer => {
                self.state.select_offer(None);
                Ok(())
            }
        };
        Self::log_result(&intent, &result);
        result
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Offers on the home grid, in catalog order.
    pub fn visible_offers(&self) -> Vec<&Offer> {
        Filter::from_state(&self.state).apply(&self.catalog)
    }

    /// Predictive suggestions for the live query, taken from the whole catalog.
    pub fn suggestions(&self) -> Vec<&Offer> {
        search::suggestions(
            self.catalog.iter(),
            self.state.query(),
            self.config.suggestion_limit,
        )
    }

    /// Grouped results of the committed search, while the results view is open.
    pub fn search_results(&self) -> Option<SearchResults<'_>> {
        self.state
            .committed_query()
            .map(|query| search::search(self.catalog.iter(), query))
    }

    /// Categories offered under the selected payment method.
    pub fn available_categories(&self) -> Vec<Category> {
        let method = self.state.payment_method();
        self.catalog.available_categories(method)
    }

    /// Category chips: `all` first, then the available categories.
    pub fn category_options(&self) -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(
                self.available_categories()
                    .into_iter()
                    .map(CategoryFilter::Only),
            )
            .collect()
    }

    /// Offer open in the detail view.
    pub fn selected_offer(&self) -> Option<&Offer> {
        self.state
            .selected_offer()
            .and_then(|id| self.catalog.get(id))
    }

    pub fn is_favorite(&self, id: OfferId) -> bool {
        self.state.is_favorite(id)
    }

    pub fn favorites(&self) -> impl Iterator<Item = OfferId> + '_ {
        self.state.favorites().iter().copied()
    }

    /// Newest first.
    pub fn recent_searches(&self) -> impl Iterator<Item = &str> + '_ {
        self.state.recent_searches().iter()
    }
}

/// Private API
impl Engine {
    /// Small helper to log `apply` results
    fn log_result(intent: &Intent, result: &Result<(), EngineError>) {
        match result {
            Ok(()) => info!(intent = ?intent, "{} applied", intent.name()),
            Err(e) => info!(intent = ?intent, reason = %e, "{} skipped", intent.name()),
        }
    }

    /// Apply `Intent::SelectPaymentMethod`:
    /// - Switch the payment method
    /// - Reset the category to `all` when the new method has no offer in it
    fn apply_select_payment_method(&mut self, method: PaymentMethod) {
        self.state.set_payment_method(method);

        if let CategoryFilter::Only(category) = self.state.category() {
            if !self.available_categories().contains(&category) {
                info!(
                    payment_method = %method,
                    category = %category,
                    "category unavailable for payment method, reset to all"
                );
                self.state.set_category(CategoryFilter::All);
            }
        }
    }

    /// Apply `Intent::SelectCategory`:
    /// - Ensure the category has offers under the current payment method
    fn apply_select_category(&mut self, category: CategoryFilter) -> Result<(), EngineError> {
        if let CategoryFilter::Only(selected) = category {
            let method = self.state.payment_method();
            if !self.available_categories().contains(&selected) {
                return Err(EngineError::CategoryUnavailable(selected, method));
            }
        }
        self.state.set_category(category);
        Ok(())
    }

    fn apply_toggle_favorite(&mut self, id: OfferId) -> Result<(), EngineError> {
        if !self.catalog.contains(id) {
            return Err(EngineError::UnknownOffer(id));
        }
        self.state.toggle_favorite(id);
        Ok(())
    }

    /// Apply `Intent::CommitSearch`:
    /// - Make the query current and open the results view
    /// - Record it in the recent searches unless empty or already there
    fn apply_commit_search(&mut self, query: String) {
        let recorded = self.state.commit(query);
        info!(query = self.state.query(), recorded, "search committed");
    }

    /// Apply `Intent::PickSuggestion` by committing the offer title.
    fn apply_pick_suggestion(&mut self, id: OfferId) -> Result<(), EngineError> {
        let title = self
            .catalog
            .get(id)
            .map(|offer| offer.title.clone())
            .ok_or(EngineError::UnknownOffer(id))?;
        self.apply_commit_search(title);
        Ok(())
    }

    fn apply_open_offer(&mut self, id: OfferId) -> Result<(), EngineError> {
        if !self.catalog.contains(id) {
            return Err(EngineError::UnknownOffer(id));
        }
        self.state.select_offer(Some(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // test utils

    fn seeded() -> Engine {
        Engine::new(Catalog::seed().unwrap())
    }

    fn offer(id: OfferId, title: &str, method: PaymentMethod, category: Category) -> Offer {
        Offer {
            id,
            title: title.to_string(),
            description: String::new(),
            full_description: None,
            image: String::new(),
            terms: String::new(),
            payment_method: method,
            category,
            is_new: false,
            shop_name: String::new(),
            shop_logo: String::new(),
            location: String::new(),
            deadline: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        }
    }

    /// Credit card offers only sell electronics here.
    fn sparse() -> Engine {
        let catalog = Catalog::new(vec![
            offer(1, "Pizza", PaymentMethod::QrDeuna, Category::Restaurants),
            offer(2, "Burgers", PaymentMethod::QrDeuna, Category::Restaurants),
            offer(3, "TVs", PaymentMethod::CreditCard, Category::Electronics),
            offer(4, "Phones", PaymentMethod::QrDeuna, Category::Electronics),
        ])
        .unwrap();
        Engine::new(catalog)
    }

    fn ids(offers: &[&Offer]) -> Vec<OfferId> {
        offers.iter().map(|o| o.id).collect()
    }

    fn apply_all(engine: &mut Engine, intents: impl IntoIterator<Item = Intent>) {
        for intent in intents {
            let _ = engine.apply(intent);
        }
    }

    #[test]
    fn new_engine() {
        let engine = seeded();
        assert_eq!(engine.state().payment_method(), PaymentMethod::QrDeuna);
        assert_eq!(engine.state().category(), CategoryFilter::All);
        assert_eq!(engine.favorites().count(), 0);
        assert_eq!(engine.recent_searches().count(), 0);
        assert!(engine.suggestions().is_empty());
        assert!(engine.search_results().is_none());
        assert!(engine.selected_offer().is_none());
    }

    // Filtering

    #[test]
    fn default_view_lists_qr_offers_in_catalog_order() {
        let engine = seeded();
        assert_eq!(
            ids(&engine.visible_offers()),
            vec![1, 5, 8, 12, 15, 19, 22, 26]
        );
    }

    #[test]
    fn visible_offers_always_match_payment_method() {
        let mut engine = seeded();
        let script = [
            Intent::SelectPaymentMethod(PaymentMethod::DebitCard),
            Intent::SelectCategory(CategoryFilter::Only(Category::Groceries)),
            Intent::ToggleFavorite(25),
            Intent::SelectPaymentMethod(PaymentMethod::DigitalDebit),
            Intent::UpdateQuery("off".to_string()),
            Intent::SetFavoritesOnly(true),
            Intent::SelectPaymentMethod(PaymentMethod::CreditCard),
            Intent::SetFavoritesOnly(false),
            Intent::CommitSearch("save".to_string()),
            Intent::SelectPaymentMethod(PaymentMethod::QrDeuna),
        ];

        for intent in script {
            let _ = engine.apply(intent);
            let method = engine.state().payment_method();
            assert!(
                engine
                    .visible_offers()
                    .iter()
                    .all(|o| o.payment_method == method)
            );
        }
    }

    #[test]
    fn category_and_query_combine() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::SelectPaymentMethod(PaymentMethod::CreditCard),
                Intent::SelectCategory(CategoryFilter::Only(Category::Entertainment)),
                Intent::UpdateQuery("THEATER".to_string()),
            ],
        );
        assert_eq!(ids(&engine.visible_offers()), vec![20]);
    }

    #[test]
    fn favorites_only_without_favorites_is_empty() {
        let mut engine = seeded();
        engine.apply(Intent::SetFavoritesOnly(true)).unwrap();
        assert!(engine.visible_offers().is_empty());

        engine
            .apply(Intent::SelectPaymentMethod(PaymentMethod::CreditCard))
            .unwrap();
        assert!(engine.visible_offers().is_empty());
    }

    #[test]
    fn favorites_only_shows_favorites() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::ToggleFavorite(8),
                Intent::ToggleFavorite(2),
                Intent::ToggleFavorite(1),
                Intent::SetFavoritesOnly(true),
            ],
        );
        assert_eq!(ids(&engine.visible_offers()), vec![1, 8]);
    }

    #[test]
    fn unmatched_query_empties_grid() {
        let mut engine = seeded();
        engine
            .apply(Intent::UpdateQuery("zzz".to_string()))
            .unwrap();
        assert!(engine.visible_offers().is_empty());
    }

    // Categories

    #[test]
    fn category_options_start_with_all() {
        let engine = seeded();
        assert_eq!(
            engine.category_options(),
            vec![
                CategoryFilter::All,
                CategoryFilter::Only(Category::Restaurants),
                CategoryFilter::Only(Category::Electronics),
                CategoryFilter::Only(Category::Entertainment),
                CategoryFilter::Only(Category::Groceries),
            ]
        );
    }

    #[test]
    fn payment_change_resets_unavailable_category() {
        let mut engine = sparse();
        engine
            .apply(Intent::SelectCategory(CategoryFilter::Only(
                Category::Restaurants,
            )))
            .unwrap();
        engine
            .apply(Intent::SelectPaymentMethod(PaymentMethod::CreditCard))
            .unwrap();

        assert_eq!(engine.state().category(), CategoryFilter::All);
        assert_eq!(engine.available_categories(), vec![Category::Electronics]);
        assert_eq!(ids(&engine.visible_offers()), vec![3]);
    }

    #[test]
    fn payment_change_keeps_available_category() {
        let mut engine = sparse();
        engine
            .apply(Intent::SelectCategory(CategoryFilter::Only(
                Category::Electronics,
            )))
            .unwrap();
        engine
            .apply(Intent::SelectPaymentMethod(PaymentMethod::CreditCard))
            .unwrap();

        assert_eq!(
            engine.state().category(),
            CategoryFilter::Only(Category::Electronics)
        );
    }

    #[test]
    fn payment_method_without_offers_resets_category() {
        let mut engine = sparse();
        engine
            .apply(Intent::SelectCategory(CategoryFilter::Only(
                Category::Electronics,
            )))
            .unwrap();
        engine
            .apply(Intent::SelectPaymentMethod(PaymentMethod::DigitalDebit))
            .unwrap();

        assert_eq!(engine.state().category(), CategoryFilter::All);
        assert!(engine.visible_offers().is_empty());
        assert_eq!(engine.category_options(), vec![CategoryFilter::All]);
    }

    #[test]
    fn selecting_unavailable_category_fails() {
        let mut engine = sparse();
        engine
            .apply(Intent::SelectPaymentMethod(PaymentMethod::CreditCard))
            .unwrap();

        let result = engine.apply(Intent::SelectCategory(CategoryFilter::Only(
            Category::Restaurants,
        )));
        assert_eq!(
            result,
            Err(EngineError::CategoryUnavailable(
                Category::Restaurants,
                PaymentMethod::CreditCard
            ))
        );
        assert_eq!(engine.state().category(), CategoryFilter::All);
    }

    // Favorites

    #[test]
    fn toggle_favorite_twice_is_noop() {
        let mut engine = seeded();
        engine.apply(Intent::ToggleFavorite(3)).unwrap();
        let before: Vec<_> = engine.favorites().collect();

        engine.apply(Intent::ToggleFavorite(12)).unwrap();
        assert!(engine.is_favorite(12));
        engine.apply(Intent::ToggleFavorite(12)).unwrap();

        assert_eq!(engine.favorites().collect::<Vec<_>>(), before);
    }

    #[test]
    fn toggle_unknown_offer_fails() {
        let mut engine = seeded();
        assert_eq!(
            engine.apply(Intent::ToggleFavorite(99)),
            Err(EngineError::UnknownOffer(99))
        );
        assert_eq!(engine.favorites().count(), 0);
    }

    #[test]
    fn favorites_do_not_affect_search() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::SetFavoritesOnly(true),
                Intent::UpdateQuery("sushi".to_string()),
                Intent::CommitSearch("sushi".to_string()),
            ],
        );
        assert_eq!(ids(&engine.suggestions()), vec![2]);
        assert_eq!(engine.search_results().unwrap().len(), 1);
    }

    // Search

    #[test]
    fn suggestions_ignore_active_filters() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::SelectCategory(CategoryFilter::Only(Category::Groceries)),
                Intent::UpdateQuery("sushi".to_string()),
            ],
        );
        assert!(engine.visible_offers().is_empty());
        assert_eq!(ids(&engine.suggestions()), vec![2]);
    }

    #[test]
    fn suggestions_truncate_to_five() {
        let mut engine = seeded();
        engine
            .apply(Intent::UpdateQuery("save".to_string()))
            .unwrap();
        assert_eq!(engine.suggestions().len(), 5);
    }

    #[test]
    fn suggestion_limit_is_configurable() {
        let config = EngineConfig {
            suggestion_limit: 2,
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_config(Catalog::seed().unwrap(), config);
        engine
            .apply(Intent::UpdateQuery("save".to_string()))
            .unwrap();
        assert_eq!(ids(&engine.suggestions()), vec![7, 8]);
    }

    #[test]
    fn commit_sushi_yields_one_credit_card_group() {
        let mut engine = seeded();
        engine
            .apply(Intent::CommitSearch("sushi".to_string()))
            .unwrap();

        let results = engine.search_results().unwrap();
        assert_eq!(results.groups().len(), 1);
        assert_eq!(
            results.groups()[0].payment_method,
            PaymentMethod::CreditCard
        );
        assert_eq!(results.groups()[0].offers.len(), 1);
        assert_eq!(results.groups()[0].offers[0].title, "2x1 on Sushi");
        assert_eq!(engine.recent_searches().collect::<Vec<_>>(), vec!["sushi"]);
    }

    #[test]
    fn commit_searches_whole_catalog() {
        let mut engine = seeded();
        engine
            .apply(Intent::CommitSearch("save".to_string()))
            .unwrap();
        // the home grid still applies the payment filter
        assert_eq!(ids(&engine.visible_offers()), vec![8, 22, 26]);
        assert_eq!(engine.search_results().unwrap().len(), 10);
    }

    #[test]
    fn empty_commit_groups_whole_catalog_without_history() {
        let mut engine = seeded();
        engine.apply(Intent::CommitSearch(String::new())).unwrap();

        let results = engine.search_results().unwrap();
        assert_eq!(results.len(), 28);
        assert_eq!(engine.recent_searches().count(), 0);
    }

    #[test]
    fn recent_searches_are_bounded() {
        let mut engine = seeded();
        for i in 0..12 {
            engine
                .apply(Intent::CommitSearch(format!("query {i}")))
                .unwrap();
        }

        let recent: Vec<_> = engine.recent_searches().collect();
        let expected: Vec<String> = (2..12).rev().map(|i| format!("query {i}")).collect();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent, expected);
    }

    #[test]
    fn repeated_commit_is_not_moved_to_front() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::CommitSearch("sushi".to_string()),
                Intent::CommitSearch("laptops".to_string()),
                Intent::CommitSearch("sushi".to_string()),
            ],
        );
        assert_eq!(
            engine.recent_searches().collect::<Vec<_>>(),
            vec!["laptops", "sushi"]
        );
    }

    #[test]
    fn clear_recent_searches() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::CommitSearch("sushi".to_string()),
                Intent::ClearRecentSearches,
            ],
        );
        assert_eq!(engine.recent_searches().count(), 0);
    }

    #[test]
    fn pick_suggestion_commits_offer_title() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::UpdateQuery("phone".to_string()),
                Intent::PickSuggestion(8),
            ],
        );

        assert_eq!(engine.state().query(), "30% off Smartphones");
        let results = engine.search_results().unwrap();
        assert_eq!(results.query(), "30% off Smartphones");
        assert_eq!(ids(&results.offers().collect::<Vec<_>>()), vec![8]);
        assert_eq!(
            engine.recent_searches().collect::<Vec<_>>(),
            vec!["30% off Smartphones"]
        );
    }

    #[test]
    fn pick_unknown_suggestion_fails() {
        let mut engine = seeded();
        assert_eq!(
            engine.apply(Intent::PickSuggestion(0)),
            Err(EngineError::UnknownOffer(0))
        );
        assert!(engine.search_results().is_none());
    }

    #[test]
    fn close_results_clears_query() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::CommitSearch("sushi".to_string()),
                Intent::CloseResults,
            ],
        );
        assert!(engine.search_results().is_none());
        assert_eq!(engine.state().query(), "");
        assert_eq!(engine.visible_offers().len(), 8);
        assert_eq!(engine.recent_searches().count(), 1);
    }

    #[test]
    fn clear_query_keeps_results_view() {
        let mut engine = seeded();
        apply_all(
            &mut engine,
            [
                Intent::CommitSearch("sushi".to_string()),
                Intent::ClearQuery,
            ],
        );
        assert_eq!(engine.state().query(), "");
        assert!(engine.suggestions().is_empty());
        assert_eq!(engine.search_results().unwrap().query(), "sushi");
    }

    // Detail view

    #[test]
    fn open_and_close_offer() {
        let mut engine = seeded();
        engine.apply(Intent::OpenOffer(9)).unwrap();
        let offer = engine.selected_offer().unwrap();
        assert_eq!(offer.title, "40% off Laptops");
        assert_eq!(offer.payment_method.promo_code(), Some("CREDIT2023"));
        assert!(!engine.is_favorite(offer.id));

        engine.apply(Intent::ToggleFavorite(9)).unwrap();
        let offer = engine.selected_offer().unwrap();
        assert!(engine.is_favorite(offer.id));

        engine.apply(Intent::CloseOffer).unwrap();
        assert!(engine.selected_offer().is_none());
    }

    #[test]
    fn open_unknown_offer_fails() {
        let mut engine = seeded();
        assert_eq!(
            engine.apply(Intent::OpenOffer(42)),
            Err(EngineError::UnknownOffer(42))
        );
        assert!(engine.selected_offer().is_none());
    }

    // Stream

    #[tokio::test]
    async fn run_applies_stream_and_skips_rejected_intents() {
        let mut engine = seeded();
        let intents = tokio_stream::iter(vec![
            Intent::ToggleFavorite(99),
            Intent::SelectPaymentMethod(PaymentMethod::CreditCard),
            Intent::ToggleFavorite(2),
            Intent::SetFavoritesOnly(true),
        ]);

        engine.run(intents).await;

        assert_eq!(ids(&engine.visible_offers()), vec![2]);
    }
}
