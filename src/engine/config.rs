use crate::model::PaymentMethod;
use crate::search::SUGGESTION_LIMIT;

use super::history::RECENT_SEARCH_CAPACITY;

/// Engine tunables. Defaults match the shipped app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Payment method tab selected at startup.
    pub default_payment_method: PaymentMethod,
    /// Maximum number of remembered searches.
    pub recent_capacity: usize,
    /// Maximum number of predictive suggestions.
    pub suggestion_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_payment_method: PaymentMethod::default(),
            recent_capacity: RECENT_SEARCH_CAPACITY,
            suggestion_limit: SUGGESTION_LIMIT,
        }
    }
}
