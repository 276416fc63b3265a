//! Error types for intent processing.

use thiserror::Error;

use crate::model::{Category, OfferId, PaymentMethod};

/// Error returned by [`Engine::apply`](super::Engine::apply).
///
/// A rejected intent leaves the session untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("offer {0} not found")]
    UnknownOffer(OfferId),

    #[error("no {0} offers for payment method {1}")]
    CategoryUnavailable(Category, PaymentMethod),
}
