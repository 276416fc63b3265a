pub mod catalog;
pub mod csv;
pub mod engine;
pub mod model;
pub mod search;

pub use catalog::{Catalog, CatalogError};
pub use engine::{Engine, EngineConfig, EngineError};
pub use model::{Category, CategoryFilter, Intent, Offer, OfferId, PaymentMethod};
pub use search::SearchResults;
