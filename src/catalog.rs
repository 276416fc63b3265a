//! The immutable offer catalog.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::csv::{CsvError, read_offers};
use crate::model::{Category, Offer, OfferId, PaymentMethod};

/// Seed catalog shipped with the crate.
const SEED: &str = include_str!("../data/offers.csv");

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("invalid catalog: {0}")]
    Csv(#[from] CsvError),

    #[error("duplicate offer id {0}")]
    DuplicateId(OfferId),
}

/// Ordered, read-only list of offers with an id index.
#[derive(Debug, Clone)]
pub struct Catalog {
    offers: Vec<Offer>,
    index: HashMap<OfferId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids. Order is kept as given.
    pub fn new(offers: Vec<Offer>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(offers.len());
        for (pos, offer) in offers.iter().enumerate() {
            if index.insert(offer.id, pos).is_some() {
                return Err(CatalogError::DuplicateId(offer.id));
            }
        }
        Ok(Self { offers, index })
    }

    /// The built-in 28 offer catalog.
    pub fn seed() -> Result<Self, CatalogError> {
        Self::from_reader(SEED.as_bytes())
    }

    /// Load a catalog from csv. Any invalid row fails the whole load.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, CatalogError> {
        let offers = read_offers(reader).collect::<Result<Vec<_>, _>>()?;
        Self::new(offers)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Offer> + '_ {
        self.offers.iter()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn get(&self, id: OfferId) -> Option<&Offer> {
        self.index.get(&id).map(|&pos| &self.offers[pos])
    }

    pub fn contains(&self, id: OfferId) -> bool {
        self.index.contains_key(&id)
    }

    /// Distinct categories offered under `method`, in first-seen catalog order.
    pub fn available_categories(&self, method: PaymentMethod) -> Vec<Category> {
        let mut categories = Vec::with_capacity(Category::ALL.len());
        for offer in self.offers.iter().filter(|o| o.payment_method == method) {
            if !categories.contains(&offer.category) {
                categories.push(offer.category);
            }
        }
        categories
    }
}
