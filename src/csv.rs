use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::{Category, Intent, Offer, OfferId, PaymentMethod};

/// Errors that can occur when reading or writing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unknown payment method '{value}'")]
    UnknownPaymentMethod { line: usize, value: String },

    #[error("line {line}: unknown category '{value}'")]
    UnknownCategory { line: usize, value: String },

    #[error("line {line}: invalid deadline '{value}', expected YYYY-MM-DD")]
    InvalidDeadline { line: usize, value: String },

    #[error("line {line}: unrecognized intent '{intent}'")]
    UnrecognizedIntent { line: usize, intent: String },

    #[error("line {line}: {intent} missing value")]
    MissingValue { line: usize, intent: String },

    #[error("line {line}: invalid {intent} value '{value}'")]
    InvalidValue {
        line: usize,
        intent: String,
        value: String,
    },

    #[error("failed to write view row: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to write view: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct OfferRow {
    id: OfferId,
    title: String,
    description: String,
    full_description: Option<String>,
    image: String,
    terms: String,
    payment_method: String,
    category: String,
    is_new: Option<bool>,
    shop_name: String,
    shop_logo: String,
    location: String,
    deadline: String,
}

impl OfferRow {
    fn into_offer(self, line: usize) -> Result<Offer, CsvError> {
        let Ok(payment_method) = self.payment_method.parse::<PaymentMethod>() else {
            return Err(CsvError::UnknownPaymentMethod {
                line,
                value: self.payment_method,
            });
        };
        let Ok(category) = self.category.parse::<Category>() else {
            return Err(CsvError::UnknownCategory {
                line,
                value: self.category,
            });
        };
        let Ok(deadline) = NaiveDate::parse_from_str(&self.deadline, "%Y-%m-%d") else {
            return Err(CsvError::InvalidDeadline {
                line,
                value: self.deadline,
            });
        };

        Ok(Offer {
            id: self.id,
            title: self.title,
            description: self.description,
            full_description: self.full_description,
            image: self.image,
            terms: self.terms,
            payment_method,
            category,
            is_new: self.is_new.unwrap_or(false),
            shop_name: self.shop_name,
            shop_logo: self.shop_logo,
            location: self.location,
            deadline,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IntentRow {
    intent: String,
    value: Option<String>,
}

impl IntentRow {
    fn into_intent(self, line: usize) -> Result<Intent, CsvError> {
        let intent = match self.intent.as_str() {
            "select_payment" => Intent::SelectPaymentMethod(self.parse_value(line)?),
            "select_category" => Intent::SelectCategory(self.parse_value(line)?),
            "toggle_favorite" => Intent::ToggleFavorite(self.parse_value(line)?),
            "favorites_only" => Intent::SetFavoritesOnly(self.parse_value(line)?),
            "update_query" => Intent::UpdateQuery(self.value.unwrap_or_default()),
            "commit_search" => Intent::CommitSearch(self.value.unwrap_or_default()),
            "pick_suggestion" => Intent::PickSuggestion(self.parse_value(line)?),
            "clear_recent" => Intent::ClearRecentSearches,
            "close_results" => Intent::CloseResults,
            "clear_query" => Intent::ClearQuery,
            "open_offer" => Intent::OpenOffer(self.parse_value(line)?),
            "close_offer" => Intent::CloseOffer,
            other => {
                return Err(CsvError::UnrecognizedIntent {
                    line,
                    intent: other.to_string(),
                });
            }
        };
        Ok(intent)
    }

    fn parse_value<T: FromStr>(&self, line: usize) -> Result<T, CsvError> {
        let value = self
            .value
            .as_deref()
            .ok_or_else(|| CsvError::MissingValue {
                line,
                intent: self.intent.clone(),
            })?;
        value.parse().map_err(|_| CsvError::InvalidValue {
            line,
            intent: self.intent.clone(),
            value: value.to_string(),
        })
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All);
    builder
}

/// Read catalog offers from csv
pub fn read_offers<R: io::Read>(reader: R) -> impl Iterator<Item = Result<Offer, CsvError>> {
    reader_builder()
        .from_reader(reader)
        .into_deserialize::<OfferRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            row.into_offer(line)
        })
}

/// Read user intents from a csv file
pub fn read_intents(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Intent, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = reader_builder()
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<IntentRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2;
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            row.into_intent(line)
        }))
}

/// Section of the screen an output row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Filtered offers on the home grid.
    Grid,
    /// Committed search results, in payment method group order.
    Search,
    /// The offer opened in the detail view.
    Detail,
}

impl View {
    fn as_str(&self) -> &'static str {
        match self {
            View::Grid => "grid",
            View::Search => "search",
            View::Detail => "detail",
        }
    }
}

/// One offer as rendered in a view.
#[derive(Debug, Clone, Copy)]
pub struct ViewEntry<'a> {
    pub view: View,
    pub offer: &'a Offer,
    pub favorite: bool,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    view: &'static str,
    id: OfferId,
    title: &'a str,
    shop_name: &'a str,
    payment_method: &'static str,
    category: &'static str,
    deadline: NaiveDate,
    favorite: bool,
}

/// Column names of the view output.
pub const VIEW_HEADER: [&str; 8] = [
    "view",
    "id",
    "title",
    "shop_name",
    "payment_method",
    "category",
    "deadline",
    "favorite",
];

/// Write rendered view entries in csv format
///
/// The header is always written, even for an empty view.
pub fn write_view<'a, W: io::Write>(
    writer: W,
    entries: impl IntoIterator<Item = ViewEntry<'a>>,
) -> Result<(), CsvError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(VIEW_HEADER)?;

    for entry in entries {
        let offer = entry.offer;
        let row = OutputRow {
            view: entry.view.as_str(),
            id: offer.id,
            title: &offer.title,
            shop_name: &offer.shop_name,
            payment_method: offer.payment_method.as_str(),
            category: offer.category.as_str(),
            deadline: offer.deadline,
            favorite: entry.favorite,
        };
        writer.serialize(&row)?;
    }

    writer.flush()?;
    Ok(())
}
