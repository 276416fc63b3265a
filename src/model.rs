//! Core domain types for the offer browser.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Offer identifier.
pub type OfferId = u32;

/// Payment method facet an offer is attached to.
///
/// This is a filter value only, no payment rail sits behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PaymentMethod {
    #[default]
    QrDeuna,
    CreditCard,
    DebitCard,
    DigitalDebit,
}

impl PaymentMethod {
    /// All payment methods, in tab order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::QrDeuna,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::DigitalDebit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::QrDeuna => "qr-deuna",
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::DebitCard => "debit-card",
            PaymentMethod::DigitalDebit => "digital-debit",
        }
    }

    /// Human readable tab title.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::QrDeuna => "QR Deuna",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::DigitalDebit => "Digital Debit",
        }
    }

    /// Code to present at checkout. QR offers are redeemed by scanning instead.
    pub fn promo_code(&self) -> Option<&'static str> {
        match self {
            PaymentMethod::QrDeuna => None,
            PaymentMethod::CreditCard => Some("CREDIT2023"),
            PaymentMethod::DebitCard => Some("DEBIT2023"),
            PaymentMethod::DigitalDebit => Some("DIGITAL2023"),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known facet value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value '{0}'")]
pub struct UnknownValue(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qr-deuna" | "qr-transfer" => Ok(PaymentMethod::QrDeuna),
            "credit-card" => Ok(PaymentMethod::CreditCard),
            "debit-card" => Ok(PaymentMethod::DebitCard),
            "digital-debit" => Ok(PaymentMethod::DigitalDebit),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// Offer category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Restaurants,
    Electronics,
    Entertainment,
    Groceries,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Restaurants,
        Category::Electronics,
        Category::Entertainment,
        Category::Groceries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurants => "restaurants",
            Category::Electronics => "electronics",
            Category::Entertainment => "entertainment",
            Category::Groceries => "groceries",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Restaurants => "Restaurants",
            Category::Electronics => "Electronics",
            Category::Entertainment => "Entertainment",
            Category::Groceries => "Groceries",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restaurants" => Ok(Category::Restaurants),
            "electronics" => Ok(Category::Electronics),
            "entertainment" => Ok(Category::Entertainment),
            "groceries" => Ok(Category::Groceries),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// Category selection: either every category or a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn accepts(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => *selected == category,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All Categories",
            CategoryFilter::Only(category) => category.label(),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// A promotional offer from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    /// Short description shown on cards.
    pub description: String,
    /// Long description shown in the detail view.
    pub full_description: Option<String>,
    pub image: String,
    pub terms: String,
    pub payment_method: PaymentMethod,
    pub category: Category,
    pub is_new: bool,
    pub shop_name: String,
    pub shop_logo: String,
    pub location: String,
    pub deadline: NaiveDate,
}

impl Offer {
    /// Deadline as shown to users, e.g. `December 31, 2023`.
    pub fn deadline_label(&self) -> String {
        self.deadline.format("%B %-d, %Y").to_string()
    }

    /// Text copied to the clipboard when sharing the offer.
    pub fn share_text(&self) -> String {
        format!(
            "{}\n{}\nValid until {}",
            self.title,
            self.description,
            self.deadline_label()
        )
    }

    /// Long description, falling back to the short one.
    pub fn details(&self) -> &str {
        self.full_description
            .as_deref()
            .unwrap_or(&self.description)
    }
}

/// A user intent emitted by the view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Switch payment method tab.
    SelectPaymentMethod(PaymentMethod),
    /// Select a category chip.
    SelectCategory(CategoryFilter),
    /// Add or remove an offer from favorites.
    ToggleFavorite(OfferId),
    /// Show only favorited offers.
    SetFavoritesOnly(bool),
    /// Live query edit; drives predictive suggestions.
    UpdateQuery(String),
    /// Explicit search submission.
    CommitSearch(String),
    /// Commit the title of a suggested offer.
    PickSuggestion(OfferId),
    /// Leave the search results view; clears the query.
    CloseResults,
    /// Clear the live query.
    ClearQuery,
    ClearRecentSearches,
    /// Open an offer in the detail view.
    OpenOffer(OfferId),
    CloseOffer,
}

impl Intent {
    /// Short name used in logs and in the intents csv.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SelectPaymentMethod(_) => "select_payment",
            Intent::SelectCategory(_) => "select_category",
            Intent::ToggleFavorite(_) => "toggle_favorite",
            Intent::SetFavoritesOnly(_) => "favorites_only",
            Intent::UpdateQuery(_) => "update_query",
            Intent::CommitSearch(_) => "commit_search",
            Intent::PickSuggestion(_) => "pick_suggestion",
            Intent::CloseResults => "close_results",
            Intent::ClearQuery => "clear_query",
            Intent::ClearRecentSearches => "clear_recent",
            Intent::OpenOffer(_) => "open_offer",
            Intent::CloseOffer => "close_offer",
        }
    }
}
