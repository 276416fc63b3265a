//! Free-text matching over offers.
//!
//! The same case-insensitive substring predicate drives predictive
//! suggestions, committed searches and the home grid query filter.

use crate::model::{Offer, PaymentMethod};

/// Default number of predictive suggestions.
pub const SUGGESTION_LIMIT: usize = 5;

/// A lowercased query, ready to be matched against offers.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    lowered: String,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            lowered: raw.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Title, shop name or short description contains the query, ignoring case.
    pub fn matches(&self, offer: &Offer) -> bool {
        [&offer.title, &offer.shop_name, &offer.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.lowered))
    }
}

/// Predictive suggestions: the first `limit` matches, in catalog order.
///
/// Blank queries produce no suggestions.
pub fn suggestions<'a>(
    offers: impl IntoIterator<Item = &'a Offer>,
    query: &str,
    limit: usize,
) -> Vec<&'a Offer> {
    let query = Query::new(query);
    if query.is_blank() {
        return Vec::new();
    }

    offers
        .into_iter()
        .filter(|offer| query.matches(offer))
        .take(limit)
        .collect()
}

/// Offers sharing a payment method within a committed search.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGroup<'a> {
    pub payment_method: PaymentMethod,
    pub offers: Vec<&'a Offer>,
}

/// Committed search output, grouped by payment method.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<'a> {
    query: String,
    groups: Vec<ResultGroup<'a>>,
}

impl<'a> SearchResults<'a> {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Groups in first-seen order.
    pub fn groups(&self) -> &[ResultGroup<'a>] {
        &self.groups
    }

    pub fn group(&self, method: PaymentMethod) -> Option<&ResultGroup<'a>> {
        self.groups.iter().find(|g| g.payment_method == method)
    }

    /// Total number of matched offers.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.offers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All matches flattened in group order.
    pub fn offers(&self) -> impl Iterator<Item = &'a Offer> + '_ {
        self.groups.iter().flat_map(|g| g.offers.iter().copied())
    }

    /// e.g. `1 result found`, `3 results found`.
    pub fn summary(&self) -> String {
        match self.len() {
            1 => "1 result found".to_string(),
            n => format!("{n} results found"),
        }
    }
}

/// Committed search over every offer, no truncation.
///
/// An empty query matches everything.
pub fn search<'a>(offers: impl IntoIterator<Item = &'a Offer>, query: &str) -> SearchResults<'a> {
    let matcher = Query::new(query);
    let mut groups: Vec<ResultGroup<'a>> = Vec::new();

    for offer in offers.into_iter().filter(|offer| matcher.matches(offer)) {
        match groups
            .iter_mut()
            .find(|g| g.payment_method == offer.payment_method)
        {
            Some(group) => group.offers.push(offer),
            None => groups.push(ResultGroup {
                payment_method: offer.payment_method,
                offers: vec![offer],
            }),
        }
    }

    SearchResults {
        query: query.to_string(),
        groups,
    }
}

/// Piece of a highlighted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

/// Split `text` into plain and matching segments, ignoring case.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    if query.trim().is_empty() {
        return vec![Segment::Plain(text)];
    }

    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        match match_len(&text[pos..], &needle) {
            Some(len) => {
                if plain_start < pos {
                    segments.push(Segment::Plain(&text[plain_start..pos]));
                }
                segments.push(Segment::Match(&text[pos..pos + len]));
                pos += len;
                plain_start = pos;
            }
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

/// Byte length of the prefix of `text` equal to `needle` once lowercased.
fn match_len(text: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (pos, ch) in text.char_indices() {
        for lower in ch.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(pos + ch.len_utf8());
        }
    }
    None
}

/// A frequently searched establishment, shown before the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Establishment {
    pub name: &'static str,
    pub category: &'static str,
}

/// Most searched establishments. Picking one commits its name as the query.
pub const TRENDING: [Establishment; 5] = [
    Establishment {
        name: "KFC",
        category: "Fast Food",
    },
    Establishment {
        name: "Apple Store",
        category: "Electronics",
    },
    Establishment {
        name: "Cinemark",
        category: "Entertainment",
    },
    Establishment {
        name: "Supermaxi",
        category: "Groceries",
    },
    Establishment {
        name: "Sweet & Coffee",
        category: "Cafes",
    },
];
