//! Search/category filtering and per-category counts.

use std::fmt;
use std::str::FromStr;

use apkstore_protocol::{Category, Listing, ListingEntry};
use serde::{Deserialize, Serialize};

/// Category tab selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Game,
    App,
}

impl CategoryFilter {
    /// Tab order.
    pub const TABS: [CategoryFilter; 3] = [
        CategoryFilter::All,
        CategoryFilter::Game,
        CategoryFilter::App,
    ];

    /// The category this tab selects, `None` for `All`.
    pub fn category(self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Game => Some(Category::Game),
            CategoryFilter::App => Some(Category::App),
        }
    }

    pub fn accepts(self, category: Category) -> bool {
        self.category().is_none_or(|c| c == category)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Game => "game",
            CategoryFilter::App => "app",
        }
    }

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Game => "Games",
            CategoryFilter::App => "Apps",
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        match category {
            Category::Game => CategoryFilter::Game,
            Category::App => CategoryFilter::App,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a selector other than `all`, `game` or `app`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category filter: {0}")]
pub struct ParseFilterError(pub String);

impl FromStr for CategoryFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CategoryFilter::All),
            "game" => Ok(CategoryFilter::Game),
            "app" => Ok(CategoryFilter::App),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

/// Badge counts over the unfiltered listing set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub all: usize,
    pub game: usize,
    pub app: usize,
}

impl CategoryCounts {
    /// Count shown on the given tab.
    pub fn get(&self, filter: CategoryFilter) -> usize {
        match filter {
            CategoryFilter::All => self.all,
            CategoryFilter::Game => self.game,
            CategoryFilter::App => self.app,
        }
    }
}

/// Whether `listing` passes both the search text and the category tab.
///
/// `query` is matched as a case-insensitive substring of the name, untrimmed.
/// An empty query matches everything.
pub fn matches(listing: &Listing, query: &str, filter: CategoryFilter) -> bool {
    let matches_search =
        query.is_empty() || listing.name.to_lowercase().contains(&query.to_lowercase());
    matches_search && filter.accepts(listing.category)
}

/// Listings passing `query` and `filter`, in input order.
pub fn filter_listings(
    listings: &[ListingEntry],
    query: &str,
    filter: CategoryFilter,
) -> Vec<ListingEntry> {
    listings
        .iter()
        .filter(|(_, listing)| matches(listing, query, filter))
        .cloned()
        .collect()
}

/// Per-category totals over the full set.
pub fn category_counts(listings: &[ListingEntry]) -> CategoryCounts {
    listings
        .iter()
        .fold(CategoryCounts::default(), |mut counts, (_, listing)| {
            counts.all += 1;
            match listing.category {
                Category::Game => counts.game += 1,
                Category::App => counts.app += 1,
            }
            counts
        })
}
