//! Directory state and the derived view handed to the renderer.

use apkstore_protocol::ListingEntry;
use tracing::debug;

use crate::filter::{CategoryCounts, CategoryFilter, category_counts, filter_listings};

/// Why nothing is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The store has no listings at all.
    NoListingsYet,
    /// Listings exist but the search or tab excludes all of them.
    NoMatches,
}

impl EmptyState {
    pub fn title(self) -> &'static str {
        match self {
            EmptyState::NoListingsYet => "No APKs Yet",
            EmptyState::NoMatches => "No APKs Found",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            EmptyState::NoListingsYet => {
                "Admin can upload APK listings using the Upload APK button."
            }
            EmptyState::NoMatches => "Try adjusting your search or category filter",
        }
    }
}

/// Derived directory contents for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryView {
    pub visible: Vec<ListingEntry>,
    pub counts: CategoryCounts,
}

impl DirectoryView {
    pub fn total(&self) -> usize {
        self.counts.all
    }

    /// `None` when at least one listing is visible.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.visible.is_empty() {
            None
        } else if self.counts.all == 0 {
            Some(EmptyState::NoListingsYet)
        } else {
            Some(EmptyState::NoMatches)
        }
    }

    /// Footer line, e.g. `"Showing 2 of 5 APKs"`.
    pub fn showing_summary(&self) -> String {
        format!("Showing {} of {} APKs", self.visible.len(), self.total())
    }
}

/// Fetched listings plus the current search text and category tab.
#[derive(Debug, Clone, Default)]
pub struct ListingDirectory {
    listings: Vec<ListingEntry>,
    query: String,
    filter: CategoryFilter,
}

impl ListingDirectory {
    pub fn new(listings: Vec<ListingEntry>) -> Self {
        Self {
            listings,
            ..Self::default()
        }
    }

    /// Replaces the listing set, e.g. after the cache refetched.
    pub fn set_listings(&mut self, listings: Vec<ListingEntry>) {
        debug!(count = listings.len(), "directory listings replaced");
        self.listings = listings;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn listings(&self) -> &[ListingEntry] {
        &self.listings
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    /// Listings passing the current search and tab, in fetched order.
    pub fn visible(&self) -> Vec<ListingEntry> {
        filter_listings(&self.listings, &self.query, self.filter)
    }

    /// Tab badge counts, independent of search and tab.
    pub fn counts(&self) -> CategoryCounts {
        category_counts(&self.listings)
    }

    pub fn view(&self) -> DirectoryView {
        DirectoryView {
            visible: self.visible(),
            counts: self.counts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkstore_protocol::{Category, Listing, ListingId};

    fn entry(id: &str, name: &str, category: Category) -> ListingEntry {
        (
            ListingId::new(id),
            Listing {
                name: name.into(),
                description: String::new(),
                download_url: String::new(),
                file_size: 0,
                version: "1.0".into(),
                mod_features: Vec::new(),
                category,
                icon_url: String::new(),
            },
        )
    }

    fn directory() -> ListingDirectory {
        ListingDirectory::new(vec![
            entry("1", "Pro Tool", Category::App),
            entry("2", "Battle Royale", Category::Game),
            entry("3", "Pro Racer", Category::Game),
        ])
    }

    #[test]
    fn defaults_show_everything() {
        let dir = directory();
        assert_eq!(dir.filter(), CategoryFilter::All);
        assert_eq!(dir.query(), "");
        let view = dir.view();
        assert_eq!(view.visible.len(), 3);
        assert_eq!(view.empty_state(), None);
        assert_eq!(view.showing_summary(), "Showing 3 of 3 APKs");
    }

    #[test]
    fn counts_ignore_search_and_tab() {
        let mut dir = directory();
        dir.set_query("royale");
        dir.set_filter(CategoryFilter::App);

        let view = dir.view();
        assert!(view.visible.is_empty());
        assert_eq!(view.counts, CategoryCounts { all: 3, game: 2, app: 1 });
        assert_eq!(view.empty_state(), Some(EmptyState::NoMatches));
    }

    #[test]
    fn search_within_tab() {
        let mut dir = directory();
        dir.set_query("PRO");
        dir.set_filter(CategoryFilter::Game);

        let view = dir.view();
        assert_eq!(view.visible.len(), 1);
        assert_eq!(view.visible[0].0.as_str(), "3");
        assert_eq!(view.showing_summary(), "Showing 1 of 3 APKs");
    }

    #[test]
    fn empty_store() {
        let view = ListingDirectory::default().view();
        assert_eq!(view.empty_state(), Some(EmptyState::NoListingsYet));
        assert_eq!(EmptyState::NoListingsYet.title(), "No APKs Yet");
        assert_eq!(view.counts, CategoryCounts::default());
    }

    #[test]
    fn replacing_listings_recomputes() {
        let mut dir = directory();
        dir.set_filter(CategoryFilter::Game);
        assert_eq!(dir.visible().len(), 2);

        dir.set_listings(vec![entry("9", "Calculator", Category::App)]);
        assert!(dir.visible().is_empty());
        assert_eq!(dir.counts().app, 1);
        assert_eq!(dir.listings().len(), 1);
    }
}
