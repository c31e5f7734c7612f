//! Listing directory: search and category filtering over fetched listings.
//!
//! Pure derivation, no I/O. The host feeds the listings it got from the
//! query cache together with the current search text and category tab, and
//! reads back the visible listings and the tab badge counts.
//!
//! Counts are always taken over the full set, so badges show global totals
//! while the visible list reflects both search and category.

pub mod filter;
pub mod view;

pub use filter::{
    CategoryCounts, CategoryFilter, ParseFilterError, category_counts, filter_listings, matches,
};
pub use view::{DirectoryView, EmptyState, ListingDirectory};
