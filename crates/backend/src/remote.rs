//! Remote data client trait.
//!
//! `RemoteData` is implemented by each backend. Keeping the storefront on a
//! trait keeps cache and form logic decoupled from transport and testable
//! with mocks.

use std::future::Future;
use std::pin::Pin;

use apkstore_protocol::{
    Category, Listing, ListingEntry, ListingId, Principal, UserProfile, UserRole,
};

use crate::error::BackendError;

/// Boxed future returned by every [`RemoteData`] operation.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Abstract connection to the listing backend.
///
/// All authorization happens on the backend side; implementations report
/// rejected calls as [`BackendError::Unauthorized`].
pub trait RemoteData: Send + Sync {
    /// Persists a new listing and returns the key the backend assigned.
    fn add_listing(&self, listing: &Listing) -> BackendFuture<'_, ListingId>;

    /// Replaces an existing listing.
    fn update_listing(&self, id: &ListingId, listing: &Listing) -> BackendFuture<'_, ()>;

    /// Removes a listing.
    fn delete_listing(&self, id: &ListingId) -> BackendFuture<'_, ()>;

    /// Fetches a single listing, `None` if the key is unknown.
    fn get_listing(&self, id: &ListingId) -> BackendFuture<'_, Option<Listing>>;

    /// Fetches every listing in backend order.
    fn get_all_listings(&self) -> BackendFuture<'_, Vec<ListingEntry>>;

    /// Fetches the listings of one category.
    fn get_listings_by_category(&self, category: Category) -> BackendFuture<'_, Vec<ListingEntry>>;

    /// Server-side search. The directory filters client-side instead.
    fn search_listings(&self, term: &str) -> BackendFuture<'_, Vec<ListingEntry>>;

    /// Profile of the calling identity, `None` before first setup.
    fn get_caller_user_profile(&self) -> BackendFuture<'_, Option<UserProfile>>;

    /// Creates or replaces the caller's profile.
    fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendFuture<'_, ()>;

    fn get_caller_user_role(&self) -> BackendFuture<'_, UserRole>;

    fn is_caller_admin(&self) -> BackendFuture<'_, bool>;

    /// Assigns a role to another identity. Admin only.
    fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> BackendFuture<'_, ()>;
}
