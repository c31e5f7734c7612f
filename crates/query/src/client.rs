//! Store client: cached queries and invalidating mutations over a backend.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use apkstore_backend::RemoteData;
use apkstore_protocol::{
    Category, Listing, ListingEntry, ListingId, Principal, UserProfile, UserRole,
};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::cell::QueryCell;
use crate::error::QueryError;
use crate::types::{ProfileState, QueryKey, QueryState, QueryStatus};

/// Query/cache layer in front of a [`RemoteData`] backend.
///
/// `listings` is always enabled. The caller-scoped queries only run while
/// an identity is set and report [`QueryState::Disabled`] otherwise, without
/// touching the backend.
///
/// Mutations invalidate exactly the entries they can affect, and only after
/// the backend confirmed them. A failed mutation leaves the cache as it was.
pub struct StoreClient {
    backend: Arc<dyn RemoteData>,
    identity: RwLock<Option<Principal>>,
    listings: QueryCell<Vec<ListingEntry>>,
    profile: QueryCell<Option<UserProfile>>,
    role: QueryCell<UserRole>,
    admin: QueryCell<bool>,
}

impl StoreClient {
    /// Creates a client with no identity and an empty cache.
    pub fn new(backend: Arc<dyn RemoteData>) -> Self {
        Self {
            backend,
            identity: RwLock::new(None),
            listings: QueryCell::new(QueryKey::Listings),
            profile: QueryCell::new(QueryKey::CallerProfile),
            role: QueryCell::new(QueryKey::CallerRole),
            admin: QueryCell::new(QueryKey::IsAdmin),
        }
    }

    pub fn backend(&self) -> &Arc<dyn RemoteData> {
        &self.backend
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Current identity, if any.
    pub fn identity(&self) -> Option<Principal> {
        self.identity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// Sets the identity that gates caller-scoped queries.
    ///
    /// Switching to a different identity invalidates every caller-scoped entry.
    pub fn set_identity(&self, identity: Option<Principal>) {
        let changed = {
            let mut current = self.identity.write().unwrap_or_else(|e| e.into_inner());
            let changed = *current != identity;
            *current = identity;
            changed
        };
        if changed {
            debug!("identity changed, dropping caller-scoped queries");
            self.invalidate_caller_scoped();
        }
    }

    fn invalidate_caller_scoped(&self) {
        for key in QueryKey::ALL.into_iter().filter(|k| k.requires_identity()) {
            self.invalidate(key);
        }
    }

    // -----------------------------------------------------------------------
    // Cache control
    // -----------------------------------------------------------------------

    /// Marks one entry stale; the next read of it fetches again.
    pub fn invalidate(&self, key: QueryKey) {
        match key {
            QueryKey::Listings => self.listings.invalidate(),
            QueryKey::CallerProfile => self.profile.invalidate(),
            QueryKey::CallerRole => self.role.invalidate(),
            QueryKey::IsAdmin => self.admin.invalidate(),
        }
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        for key in QueryKey::ALL {
            self.invalidate(key);
        }
        info!("query cache cleared");
    }

    /// Status of one entry, reporting `Disabled` for gated queries without identity.
    pub fn status(&self, key: QueryKey) -> QueryStatus {
        if key.requires_identity() && !self.is_authenticated() {
            return QueryStatus::Disabled;
        }
        match key {
            QueryKey::Listings => self.listings.state().status(),
            QueryKey::CallerProfile => self.profile.state().status(),
            QueryKey::CallerRole => self.role.state().status(),
            QueryKey::IsAdmin => self.admin.state().status(),
        }
    }

    /// When the entry's current outcome was stored.
    pub fn last_fetched_at(&self, key: QueryKey) -> Option<Instant> {
        match key {
            QueryKey::Listings => self.listings.last_fetched_at(),
            QueryKey::CallerProfile => self.profile.last_fetched_at(),
            QueryKey::CallerRole => self.role.last_fetched_at(),
            QueryKey::IsAdmin => self.admin.last_fetched_at(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn listings_fetcher(
        &self,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Vec<ListingEntry>, QueryError>> {
        let backend = Arc::clone(&self.backend);
        move || {
            async move {
                let listings = backend.get_all_listings().await?;
                debug!(count = listings.len(), "listings fetched");
                Ok::<_, QueryError>(listings)
            }
            .boxed()
        }
    }

    /// All listings, from cache when possible.
    pub async fn listings(&self) -> Result<Vec<ListingEntry>, QueryError> {
        self.listings.fetch(self.listings_fetcher()).await
    }

    /// Fetches listings again regardless of what is cached.
    pub async fn refetch_listings(&self) -> Result<Vec<ListingEntry>, QueryError> {
        self.listings.refetch(self.listings_fetcher()).await
    }

    /// Snapshot of the listings entry.
    pub fn listings_state(&self) -> QueryState<Vec<ListingEntry>> {
        self.listings.state()
    }

    /// Runs a caller-scoped query, or reports `Disabled` without identity.
    async fn gated<T, F>(&self, cell: &QueryCell<T>, fetcher: F) -> QueryState<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> BoxFuture<'static, Result<T, QueryError>>,
    {
        if !self.is_authenticated() {
            return QueryState::Disabled;
        }
        cell.fetch(fetcher).await.into()
    }

    fn gated_state<T>(&self, cell: &QueryCell<T>) -> QueryState<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if !self.is_authenticated() {
            return QueryState::Disabled;
        }
        cell.state()
    }

    /// The caller's profile; `Success(None)` means no profile was set up yet.
    pub async fn caller_profile(&self) -> QueryState<Option<UserProfile>> {
        let backend = Arc::clone(&self.backend);
        self.gated(&self.profile, move || {
            async move { backend.get_caller_user_profile().await.map_err(QueryError::from) }.boxed()
        })
        .await
    }

    pub fn caller_profile_state(&self) -> QueryState<Option<UserProfile>> {
        self.gated_state(&self.profile)
    }

    /// Three-way view of the cached profile entry.
    pub fn profile_state(&self) -> ProfileState {
        ProfileState::from(&self.caller_profile_state())
    }

    pub async fn caller_role(&self) -> QueryState<UserRole> {
        let backend = Arc::clone(&self.backend);
        self.gated(&self.role, move || {
            async move { backend.get_caller_user_role().await.map_err(QueryError::from) }.boxed()
        })
        .await
    }

    pub fn caller_role_state(&self) -> QueryState<UserRole> {
        self.gated_state(&self.role)
    }

    pub async fn is_admin(&self) -> QueryState<bool> {
        let backend = Arc::clone(&self.backend);
        self.gated(&self.admin, move || {
            async move { backend.is_caller_admin().await.map_err(QueryError::from) }.boxed()
        })
        .await
    }

    pub fn is_admin_state(&self) -> QueryState<bool> {
        self.gated_state(&self.admin)
    }

    // -----------------------------------------------------------------------
    // Uncached reads
    // -----------------------------------------------------------------------

    pub async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, QueryError> {
        Ok(self.backend.get_listing(id).await?)
    }

    pub async fn listings_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<ListingEntry>, QueryError> {
        Ok(self.backend.get_listings_by_category(category).await?)
    }

    /// Server-side search; the directory filters cached listings instead.
    pub async fn search_listings(&self, term: &str) -> Result<Vec<ListingEntry>, QueryError> {
        Ok(self.backend.search_listings(term).await?)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Adds a listing and invalidates `listings` once the backend confirmed it.
    pub async fn add_listing(&self, listing: &Listing) -> Result<ListingId, QueryError> {
        match self.backend.add_listing(listing).await {
            Ok(id) => {
                info!(id = %id, name = %listing.name, "listing added");
                self.listings.invalidate();
                Ok(id)
            }
            Err(e) => {
                warn!(name = %listing.name, error = %e, "add listing failed");
                Err(e.into())
            }
        }
    }

    pub async fn update_listing(
        &self,
        id: &ListingId,
        listing: &Listing,
    ) -> Result<(), QueryError> {
        match self.backend.update_listing(id, listing).await {
            Ok(()) => {
                info!(id = %id, "listing updated");
                self.listings.invalidate();
                Ok(())
            }
            Err(e) => {
                warn!(id = %id, error = %e, "update listing failed");
                Err(e.into())
            }
        }
    }

    pub async fn delete_listing(&self, id: &ListingId) -> Result<(), QueryError> {
        match self.backend.delete_listing(id).await {
            Ok(()) => {
                info!(id = %id, "listing deleted");
                self.listings.invalidate();
                Ok(())
            }
            Err(e) => {
                warn!(id = %id, error = %e, "delete listing failed");
                Err(e.into())
            }
        }
    }

    /// Saves the caller's profile and invalidates `callerProfile`.
    pub async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), QueryError> {
        if !self.is_authenticated() {
            return Err(QueryError::NotAuthenticated);
        }
        match self.backend.save_caller_user_profile(profile).await {
            Ok(()) => {
                info!(name = %profile.name, "profile saved");
                self.profile.invalidate();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "save profile failed");
                Err(e.into())
            }
        }
    }

    /// Assigns a role; invalidates the caller's role entries when `user` is the caller.
    pub async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), QueryError> {
        self.backend.assign_caller_user_role(user, role).await?;
        info!(user = %user, ?role, "role assigned");
        if self.identity().as_ref() == Some(user) {
            self.role.invalidate();
            self.admin.invalidate();
        }
        Ok(())
    }
}
