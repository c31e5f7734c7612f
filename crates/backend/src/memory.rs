//! In-memory backend.
//!
//! Process-local [`RemoteData`] implementation that applies the same
//! authorization rules as the hosted service:
//!
//! - anonymous callers are guests and may only read listings
//! - authenticated callers are users unless granted another role
//! - listing mutations need a user or admin
//! - role assignment needs an admin
//!
//! Every call is counted per operation so callers can observe how often the
//! backend was actually hit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use apkstore_protocol::{
    Category, Listing, ListingEntry, ListingId, Principal, UserProfile, UserRole,
};
use tracing::debug;

use crate::error::BackendError;
use crate::remote::{BackendFuture, RemoteData};

#[derive(Debug, Default)]
struct Inner {
    listings: Vec<ListingEntry>,
    next_id: u64,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
    caller: Option<Principal>,
    calls: HashMap<&'static str, usize>,
    failure: Option<String>,
}

impl Inner {
    fn role_of(&self, principal: Option<&Principal>) -> UserRole {
        match principal {
            None => UserRole::Guest,
            Some(p) => self.roles.get(p).copied().unwrap_or(UserRole::User),
        }
    }

    fn caller_role(&self) -> UserRole {
        self.role_of(self.caller.as_ref())
    }

    fn require_user(&self, action: &str) -> Result<(), BackendError> {
        match self.caller_role() {
            UserRole::Admin | UserRole::User => Ok(()),
            UserRole::Guest => Err(BackendError::Unauthorized(format!(
                "Only users can {action}"
            ))),
        }
    }

    fn require_caller(&self) -> Result<&Principal, BackendError> {
        self.caller
            .as_ref()
            .ok_or_else(|| BackendError::Unauthorized("anonymous caller".into()))
    }

    fn position(&self, id: &ListingId) -> Result<usize, BackendError> {
        self.listings
            .iter()
            .position(|(key, _)| key == id)
            .ok_or_else(|| BackendError::NotFound(format!("listing {id}")))
    }
}

/// [`RemoteData`] implementation backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    /// Creates an empty backend with an anonymous caller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency` before it touches the store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sets the identity subsequent calls are made as.
    pub fn set_caller(&self, caller: Option<Principal>) {
        self.lock().caller = caller;
    }

    /// Grants `role` to `principal` without an authorization check.
    pub fn grant(&self, principal: Principal, role: UserRole) {
        self.lock().roles.insert(principal, role);
    }

    /// Makes every subsequent call fail with `message` until cleared with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        self.lock().failure = message.map(str::to_string);
    }

    /// Inserts a listing directly, bypassing authorization.
    pub fn seed(&self, listing: Listing) -> ListingId {
        let mut inner = self.lock();
        insert(&mut inner, listing)
    }

    /// Number of times `operation` (e.g. `"getAllListings"`) was called.
    pub fn calls(&self, operation: &str) -> usize {
        self.lock().calls.get(operation).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned store only means a test thread panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Waits out the configured latency, then runs `op` against the store.
    fn call<'a, T, F>(&'a self, operation: &'static str, op: F) -> BackendFuture<'a, T>
    where
        T: Send + 'a,
        F: FnOnce(&mut Inner) -> Result<T, BackendError> + Send + 'a,
    {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let mut inner = self.lock();
            *inner.calls.entry(operation).or_insert(0) += 1;
            if let Some(message) = &inner.failure {
                return Err(BackendError::Remote(message.clone()));
            }
            op(&mut inner)
        })
    }
}

fn insert(inner: &mut Inner, listing: Listing) -> ListingId {
    inner.next_id += 1;
    let id = ListingId::new(inner.next_id.to_string());
    inner.listings.push((id.clone(), listing));
    id
}

impl RemoteData for InMemoryBackend {
    fn add_listing(&self, listing: &Listing) -> BackendFuture<'_, ListingId> {
        let listing = listing.clone();
        self.call("addListing", move |inner| {
            inner.require_user("add listings")?;
            let id = insert(inner, listing);
            debug!(id = %id, "listing stored");
            Ok(id)
        })
    }

    fn update_listing(&self, id: &ListingId, listing: &Listing) -> BackendFuture<'_, ()> {
        let id = id.clone();
        let listing = listing.clone();
        self.call("updateListing", move |inner| {
            inner.require_user("update listings")?;
            let pos = inner.position(&id)?;
            inner.listings[pos].1 = listing;
            Ok(())
        })
    }

    fn delete_listing(&self, id: &ListingId) -> BackendFuture<'_, ()> {
        let id = id.clone();
        self.call("deleteListing", move |inner| {
            inner.require_user("delete listings")?;
            let pos = inner.position(&id)?;
            inner.listings.remove(pos);
            Ok(())
        })
    }

    fn get_listing(&self, id: &ListingId) -> BackendFuture<'_, Option<Listing>> {
        let id = id.clone();
        self.call("getListing", move |inner| {
            Ok(inner
                .listings
                .iter()
                .find(|(key, _)| *key == id)
                .map(|(_, listing)| listing.clone()))
        })
    }

    fn get_all_listings(&self) -> BackendFuture<'_, Vec<ListingEntry>> {
        self.call("getAllListings", |inner| Ok(inner.listings.clone()))
    }

    fn get_listings_by_category(&self, category: Category) -> BackendFuture<'_, Vec<ListingEntry>> {
        self.call("getListingsByCategory", move |inner| {
            Ok(inner
                .listings
                .iter()
                .filter(|(_, listing)| listing.category == category)
                .cloned()
                .collect())
        })
    }

    fn search_listings(&self, term: &str) -> BackendFuture<'_, Vec<ListingEntry>> {
        let needle = term.to_lowercase();
        self.call("searchListings", move |inner| {
            Ok(inner
                .listings
                .iter()
                .filter(|(_, listing)| {
                    listing.name.to_lowercase().contains(&needle)
                        || listing.description.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect())
        })
    }

    fn get_caller_user_profile(&self) -> BackendFuture<'_, Option<UserProfile>> {
        self.call("getCallerUserProfile", |inner| {
            let caller = inner.require_caller()?;
            Ok(inner.profiles.get(caller).cloned())
        })
    }

    fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendFuture<'_, ()> {
        let profile = profile.clone();
        self.call("saveCallerUserProfile", move |inner| {
            let caller = inner.require_caller()?.clone();
            inner.profiles.insert(caller, profile);
            Ok(())
        })
    }

    fn get_caller_user_role(&self) -> BackendFuture<'_, UserRole> {
        self.call("getCallerUserRole", |inner| Ok(inner.caller_role()))
    }

    fn is_caller_admin(&self) -> BackendFuture<'_, bool> {
        self.call("isCallerAdmin", |inner| Ok(inner.caller_role().is_admin()))
    }

    fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> BackendFuture<'_, ()> {
        let user = user.clone();
        self.call("assignCallerUserRole", move |inner| {
            if !inner.caller_role().is_admin() {
                return Err(BackendError::Unauthorized(
                    "Only admins can assign user roles".into(),
                ));
            }
            inner.roles.insert(user, role);
            Ok(())
        })
    }
}
