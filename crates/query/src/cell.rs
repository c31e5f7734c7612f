//! Single-flight cache entry for one query key.

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::debug;

use crate::error::QueryError;
use crate::types::{QueryKey, QueryState};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, QueryError>>>;

/// Contents of a cache entry. Always replaced as a whole.
enum Slot<T> {
    Idle,
    Pending {
        fetch: SharedFetch<T>,
        generation: u64,
    },
    Ready {
        value: T,
        fetched_at: Instant,
    },
    Failed {
        error: QueryError,
        fetched_at: Instant,
    },
}

struct Entry<T> {
    slot: Slot<T>,
    /// Bumped by every invalidation; fetches started under an older
    /// generation deliver their result but never store it.
    generation: u64,
}

/// Cache entry for one query key.
///
/// - A ready value or a failure is returned as-is until invalidated.
/// - While a fetch is pending, further readers join it instead of
///   starting another one.
/// - The lock is never held across an await point.
pub struct QueryCell<T> {
    key: QueryKey,
    entry: Mutex<Entry<T>>,
}

impl<T> QueryCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            entry: Mutex::new(Entry {
                slot: Slot::Idle,
                generation: 0,
            }),
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    fn lock(&self) -> MutexGuard<'_, Entry<T>> {
        self.entry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the cached outcome, or runs `fetcher` if nothing is cached.
    ///
    /// `fetcher` is only called when the entry is idle; readers that find a
    /// fetch in flight await that one.
    pub async fn fetch<F>(&self, fetcher: F) -> Result<T, QueryError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T, QueryError>>,
    {
        let (fetch, generation) = {
            let mut entry = self.lock();
            match &entry.slot {
                Slot::Ready { value, .. } => return Ok(value.clone()),
                Slot::Failed { error, .. } => return Err(error.clone()),
                Slot::Pending { fetch, generation } => {
                    debug!(key = %self.key, "joining in-flight fetch");
                    (fetch.clone(), *generation)
                }
                Slot::Idle => {
                    debug!(key = %self.key, "starting fetch");
                    let fetch = fetcher().shared();
                    let generation = entry.generation;
                    entry.slot = Slot::Pending {
                        fetch: fetch.clone(),
                        generation,
                    };
                    (fetch, generation)
                }
            }
        };

        let result = fetch.await;
        self.complete(generation, &result);
        result
    }

    /// Drops any cached outcome and fetches again, joining a fetch already in flight.
    pub async fn refetch<F>(&self, fetcher: F) -> Result<T, QueryError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T, QueryError>>,
    {
        {
            let mut entry = self.lock();
            if !matches!(entry.slot, Slot::Pending { .. }) {
                entry.generation += 1;
                entry.slot = Slot::Idle;
            }
        }
        self.fetch(fetcher).await
    }

    /// Stores the outcome of a fetch unless the entry was invalidated meanwhile.
    fn complete(&self, generation: u64, result: &Result<T, QueryError>) {
        let mut entry = self.lock();
        if entry.generation != generation || !matches!(entry.slot, Slot::Pending { .. }) {
            return;
        }
        let fetched_at = Instant::now();
        entry.slot = match result {
            Ok(value) => Slot::Ready {
                value: value.clone(),
                fetched_at,
            },
            Err(error) => {
                debug!(key = %self.key, error = %error, "fetch failed");
                Slot::Failed {
                    error: error.clone(),
                    fetched_at,
                }
            }
        };
    }

    /// Marks the entry stale. The next read fetches again.
    ///
    /// A fetch already in flight still resolves for its readers, but its
    /// result is not cached.
    pub fn invalidate(&self) {
        let mut entry = self.lock();
        entry.generation += 1;
        entry.slot = Slot::Idle;
        debug!(key = %self.key, "invalidated");
    }

    /// Snapshot of the entry.
    pub fn state(&self) -> QueryState<T> {
        match &self.lock().slot {
            Slot::Idle => QueryState::Idle,
            Slot::Pending { .. } => QueryState::Loading,
            Slot::Ready { value, .. } => QueryState::Success(value.clone()),
            Slot::Failed { error, .. } => QueryState::Error(error.clone()),
        }
    }

    /// When the cached outcome was stored, if there is one.
    pub fn last_fetched_at(&self) -> Option<Instant> {
        match &self.lock().slot {
            Slot::Ready { fetched_at, .. } | Slot::Failed { fetched_at, .. } => Some(*fetched_at),
            Slot::Idle | Slot::Pending { .. } => None,
        }
    }
}
