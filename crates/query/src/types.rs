//! Query keys and observable query states.

use std::fmt;

use apkstore_protocol::UserProfile;

use crate::error::QueryError;

/// Logical name of one cached remote query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Listings,
    CallerProfile,
    CallerRole,
    IsAdmin,
}

impl QueryKey {
    pub const ALL: [QueryKey; 4] = [
        QueryKey::Listings,
        QueryKey::CallerProfile,
        QueryKey::CallerRole,
        QueryKey::IsAdmin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryKey::Listings => "listings",
            QueryKey::CallerProfile => "callerProfile",
            QueryKey::CallerRole => "callerRole",
            QueryKey::IsAdmin => "isAdmin",
        }
    }

    /// Whether the query only runs for an authenticated identity.
    pub fn requires_identity(self) -> bool {
        !matches!(self, QueryKey::Listings)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse status of a cache entry, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Identity-scoped query with no identity present.
    Disabled,
    /// Never fetched, or invalidated since the last fetch.
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of a query as seen by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Disabled,
    Idle,
    Loading,
    Success(T),
    Error(QueryError),
}

impl<T> QueryState<T> {
    pub fn status(&self) -> QueryStatus {
        match self {
            QueryState::Disabled => QueryStatus::Disabled,
            QueryState::Idle => QueryStatus::Idle,
            QueryState::Loading => QueryStatus::Loading,
            QueryState::Success(_) => QueryStatus::Success,
            QueryState::Error(_) => QueryStatus::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    /// Whether a fetch has completed, successfully or not.
    pub fn is_fetched(&self) -> bool {
        matches!(self, QueryState::Success(_) | QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Disabled => QueryState::Disabled,
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(value) => QueryState::Success(f(value)),
            QueryState::Error(err) => QueryState::Error(err),
        }
    }
}

impl<T> From<Result<T, QueryError>> for QueryState<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(value) => QueryState::Success(value),
            Err(err) => QueryState::Error(err),
        }
    }
}

/// What is known about the caller's profile.
///
/// "Not created yet" is distinct from "not loaded yet": only the former
/// should trigger profile setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileState {
    /// Not loaded, loading, disabled, or failed.
    Unknown,
    /// Loaded; the caller has no profile.
    Absent,
    Present(UserProfile),
}

impl From<&QueryState<Option<UserProfile>>> for ProfileState {
    fn from(state: &QueryState<Option<UserProfile>>) -> Self {
        match state {
            QueryState::Success(Some(profile)) => ProfileState::Present(profile.clone()),
            QueryState::Success(None) => ProfileState::Absent,
            _ => ProfileState::Unknown,
        }
    }
}
