//! Error type shared by queries and mutations.

use apkstore_backend::BackendError;

/// Failure of a query or mutation.
///
/// Cloneable so one failed fetch can be handed to every coalesced reader.
/// The display form is the backend's own message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{message}")]
    Backend { message: String, unauthorized: bool },

    #[error("no authenticated identity")]
    NotAuthenticated,
}

impl QueryError {
    pub fn is_unauthorized(&self) -> bool {
        match self {
            QueryError::Backend { unauthorized, .. } => *unauthorized,
            QueryError::NotAuthenticated => true,
        }
    }
}

impl From<BackendError> for QueryError {
    fn from(err: BackendError) -> Self {
        QueryError::Backend {
            unauthorized: err.is_unauthorized(),
            message: err.to_string(),
        }
    }
}
