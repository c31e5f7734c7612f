//! Error types for backend operations.

/// Errors produced by a [`RemoteData`](crate::RemoteData) implementation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Remote(String),

    #[error("invalid API token")]
    InvalidToken,
}

impl BackendError {
    /// Whether the backend rejected the caller's authorization.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            BackendError::Unauthorized(_) => true,
            BackendError::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}
