//! Submitting the upload form through the store client.

use apkstore_protocol::ListingId;
use apkstore_query::StoreClient;
use tracing::{info, warn};

use crate::form::{FormError, UploadForm};

/// Shown instead of the raw error when the backend rejected an anonymous caller.
pub const UNAUTHORIZED_MESSAGE: &str = "You must be logged in to submit APK listings.";

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend stored the listing. The form was reset.
    Added { id: ListingId, name: String },
    /// Local validation failed; nothing was sent.
    Invalid(FormError),
    /// The backend rejected the listing. The form keeps its contents.
    Failed { message: String },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Added { .. })
    }

    /// User-facing notification text.
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Added { name, .. } => format!("\"{name}\" has been added successfully!"),
            SubmitOutcome::Invalid(err) => err.to_string(),
            SubmitOutcome::Failed { message } => message.clone(),
        }
    }
}

/// Maps a backend failure to the text shown to the user.
pub fn failure_message(error: &str) -> String {
    if error.contains("Unauthorized") {
        UNAUTHORIZED_MESSAGE.to_string()
    } else {
        error.to_string()
    }
}

impl UploadForm {
    /// Validates and submits the form.
    ///
    /// On success the form is reset and the cached listings are invalidated
    /// by the client. On any failure the form is left as it was.
    pub async fn submit(&mut self, client: &StoreClient) -> SubmitOutcome {
        let listing = match self.validate() {
            Ok(listing) => listing,
            Err(err) => {
                warn!(error = %err, "upload form rejected");
                return SubmitOutcome::Invalid(err);
            }
        };

        match client.add_listing(&listing).await {
            Ok(id) => {
                info!(id = %id, name = %listing.name, "listing submitted");
                self.reset();
                SubmitOutcome::Added { id, name: listing.name }
            }
            Err(err) => SubmitOutcome::Failed {
                message: failure_message(&err.to_string()),
            },
        }
    }
}
