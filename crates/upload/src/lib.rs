//! Upload form for new APK listings.
//!
//! Validation is purely local: a form that fails it never reaches the
//! backend. Submission goes through [`apkstore_query::StoreClient`] so the
//! cached listings are invalidated once the backend accepted the listing.

pub mod form;
pub mod profile;
pub mod submit;

pub use form::{FormError, UploadForm, parse_file_size};
pub use profile::ProfileSetupForm;
pub use submit::{SubmitOutcome, UNAUTHORIZED_MESSAGE};
