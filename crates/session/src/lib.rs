//! Session state for the storefront.
//!
//! Ties an [`apkstore_backend::IdentityProvider`] to a
//! [`apkstore_query::StoreClient`]: a successful login sets the identity that
//! enables caller-scoped queries, a logout drops it and clears the cache.

pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{LoginStatus, Session, RELOGIN_DELAY};
