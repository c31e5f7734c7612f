//! Remote data and identity seams for the APK store client.
//!
//! The storefront never talks to a transport directly. Everything above this
//! crate goes through the [`RemoteData`] and [`IdentityProvider`] traits, so
//! the query cache and session logic can be exercised against
//! [`InMemoryBackend`] and swapped onto [`HttpBackend`] in the host app.
//!
//! # Backends
//!
//! - **HTTP** — JSON over a REST-style API with optional Bearer token
//! - **In-memory** — process-local store with the same authorization rules

pub mod error;
pub mod http;
pub mod identity;
pub mod memory;
pub mod remote;

// Re-export primary types for convenience.
pub use error::BackendError;
pub use http::HttpBackend;
pub use identity::{IdentityError, IdentityProvider, StaticIdentity};
pub use memory::InMemoryBackend;
pub use remote::{BackendFuture, RemoteData};
