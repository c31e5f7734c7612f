//! Query cache over the APK store backend.
//!
//! Every logical query (`listings`, `callerProfile`, `callerRole`,
//! `isAdmin`) owns one [`QueryCell`]. A cell runs at most one fetch at a
//! time; readers arriving while a fetch is in flight share its outcome.
//! Results stay cached until a mutation that can affect them succeeds, or
//! until they are invalidated explicitly.

pub mod cell;
pub mod client;
pub mod error;
pub mod types;

pub use cell::QueryCell;
pub use client::StoreClient;
pub use error::QueryError;
pub use types::{ProfileState, QueryKey, QueryState, QueryStatus};
