//! Data model for the APK store: listings, categories, caller profiles and roles.
//!
//! Every type here travels over the wire as camelCase JSON. Listings are
//! exchanged as `(id, listing)` pairs; the id is always assigned by the
//! backend.

pub mod display;
pub mod types;

pub use display::{BYTES_PER_MB, format_file_size, placeholder_icon_url};
pub use types::{
    Category, Listing, ListingEntry, ListingId, ParseCategoryError, Principal, UserProfile,
    UserRole,
};
