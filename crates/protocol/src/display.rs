//! Display helpers for listing cards.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes in one megabyte, as sizes are entered and shown.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Characters left unescaped in a URI component (same set as JS `encodeURIComponent`).
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const PLACEHOLDER_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Formats a byte count as megabytes, switching to gigabytes from 1000 MB.
pub fn format_file_size(bytes: u64) -> String {
    let mb = bytes as f64 / BYTES_PER_MB;
    if mb >= 1000.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else {
        format!("{mb:.1} MB")
    }
}

/// Generated avatar URL for listings without an icon.
pub fn placeholder_icon_url(name: &str) -> String {
    let encoded = utf8_percent_encode(name, URI_COMPONENT);
    format!(
        "{PLACEHOLDER_BASE_URL}?name={encoded}&background=0a0a0a&color=00ff41&size=64&bold=true"
    )
}
