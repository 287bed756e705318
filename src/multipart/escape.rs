//! Escaping of field names inside `Content-Disposition` quoted strings.
//!
//! Follows the HTML form-submission convention: double quotes and line
//! breaks are percent-encoded, everything else is written as-is.

use std::borrow::Cow;

use percent_encoding::percent_encode_byte;

/// Escape a field name for use between double quotes.
///
/// Only `"` and ASCII control characters (CR and LF included) are encoded;
/// non-ASCII text passes through untouched so the charset encoder sees it
/// unchanged.
pub(super) fn quote_name(name: &str) -> Cow<'_, str> {
    if !name.bytes().any(needs_escape) {
        return Cow::Borrowed(name);
    }
    let mut escaped = String::with_capacity(name.len() + 8);
    for ch in name.chars() {
        match u8::try_from(ch) {
            Ok(byte) if needs_escape(byte) => escaped.push_str(percent_encode_byte(byte)),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

fn needs_escape(byte: u8) -> bool {
    byte == b'"' || byte.is_ascii_control()
}
