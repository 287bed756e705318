//! Charset lookup and text encoding for multipart bodies.
//!
//! Labels are resolved through `encoding_rs` so the accepted names match the
//! WHATWG encoding standard (`UTF-8`, `utf8`, `ISO-8859-1`, `Shift_JIS`, ...).

use std::borrow::Cow;

use encoding_rs::Encoding;

use super::MultipartError;

/// A resolved text encoding used for field values and part headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    /// Resolve a charset label, ignoring surrounding whitespace and case.
    ///
    /// Lookup follows the WHATWG label table, so `ISO-8859-1` and `latin1`
    /// resolve to `windows-1252`, where `€` encodes as 0x80 instead of being
    /// unmappable. Encodings that `encoding_rs` cannot write (`UTF-16LE`,
    /// `UTF-16BE` and `replacement`, which encode as UTF-8) are rejected as
    /// unknown.
    pub fn for_label(label: &str) -> Result<Self, MultipartError> {
        let normalized = label.trim().to_ascii_lowercase();
        Encoding::for_label(normalized.as_bytes())
            .filter(|encoding| encoding.output_encoding() == *encoding)
            .map(|encoding| Self { encoding })
            .ok_or_else(|| MultipartError::UnknownCharset(label.to_owned()))
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encode `text`, rejecting characters the charset cannot represent.
    ///
    /// `field` names the part being encoded and is only used for the error.
    pub(crate) fn encode<'a>(&self, text: &'a str, field: &str) -> Result<Cow<'a, [u8]>, MultipartError> {
        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            return Err(MultipartError::Unmappable {
                field: field.to_owned(),
                charset: self.name(),
            });
        }
        Ok(bytes)
    }

    /// Decode `bytes` leniently, replacing malformed sequences.
    pub(crate) fn decode_lossy<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, _, _) = self.encoding.decode(bytes);
        text
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}
