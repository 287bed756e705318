//! `multipart/form-data` body builder.

use indexmap::IndexMap;

use super::{
    BOUNDARY, CONTENT_TYPE, MultipartError,
    charset::Charset,
    escape::quote_name,
};

const CRLF: &[u8] = b"\r\n";
const DASHES: &[u8] = b"--";
/// Content type advertised for binary parts.
pub const DATA_CONTENT_TYPE: &str = "application/octet-stream";

/// Value of a single form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Text encoded with the body's charset.
    Text(String),
    /// Bytes written verbatim as a file-like part.
    Data(Vec<u8>),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Data(value)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(value: &[u8]) -> Self {
        Self::Data(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for FieldValue {
    fn from(value: &[u8; N]) -> Self {
        Self::Data(value.to_vec())
    }
}

/// Builds a `multipart/form-data` payload from text and binary fields.
///
/// Text fields are written first, then binary fields, each group in
/// insertion order. Overwriting a field keeps its original position, so the
/// output is a pure function of the calls made on the encoder.
#[derive(Clone, Debug, Default)]
pub struct MultipartEncoder {
    charset: Charset,
    string_fields: IndexMap<String, String>,
    data_fields: IndexMap<String, Vec<u8>>,
}

impl MultipartEncoder {
    /// Create an encoder writing text in the charset named by `label`.
    pub fn new(label: &str) -> Result<Self, MultipartError> {
        Ok(Self::with_charset(Charset::for_label(label)?))
    }

    /// Create an encoder from an already resolved charset.
    pub fn with_charset(charset: Charset) -> Self {
        Self {
            charset,
            ..Self::default()
        }
    }

    /// Value of the `Content-Type` header matching the bodies produced here.
    pub fn content_type() -> &'static str {
        CONTENT_TYPE
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Replace every text field with `fields`.
    pub fn set_string_fields<K, V>(&mut self, fields: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.string_fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Replace every binary field with `fields`.
    pub fn set_data_fields<K, V>(&mut self, fields: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        self.data_fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Add or overwrite one field.
    ///
    /// Text values land in the text collection and bytes in the binary one;
    /// the other collection is left alone.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        match value.into() {
            FieldValue::Text(text) => {
                self.string_fields.insert(name.into(), text);
            }
            FieldValue::Data(data) => {
                self.data_fields.insert(name.into(), data);
            }
        }
    }

    /// Add or overwrite one binary field.
    pub fn set_data_field(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.data_fields.insert(name.into(), data.into());
    }

    /// Number of parts the body will contain.
    pub fn part_count(&self) -> usize {
        self.string_fields.len() + self.data_fields.len()
    }

    /// Encode all fields into a complete body.
    ///
    /// # Errors
    ///
    /// [`MultipartError::Unmappable`] if a name or text value cannot be
    /// represented in the charset. No partial body is returned.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MultipartError> {
        let mut body = Vec::with_capacity(self.estimated_len());
        for (name, value) in &self.string_fields {
            self.write_part_header(&mut body, name, false)?;
            body.extend_from_slice(&self.charset.encode(value, name)?);
            body.extend_from_slice(CRLF);
        }
        for (name, value) in &self.data_fields {
            self.write_part_header(&mut body, name, true)?;
            body.extend_from_slice(value);
            body.extend_from_slice(CRLF);
        }
        body.extend_from_slice(DASHES);
        body.extend_from_slice(BOUNDARY.as_bytes());
        body.extend_from_slice(DASHES);
        body.extend_from_slice(CRLF);
        Ok(body)
    }

    fn write_part_header(
        &self,
        body: &mut Vec<u8>,
        name: &str,
        is_data: bool,
    ) -> Result<(), MultipartError> {
        let quoted = quote_name(name);
        let header = if is_data {
            format!(
                "Content-Disposition: form-data; name=\"{quoted}\"; filename=\"{quoted}\"\r\n\
                 Content-Type: {DATA_CONTENT_TYPE}\r\n"
            )
        } else {
            format!("Content-Disposition: form-data; name=\"{quoted}\"\r\n")
        };
        body.extend_from_slice(DASHES);
        body.extend_from_slice(BOUNDARY.as_bytes());
        body.extend_from_slice(CRLF);
        body.extend_from_slice(&self.charset.encode(&header, name)?);
        body.extend_from_slice(CRLF);
        Ok(())
    }

    fn estimated_len(&self) -> usize {
        // Boundary line plus headers is well under 160 bytes for typical names.
        let overhead = 160 + BOUNDARY.len();
        let text: usize = self
            .string_fields
            .iter()
            .map(|(k, v)| overhead + k.len() + v.len())
            .sum();
        let data: usize = self
            .data_fields
            .iter()
            .map(|(k, v)| overhead + 2 * k.len() + v.len())
            .sum();
        text + data + BOUNDARY.len() + 6
    }
}
