//! `multipart/form-data` encoding.
//!
//! [`MultipartEncoder`] turns named text and binary fields into a single
//! request body. The boundary is a fixed constant so that the
//! [`CONTENT_TYPE`] header value can be computed once and shared by every
//! filter instance.
//!
//! # Body layout
//!
//! ```text
//! --<BOUNDARY>\r\n
//! Content-Disposition: form-data; name="app"\r\n
//! \r\n
//! demo\r\n
//! --<BOUNDARY>\r\n
//! Content-Disposition: form-data; name="report-1.json"; filename="report-1.json"\r\n
//! Content-Type: application/octet-stream\r\n
//! \r\n
//! <bytes>\r\n
//! --<BOUNDARY>--\r\n
//! ```

mod charset;
mod encoder;
mod escape;


use thiserror::Error;

pub use charset::Charset;
pub use encoder::{DATA_CONTENT_TYPE, FieldValue, MultipartEncoder};

macro_rules! boundary {
    () => {
        "KSCrashMultipartBoundary-7d8f1a2c4b9e"
    };
}

/// Boundary separating parts in every body produced by this crate.
pub const BOUNDARY: &str = boundary!();

/// `Content-Type` header value carrying [`BOUNDARY`].
pub const CONTENT_TYPE: &str = concat!("multipart/form-data; boundary=", boundary!());

/// Errors raised while encoding a multipart body.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    /// The charset label is not known to `encoding_rs`.
    #[error("unknown charset {0:?}")]
    UnknownCharset(String),
    /// Text in the named field cannot be represented in the charset.
    #[error("field {field:?} contains characters not representable in {charset}")]
    Unmappable {
        field: String,
        charset: &'static str,
    },
}
