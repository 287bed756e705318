//! HTTP delivery filter.
//!
//! This module defines [`HttpDeliveryFilter`], a [`ReportFilter`] that
//! encodes a report batch as one `multipart/form-data` body and posts it to a
//! configured endpoint. The call blocks the current thread until the
//! exchange completes; callers wanting concurrency run it on their own
//! worker threads.
//!
//! # Response Semantics
//!
//! - **200**: Success - the completion callback receives the batch.
//! - **Any other status**: Failure - the response text (or `(unknown)` if it
//!   cannot be read) is embedded in the error.
//! - **Network errors**: Failure.
//!
//! There is no retry. Every failure returns the whole batch inside
//! [`FilteringFailed`](crate::filter::FilteringFailed).
//!
//! [`ReportFilter`]: crate::filter::ReportFilter

mod config;
mod delivery;
mod response;
mod transport;


pub use config::{
    AuthConfig, DEFAULT_CHARSET, DEFAULT_CONNECT_TIMEOUT, DEFAULT_FILE_EXTENSION,
    DEFAULT_FILE_PREFIX, DEFAULT_USER_AGENT, DEFAULT_WRITE_TIMEOUT, HttpFilterConfig,
};
pub use delivery::{DeliveryError, HTTP_OK, HttpDeliveryFilter};
pub use response::UNKNOWN_RESPONSE;
pub use transport::{Connection, DeliveryRequest, MAX_RESPONSE_BYTES, Transport, UreqTransport};
