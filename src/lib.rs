//! Crash report delivery over HTTP.
//!
//! The crate provides the [`ReportFilter`] contract shared by report pipeline
//! stages, a [`MultipartEncoder`] for `multipart/form-data` bodies, and
//! [`HttpDeliveryFilter`], which posts a whole batch of reports in one request.
//!
//! ```no_run
//! use crash_delivery::{FilterBuilderTrait, HttpFilterBuilder, ReportFilter};
//!
//! let filter = HttpFilterBuilder::new()
//!     .with_url("https://reports.example.com/upload")
//!     .with_file_prefix("report")
//!     .with_file_extension("json")
//!     .with_field("app", "demo")
//!     .build()?;
//!
//! let reports = vec![br#"{"crash":1}"#.to_vec()];
//! if let Err(failed) = filter.filter_reports(reports, Box::new(|sent| {
//!     println!("delivered {} report(s)", sent.len());
//! })) {
//!     eprintln!("keeping {} report(s) for later: {failed}", failed.reports().len());
//! }
//! # Ok::<(), crash_delivery::FilterBuildError>(())
//! ```

pub mod builders;
pub mod file_config;
pub mod filter;
pub mod http_filter;
pub mod multipart;

pub use builders::{FilterBuildError, FilterBuilderTrait, HttpFilterBuilder};
pub use filter::{
    BoxedCause, CompletionCallback, FilteringFailed, Report, ReportBatch, ReportFilter,
};
pub use http_filter::{
    AuthConfig, Connection, DeliveryError, DeliveryRequest, HttpDeliveryFilter, HttpFilterConfig,
    Transport, UreqTransport,
};
pub use multipart::{BOUNDARY, CONTENT_TYPE, Charset, FieldValue, MultipartEncoder, MultipartError};
