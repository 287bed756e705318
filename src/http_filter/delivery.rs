//! Public filter type posting report batches over HTTP.

use std::io;

use log::{debug, warn};
use thiserror::Error;

use crate::{
    builders::{FilterBuildError, FilterBuilderTrait, HttpFilterBuilder},
    filter::{CompletionCallback, FilteringFailed, Report, ReportBatch, ReportFilter},
    multipart::{FieldValue, MultipartEncoder, MultipartError},
};

use super::{
    config::{AuthConfig, HttpFilterConfig},
    response::response_text,
    transport::{ConnectionGuard, DeliveryRequest, Transport, UreqTransport},
};

/// The only status treated as a successful delivery.
pub const HTTP_OK: u16 = 200;

/// Reasons a delivery attempt failed.
///
/// Carried as the cause of [`FilteringFailed`]; downcast it from
/// [`FilteringFailed::cause`] to tell the categories apart.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encoding(#[from] MultipartError),
    /// Connecting, writing or reading failed.
    #[error("HTTP transport error: {0}")]
    Io(#[from] io::Error),
    /// The server answered with something other than 200.
    #[error("Unhandled HTTP response code: {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Filter posting each batch as one `multipart/form-data` request.
///
/// Reports become file parts named `<prefix>-<n>.<extension>` with `n`
/// counting from 1 in batch order. Only a `200 OK` response counts as
/// success; every other outcome hands the batch back inside
/// [`FilteringFailed`].
///
/// Mutators take `&mut self`, so configuration cannot change while a
/// delivery borrowing `&self` is in flight.
pub struct HttpDeliveryFilter {
    config: HttpFilterConfig,
    transport: Box<dyn Transport>,
}

impl HttpDeliveryFilter {
    /// Filter posting to `url` with UTF-8 text fields.
    pub fn new(
        url: impl Into<String>,
        file_prefix: impl Into<String>,
        file_extension: impl Into<String>,
    ) -> Result<Self, FilterBuildError> {
        HttpFilterBuilder::new()
            .with_url(url)
            .with_file_prefix(file_prefix)
            .with_file_extension(file_extension)
            .build_inner()
    }

    /// Filter posting to `url` with text fields encoded in `charset`.
    pub fn with_charset(
        url: impl Into<String>,
        file_prefix: impl Into<String>,
        file_extension: impl Into<String>,
        charset: impl Into<String>,
    ) -> Result<Self, FilterBuildError> {
        HttpFilterBuilder::new()
            .with_url(url)
            .with_file_prefix(file_prefix)
            .with_file_extension(file_extension)
            .with_charset(charset)
            .build_inner()
    }

    /// Construct the filter from a configuration object using `ureq`.
    pub fn with_config(config: HttpFilterConfig) -> Result<Self, FilterBuildError> {
        let transport = UreqTransport::new(config.connect_timeout, config.write_timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Construct the filter over a custom transport.
    pub fn with_transport(config: HttpFilterConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &HttpFilterConfig {
        &self.config
    }

    /// Set a request header, overriding any earlier value including defaults.
    pub fn set_request_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.config.set_header(name, value);
    }

    /// Set an auxiliary field sent alongside the reports.
    ///
    /// Text values become plain form fields and bytes become file parts.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        match value.into() {
            FieldValue::Text(text) => {
                self.config.string_fields.insert(name.into(), text);
            }
            FieldValue::Data(data) => {
                self.config.data_fields.insert(name.into(), data);
            }
        }
    }

    /// Set an auxiliary binary field, sent as a file part.
    pub fn set_data_field(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.set_field(name, FieldValue::Data(data.into()));
    }

    /// Send `Authorization: Basic ...` with every request.
    pub fn set_basic_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        let auth = AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        };
        if let Some(value) = auth.header_value() {
            self.set_request_property("Authorization", value);
        }
    }

    /// Encode the auxiliary fields followed by one file part per report.
    pub fn body_with_reports(&self, reports: &[Report]) -> Result<Vec<u8>, MultipartError> {
        let mut body = MultipartEncoder::with_charset(self.config.charset);
        body.set_string_fields(
            self.config
                .string_fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        body.set_data_fields(
            self.config
                .data_fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_slice())),
        );
        for (index, report) in reports.iter().enumerate() {
            body.set_field(self.config.report_file_name(index), report.as_slice());
        }
        body.to_bytes()
    }

    fn send_batch(&self, reports: &[Report]) -> Result<(), DeliveryError> {
        let body = self.body_with_reports(reports)?;
        debug!(
            "HttpDeliveryFilter posting {} report(s) ({} bytes) to {}",
            reports.len(),
            body.len(),
            self.config.url
        );
        self.deliver(&body)
    }

    fn deliver(&self, body: &[u8]) -> Result<(), DeliveryError> {
        let request = DeliveryRequest {
            url: &self.config.url,
            headers: &self.config.headers,
        };
        let mut connection = ConnectionGuard::new(self.transport.open(&request)?);
        let status = connection.send(body)?;
        if status != HTTP_OK {
            let body = response_text(&mut *connection, self.config.charset);
            return Err(DeliveryError::UnexpectedStatus { status, body });
        }
        Ok(())
    }
}

impl ReportFilter for HttpDeliveryFilter {
    fn filter_reports(
        &self,
        reports: ReportBatch,
        completion: CompletionCallback,
    ) -> Result<(), FilteringFailed> {
        match self.send_batch(&reports) {
            Ok(()) => {
                debug!(
                    "HttpDeliveryFilter delivered {} report(s) to {}",
                    reports.len(),
                    self.config.url
                );
                completion(reports);
                Ok(())
            }
            Err(err) => {
                warn!(
                    "HttpDeliveryFilter failed to deliver {} report(s) to {}: {err}",
                    reports.len(),
                    self.config.url
                );
                Err(FilteringFailed::new(err, reports))
            }
        }
    }
}

impl std::fmt::Debug for HttpDeliveryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDeliveryFilter")
            .field("url", &self.config.url)
            .field("file_prefix", &self.config.file_prefix)
            .field("file_extension", &self.config.file_extension)
            .field("charset", &self.config.charset.name())
            .finish_non_exhaustive()
    }
}
