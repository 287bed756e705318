//! Configuration structures consumed by the HTTP delivery filter.
//!
//! `HttpFilterBuilder` constructs these values before passing them to
//! [`HttpDeliveryFilter`](super::HttpDeliveryFilter) for runtime use.

use std::collections::HashMap;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use indexmap::IndexMap;

use crate::multipart::{CONTENT_TYPE, Charset};

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write/request timeout applied to HTTP requests.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default charset label for text fields.
pub const DEFAULT_CHARSET: &str = "UTF-8";
/// Default prefix of generated report file names.
pub const DEFAULT_FILE_PREFIX: &str = "crash";
/// Default extension of generated report file names.
pub const DEFAULT_FILE_EXTENSION: &str = "json";
/// `User-Agent` sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = "KSCrashReporter";

/// Authentication configuration for HTTP requests.
#[derive(Clone, Debug, Default)]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,
    /// HTTP Basic authentication with username and password.
    Basic { username: String, password: String },
    /// Bearer token authentication.
    Bearer { token: String },
}

impl AuthConfig {
    /// Value of the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Basic { username, password } => {
                let credentials = format!("{username}:{password}");
                Some(format!("Basic {}", BASE64_STANDARD.encode(credentials)))
            }
            Self::Bearer { token } => Some(format!("Bearer {token}")),
        }
    }
}

/// Configuration object describing how an
/// [`HttpDeliveryFilter`](super::HttpDeliveryFilter) posts reports.
#[derive(Clone, Debug)]
pub struct HttpFilterConfig {
    /// Absolute URL reports are posted to.
    pub url: String,
    /// Charset for text fields and part headers.
    pub charset: Charset,
    /// Prefix of generated report file names.
    pub file_prefix: String,
    /// Extension of generated report file names.
    pub file_extension: String,
    /// Request headers; names are unique ignoring ASCII case.
    pub headers: HashMap<String, String>,
    /// Auxiliary text fields, written before the reports.
    pub string_fields: IndexMap<String, String>,
    /// Auxiliary binary fields, written after the text fields.
    pub data_fields: IndexMap<String, Vec<u8>>,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for the whole request.
    pub write_timeout: Duration,
}

impl HttpFilterConfig {
    /// Create a configuration with the default headers and timeouts.
    pub fn new(
        url: impl Into<String>,
        file_prefix: impl Into<String>,
        file_extension: impl Into<String>,
        charset: Charset,
    ) -> Self {
        let mut config = Self {
            url: url.into(),
            charset,
            file_prefix: file_prefix.into(),
            file_extension: file_extension.into(),
            headers: HashMap::new(),
            string_fields: IndexMap::new(),
            data_fields: IndexMap::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        };
        config.set_header("User-Agent", DEFAULT_USER_AGENT);
        config.set_header("Content-Type", CONTENT_TYPE);
        config
    }

    /// Set a header, replacing any existing header with the same name.
    ///
    /// Header names are case-insensitive on the wire, so `content-type`
    /// replaces a previously set `Content-Type`.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Look up a header ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Field name of the report at 0-based `index` within its batch.
    pub fn report_file_name(&self, index: usize) -> String {
        format!("{}-{}.{}", self.file_prefix, index + 1, self.file_extension)
    }
}
