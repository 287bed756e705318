//! Builder for [`HttpDeliveryFilter`](crate::http_filter::HttpDeliveryFilter).
//!
//! Exposes the destination URL, report file naming, charset, headers,
//! auxiliary fields, authentication and timeouts.

use std::time::Duration;

use indexmap::IndexMap;

use crate::{
    http_filter::{
        AuthConfig, DEFAULT_CHARSET, DEFAULT_FILE_EXTENSION, DEFAULT_FILE_PREFIX,
        HttpDeliveryFilter, HttpFilterConfig, Transport,
    },
    multipart::{Charset, FieldValue},
};

use super::{FilterBuildError, FilterBuilderTrait};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(FilterBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`HttpDeliveryFilter`] instances.
#[derive(Clone, Debug, Default)]
pub struct HttpFilterBuilder {
    url: Option<String>,
    file_prefix: Option<String>,
    file_extension: Option<String>,
    charset: Option<String>,
    auth: Option<AuthConfig>,
    headers: IndexMap<String, String>,
    string_fields: IndexMap<String, String>,
    data_fields: IndexMap<String, Vec<u8>>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
}

impl HttpFilterBuilder {
    /// Create a new builder with no URL configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target URL for HTTP requests (required).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the prefix of generated report file names. Defaults to `crash`.
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = Some(prefix.into());
        self
    }

    /// Set the extension of generated report file names. Defaults to `json`.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Set the charset used for text fields. Defaults to `UTF-8`.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Configure HTTP Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Configure Bearer token authentication.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthConfig::Bearer {
            token: token.into(),
        });
        self
    }

    /// Replace the custom HTTP headers.
    ///
    /// Names that differ only in ASCII case collapse to the last one given.
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.clear();
        headers
            .into_iter()
            .fold(self, |builder, (key, value)| builder.with_header(key, value))
    }

    /// Add a single custom HTTP header, replacing any header whose name
    /// matches ignoring ASCII case.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
        self
    }

    /// Add an auxiliary text or binary field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        match value.into() {
            FieldValue::Text(text) => {
                self.string_fields.insert(name.into(), text);
            }
            FieldValue::Data(data) => {
                self.data_fields.insert(name.into(), data);
            }
        }
        self
    }

    /// Add an auxiliary binary field, sent as a file part.
    pub fn with_data_field(self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.with_field(name, FieldValue::Data(data.into()))
    }

    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the request timeout in milliseconds."]
        with_write_timeout_ms,
        write_timeout_ms,
        u64
    );

    fn validate(&self) -> Result<(), FilterBuildError> {
        self.validate_url()?;
        self.validate_timeouts()?;
        Ok(())
    }

    fn validate_url(&self) -> Result<(), FilterBuildError> {
        let url = match &self.url {
            None => {
                return Err(FilterBuildError::InvalidConfig(
                    "HTTP filter requires a URL".into(),
                ));
            }
            Some(url) if url.trim().is_empty() => {
                return Err(FilterBuildError::InvalidConfig(
                    "URL must not be empty".into(),
                ));
            }
            Some(url) => url.trim(),
        };
        let rest = ["http://", "https://"].iter().find_map(|scheme| {
            url.get(..scheme.len())
                .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
                .map(|_| &url[scheme.len()..])
        });
        match rest {
            Some(rest) if !rest.is_empty() => Ok(()),
            _ => Err(FilterBuildError::InvalidConfig(format!(
                "URL must be an absolute http(s) URL: {url}"
            ))),
        }
    }

    fn validate_timeouts(&self) -> Result<(), FilterBuildError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        Ok(())
    }

    fn resolve_charset(&self) -> Result<Charset, FilterBuildError> {
        let label = self.charset.as_deref().unwrap_or(DEFAULT_CHARSET);
        Charset::for_label(label).map_err(|err| FilterBuildError::InvalidConfig(err.to_string()))
    }

    /// Validate the settings and produce a configuration object.
    pub fn build_config(&self) -> Result<HttpFilterConfig, FilterBuildError> {
        self.validate()?;
        let charset = self.resolve_charset()?;

        let mut config = HttpFilterConfig::new(
            self.url.as_deref().unwrap_or_default().trim(),
            self.file_prefix.as_deref().unwrap_or(DEFAULT_FILE_PREFIX),
            self.file_extension
                .as_deref()
                .unwrap_or(DEFAULT_FILE_EXTENSION),
            charset,
        );
        if let Some(value) = self.auth.as_ref().and_then(AuthConfig::header_value) {
            config.set_header("Authorization", value);
        }
        for (key, value) in &self.headers {
            config.set_header(key.as_str(), value.as_str());
        }
        config.string_fields = self.string_fields.clone();
        config.data_fields = self.data_fields.clone();
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Build a filter over a custom transport instead of `ureq`.
    pub fn build_with_transport(
        &self,
        transport: impl Transport + 'static,
    ) -> Result<HttpDeliveryFilter, FilterBuildError> {
        Ok(HttpDeliveryFilter::with_transport(
            self.build_config()?,
            transport,
        ))
    }
}

impl FilterBuilderTrait for HttpFilterBuilder {
    type Filter = HttpDeliveryFilter;

    fn build_inner(&self) -> Result<Self::Filter, FilterBuildError> {
        let config = self.build_config()?;
        HttpDeliveryFilter::with_config(config)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::multipart::CONTENT_TYPE;

    fn builder() -> HttpFilterBuilder {
        HttpFilterBuilder::new().with_url("https://reports.example.com/upload")
    }

    #[rstest]
    fn defaults_fill_unset_values() {
        let config = builder().build_config().expect("valid");
        assert_eq!(config.url, "https://reports.example.com/upload");
        assert_eq!(config.file_prefix, "crash");
        assert_eq!(config.file_extension, "json");
        assert_eq!(config.charset.name(), "UTF-8");
        assert_eq!(config.header("User-Agent"), Some("KSCrashReporter"));
        assert_eq!(config.header("Content-Type"), Some(CONTENT_TYPE));
        assert_eq!(config.connect_timeout, crate::http_filter::DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.write_timeout, crate::http_filter::DEFAULT_WRITE_TIMEOUT);
    }

    #[rstest]
    fn explicit_values_are_applied() {
        let config = builder()
            .with_file_prefix("report")
            .with_file_extension("dat")
            .with_charset("latin1")
            .with_header("User-Agent", "custom-agent")
            .with_field("app", "demo")
            .with_field("blob", b"\x00\x01")
            .with_connect_timeout_ms(250)
            .with_write_timeout_ms(1_500)
            .build_config()
            .expect("valid");
        assert_eq!(config.report_file_name(0), "report-1.dat");
        assert_eq!(config.charset.name(), "windows-1252");
        assert_eq!(config.header("user-agent"), Some("custom-agent"));
        assert_eq!(config.string_fields.get("app").map(String::as_str), Some("demo"));
        assert_eq!(config.data_fields.get("blob"), Some(&vec![0u8, 1]));
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.write_timeout, Duration::from_millis(1_500));
    }

    #[rstest]
    fn explicit_authorization_header_beats_auth_config() {
        let config = builder()
            .with_basic_auth("user", "pass")
            .build_config()
            .expect("valid");
        assert_eq!(config.header("Authorization"), Some("Basic dXNlcjpwYXNz"));

        let config = builder()
            .with_bearer_token("tok")
            .with_header("authorization", "Custom abc")
            .build_config()
            .expect("valid");
        assert_eq!(config.header("Authorization"), Some("Custom abc"));
        assert_eq!(config.headers.len(), 3);
    }

    #[rstest]
    #[case(None, "requires a URL")]
    #[case(Some("   "), "must not be empty")]
    #[case(Some("reports.example.com/upload"), "absolute http(s) URL")]
    #[case(Some("ftp://reports.example.com"), "absolute http(s) URL")]
    #[case(Some("https://"), "absolute http(s) URL")]
    fn rejects_bad_urls(#[case] url: Option<&str>, #[case] fragment: &str) {
        let mut builder = HttpFilterBuilder::new();
        if let Some(url) = url {
            builder = builder.with_url(url);
        }
        let err = builder.build_config().expect_err("invalid url");
        assert!(matches!(err, FilterBuildError::InvalidConfig(_)));
        assert!(err.to_string().contains(fragment), "{err}");
    }

    #[rstest]
    fn accepts_uppercase_scheme() {
        assert!(
            HttpFilterBuilder::new()
                .with_url("HTTP://localhost:8080/")
                .build_config()
                .is_ok()
        );
    }

    #[rstest]
    fn rejects_zero_timeouts() {
        let err = builder()
            .with_connect_timeout_ms(0)
            .build_config()
            .expect_err("zero timeout");
        assert!(err.to_string().contains("connect_timeout_ms must be greater than zero"));
        let err = builder()
            .with_write_timeout_ms(0)
            .build_config()
            .expect_err("zero timeout");
        assert!(err.to_string().contains("write_timeout_ms"));
    }

    #[rstest]
    fn header_names_differing_in_case_keep_the_last_value() {
        let config = builder()
            .with_header("X-Key", "a")
            .with_header("x-key", "b")
            .with_header("X-KEY", "c")
            .build_config()
            .expect("valid");
        assert_eq!(config.header("x-key"), Some("c"));
        assert_eq!(config.headers.len(), 3);

        let config = builder()
            .with_header("X-Stale", "gone")
            .with_headers([("X-Key", "a"), ("x-key", "b")])
            .build_config()
            .expect("valid");
        assert_eq!(config.header("X-Key"), Some("b"));
        assert_eq!(config.header("X-Stale"), None);
    }

    #[rstest]
    fn data_fields_are_binary_parts() {
        let config = builder()
            .with_field("blob", "text first")
            .with_data_field("blob", "raw".to_owned())
            .with_data_field("dump", vec![0xffu8, 0x00])
            .build_config()
            .expect("valid");
        assert_eq!(config.string_fields.get("blob").map(String::as_str), Some("text first"));
        assert_eq!(config.data_fields.get("blob"), Some(&b"raw".to_vec()));
        assert_eq!(config.data_fields.get("dump"), Some(&vec![0xffu8, 0x00]));
    }

    #[rstest]
    fn rejects_charsets_without_a_writer() {
        let err = builder()
            .with_charset("UTF-16")
            .build_config()
            .expect_err("utf-16 cannot be written");
        assert!(err.to_string().contains("unknown charset"), "{err}");
    }

    #[rstest]
    fn rejects_unknown_charset() {
        let err = builder()
            .with_charset("no-such-charset")
            .build_config()
            .expect_err("bad charset");
        assert!(err.to_string().contains("unknown charset"));
    }
}
