//! INI configuration for the HTTP delivery filter.
//!
//! Reads a `rust-ini` document into an [`HttpFilterBuilder`] so deployments
//! can keep the endpoint, headers and auxiliary fields out of code:
//!
//! ```ini
//! [delivery]
//! url = https://reports.example.com/upload
//! prefix = report
//! extension = dat
//! charset = UTF-8
//! connect_timeout_ms = 5000
//! write_timeout_ms = 30000
//!
//! [auth]
//! type = basic
//! username = reporter
//! password = hunter2
//!
//! [headers]
//! X-Api-Key = secret
//!
//! [fields]
//! app = demo
//! ```

use std::{fs, io::ErrorKind, path::Path};

use ini::{Ini, Properties};

use crate::builders::{FilterBuildError, HttpFilterBuilder};

const DELIVERY_SECTION: &str = "delivery";
const AUTH_SECTION: &str = "auth";
const HEADERS_SECTION: &str = "headers";
const FIELDS_SECTION: &str = "fields";

/// Load a builder from the INI file at `path`.
pub fn load_builder(path: impl AsRef<Path>) -> Result<HttpFilterBuilder, FilterBuildError> {
    let path = path.as_ref();
    let bytes = read_file_bytes(path)?;
    if bytes.is_empty() {
        return Err(FilterBuildError::InvalidConfig(format!(
            "{} is an empty file",
            path.display()
        )));
    }
    let text = String::from_utf8(bytes).map_err(|err| {
        FilterBuildError::InvalidConfig(format!("{} is not valid UTF-8: {err}", path.display()))
    })?;
    builder_from_ini_str(&text)
}

fn read_file_bytes(path: &Path) -> Result<Vec<u8>, FilterBuildError> {
    fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => {
            FilterBuildError::InvalidConfig(format!("{} doesn't exist", path.display()))
        }
        _ => FilterBuildError::Io(err),
    })
}

/// Parse INI text into a builder.
pub fn builder_from_ini_str(text: &str) -> Result<HttpFilterBuilder, FilterBuildError> {
    let ini = Ini::load_from_str(text)
        .map_err(|err| FilterBuildError::InvalidConfig(format!("invalid INI: {err}")))?;
    let delivery = ini.section(Some(DELIVERY_SECTION)).ok_or_else(|| {
        FilterBuildError::InvalidConfig(format!("missing [{DELIVERY_SECTION}] section"))
    })?;

    let mut builder = apply_delivery(HttpFilterBuilder::new(), delivery)?;
    if let Some(auth) = ini.section(Some(AUTH_SECTION)) {
        builder = apply_auth(builder, auth)?;
    }
    if let Some(headers) = ini.section(Some(HEADERS_SECTION)) {
        for (key, value) in headers.iter() {
            builder = builder.with_header(key, value);
        }
    }
    if let Some(fields) = ini.section(Some(FIELDS_SECTION)) {
        for (key, value) in fields.iter() {
            builder = builder.with_field(key, value);
        }
    }
    Ok(builder)
}

fn apply_delivery(
    mut builder: HttpFilterBuilder,
    section: &Properties,
) -> Result<HttpFilterBuilder, FilterBuildError> {
    if let Some(url) = section.get("url") {
        builder = builder.with_url(url);
    }
    if let Some(prefix) = section.get("prefix") {
        builder = builder.with_file_prefix(prefix);
    }
    if let Some(extension) = section.get("extension") {
        builder = builder.with_file_extension(extension);
    }
    if let Some(charset) = section.get("charset") {
        builder = builder.with_charset(charset);
    }
    if let Some(ms) = parse_millis(section, "connect_timeout_ms")? {
        builder = builder.with_connect_timeout_ms(ms);
    }
    if let Some(ms) = parse_millis(section, "write_timeout_ms")? {
        builder = builder.with_write_timeout_ms(ms);
    }
    Ok(builder)
}

fn apply_auth(
    builder: HttpFilterBuilder,
    section: &Properties,
) -> Result<HttpFilterBuilder, FilterBuildError> {
    let required = |key: &str| {
        section.get(key).ok_or_else(|| {
            FilterBuildError::InvalidConfig(format!("[{AUTH_SECTION}] requires {key}"))
        })
    };
    match section.get("type").map(str::to_ascii_lowercase).as_deref() {
        Some("basic") => Ok(builder.with_basic_auth(required("username")?, required("password")?)),
        Some("bearer") => Ok(builder.with_bearer_token(required("token")?)),
        Some("none") | None => Ok(builder),
        Some(other) => Err(FilterBuildError::InvalidConfig(format!(
            "unsupported auth type {other:?}"
        ))),
    }
}

fn parse_millis(section: &Properties, key: &str) -> Result<Option<u64>, FilterBuildError> {
    section
        .get(key)
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|err| {
                FilterBuildError::InvalidConfig(format!("{key} must be an integer: {err}"))
            })
        })
        .transpose()
}
