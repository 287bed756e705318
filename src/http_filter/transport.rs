//! Transport primitives for the HTTP delivery filter.
//!
//! [`Transport`] opens one [`Connection`] per delivery. The production
//! implementation, [`UreqTransport`], keeps a `ureq::Agent` backed by the
//! platform TLS stack through `native-tls`.

use std::{
    collections::HashMap,
    io::{self, Read},
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};

use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder};

/// Upper bound on the error response body kept for failure messages.
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Everything a transport needs to open a POST connection.
#[derive(Clone, Copy, Debug)]
pub struct DeliveryRequest<'a> {
    /// Absolute destination URL.
    pub url: &'a str,
    /// Headers applied to the request.
    pub headers: &'a HashMap<String, String>,
}

/// Opens connections to a delivery endpoint.
///
/// Implementations are shared by reference across concurrent deliveries, so
/// they must be `Send + Sync`.
pub trait Transport: Send + Sync {
    /// Prepare a POST connection for `request`.
    fn open(&self, request: &DeliveryRequest<'_>) -> io::Result<Box<dyn Connection>>;
}

/// A single request/response exchange.
pub trait Connection {
    /// Write the whole body and return the response status code.
    fn send(&mut self, body: &[u8]) -> io::Result<u16>;

    /// Read the response body after [`send`](Self::send).
    fn read_response(&mut self) -> io::Result<Vec<u8>>;

    /// Release the underlying resources. Must be safe to call more than once.
    fn disconnect(&mut self);
}

/// Owns a connection and disconnects it when dropped.
pub(crate) struct ConnectionGuard {
    inner: Box<dyn Connection>,
}

impl ConnectionGuard {
    pub(crate) fn new(inner: Box<dyn Connection>) -> Self {
        Self { inner }
    }
}

impl Deref for ConnectionGuard {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ConnectionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.inner.disconnect();
    }
}

/// Blocking HTTP transport built on `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Build an agent with the given timeouts and the platform TLS connector.
    pub fn new(connect_timeout: Duration, write_timeout: Duration) -> Result<Self, native_tls::Error> {
        let tls = TlsConnector::new()?;
        let agent = AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout(write_timeout)
            .tls_connector(Arc::new(tls))
            .build();
        Ok(Self { agent })
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn open(&self, request: &DeliveryRequest<'_>) -> io::Result<Box<dyn Connection>> {
        let mut req = self.agent.post(request.url);
        for (key, value) in request.headers {
            req = req.set(key, value);
        }
        Ok(Box::new(UreqConnection {
            request: Some(req),
            response: None,
        }))
    }
}

struct UreqConnection {
    request: Option<ureq::Request>,
    response: Option<ureq::Response>,
}

impl Connection for UreqConnection {
    fn send(&mut self, body: &[u8]) -> io::Result<u16> {
        let request = self
            .request
            .take()
            .ok_or_else(|| io::Error::other("request body already sent"))?;
        // ureq reports non-2xx statuses as errors; the filter decides what
        // counts as success, so both arms yield a response.
        let response = match request.send_bytes(body) {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport_err)) => return Err(io::Error::other(transport_err)),
        };
        let status = response.status();
        self.response = Some(response);
        Ok(status)
    }

    fn read_response(&mut self) -> io::Result<Vec<u8>> {
        let response = self
            .response
            .take()
            .ok_or_else(|| io::Error::other("no response available"))?;
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut body)?;
        Ok(body)
    }

    fn disconnect(&mut self) {
        self.request = None;
        self.response = None;
    }
}
