//! Best-effort capture of error response bodies.

use log::debug;

use crate::multipart::Charset;

use super::transport::Connection;

/// Text used when the response body cannot be read.
pub const UNKNOWN_RESPONSE: &str = "(unknown)";

/// Read the response body as text, falling back to [`UNKNOWN_RESPONSE`].
///
/// Lines are re-joined with `\r\n` and the trailing line break is dropped,
/// so the text can be embedded in a single-line error message prefix.
pub(super) fn response_text(connection: &mut dyn Connection, charset: Charset) -> String {
    match connection.read_response() {
        Ok(bytes) => join_lines(&charset.decode_lossy(&bytes)),
        Err(err) => {
            debug!("HttpDeliveryFilter could not read error response: {err}");
            UNKNOWN_RESPONSE.to_owned()
        }
    }
}

fn join_lines(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized.lines().collect::<Vec<_>>().join("\r\n")
}
