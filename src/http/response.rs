//! HTTP response model and wire parsing.

use heapless::{String, Vec};

use super::{Header, MAX_RESPONSE_BODY, MAX_RESPONSE_HEADERS};
use crate::error::Error;

/// An HTTP response, filled by the transport stage into caller-owned
/// storage.
///
/// The caller constructs an empty `Response` (on its stack or as part of a
/// longer-lived structure) and passes it to the pipeline; the transport
/// parses the wire bytes into it. Between retry attempts the response is
/// reset, so after the pipeline returns it reflects the final attempt only.
#[derive(Debug, Default)]
pub struct Response {
    /// HTTP status code of the final attempt, e.g. `201`.
    pub status_code: u16,
    /// Response headers, in wire order, up to [`MAX_RESPONSE_HEADERS`].
    pub headers: Vec<Header, MAX_RESPONSE_HEADERS>,
    /// Response body bytes, up to [`MAX_RESPONSE_BODY`].
    pub body: Vec<u8, MAX_RESPONSE_BODY>,
}

impl Response {
    /// Creates an empty response for the pipeline to fill.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the response back to its empty state.
    pub fn reset(&mut self) {
        self.status_code = 0;
        self.headers.clear();
        self.body.clear();
    }

    /// Returns the value of the first header with the given name,
    /// ASCII-case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.as_str().eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns the parsed `Content-Length` header, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")?.parse::<usize>().ok()
    }

    /// Parses an HTTP/1.1 status line and header block (everything before
    /// the blank line) into this response.
    pub(crate) fn parse_head(&mut self, head: &[u8]) -> Result<(), Error> {
        let head = core::str::from_utf8(head).map_err(|_| Error::MalformedResponse)?;
        let mut lines = head.lines();

        // Status line: "HTTP/1.1 201 Created"
        let status_line = lines.next().ok_or(Error::MalformedResponse)?;
        let mut status_parts = status_line.splitn(3, ' ');
        let version = status_parts.next().ok_or(Error::MalformedResponse)?;
        if !version.starts_with("HTTP/") {
            return Err(Error::MalformedResponse);
        }
        self.status_code = status_parts
            .next()
            .ok_or(Error::MalformedResponse)?
            .parse::<u16>()
            .map_err(|_| Error::MalformedResponse)?;

        for line in lines {
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, ':');
            let name = parts.next().ok_or(Error::MalformedResponse)?.trim();
            let value = parts.next().ok_or(Error::MalformedResponse)?.trim();
            self.headers
                .push(Header {
                    name: String::try_from(name).map_err(|_| Error::MalformedResponse)?,
                    value: String::try_from(value).map_err(|_| Error::MalformedResponse)?,
                })
                .map_err(|_| Error::MalformedResponse)?;
        }

        Ok(())
    }
}
