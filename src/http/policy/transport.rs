//! Terminal transport stage: the policy that actually touches the wire.

use heapless::Vec;

use super::{Policy, PolicyChain};
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::network::{Close, Connect, Write};

// One buffer serializes the request line and headers; the body is written
// straight from the caller's slice so it never gets copied.
const WIRE_HEAD_SIZE: usize = 2048;

// Receive window for the status line, headers, and leading body bytes.
const WIRE_RESPONSE_SIZE: usize = 2048;

/// The last stage of every pipeline: opens a connection, performs the
/// HTTP/1.1 exchange, fills the caller's [`Response`], and closes the
/// connection again.
///
/// One connection is opened per attempt, so a retried request never reuses
/// a half-broken socket. This stage never delegates; the chain ends here.
#[derive(Debug)]
pub struct TransportPolicy<T: Connect> {
    connector: T,
}

impl<T: Connect> TransportPolicy<T> {
    /// Creates the transport stage around a connector.
    pub fn new(connector: T) -> Self {
        Self { connector }
    }

    fn exchange(&mut self, request: &Request<'_>, response: &mut Response) -> Result<(), Error> {
        let (host, path) = split_url(request.url())?;

        let mut connection = self
            .connector
            .connect(host)
            .map_err(|_| Error::ConnectionRefused)?;

        let result = send_and_receive(&mut connection, request, host, path, response);
        // The exchange outcome matters more than shutdown hiccups.
        let _ = connection.close();
        result
    }
}

impl<T: Connect> Policy for TransportPolicy<T> {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        _next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        // The transport has no clock; deadlines are enforced at the retry
        // policy's boundaries, the cancel flag is checked here too.
        if request.context().is_cancelled() {
            return Err(Error::Canceled);
        }
        response.reset();
        self.exchange(request, response)
    }
}

fn send_and_receive<C: crate::network::Connection>(
    connection: &mut C,
    request: &Request<'_>,
    host: &str,
    path: &str,
    response: &mut Response,
) -> Result<(), Error> {
    // --- Serialize head ---
    let mut head: Vec<u8, WIRE_HEAD_SIZE> = Vec::new();
    let mut push = |bytes: &[u8]| -> Result<(), Error> {
        head.extend_from_slice(bytes).map_err(|_| Error::Capacity)
    };

    push(request.method().as_str().as_bytes())?;
    push(b" ")?;
    push(path.as_bytes())?;
    push(b" HTTP/1.1\r\nHost: ")?;
    push(host.as_bytes())?;
    push(b"\r\n")?;
    for header in request.headers() {
        push(header.name.as_bytes())?;
        push(b": ")?;
        push(header.value.as_bytes())?;
        push(b"\r\n")?;
    }
    push(b"\r\n")?;

    // --- Send ---
    write_all(connection, &head)?;
    write_all(connection, request.body())?;
    connection.flush().map_err(|_| Error::WriteError)?;

    // --- Receive head (and whatever body bytes rode along) ---
    let mut wire = [0u8; WIRE_RESPONSE_SIZE];
    let mut total_read = 0;
    let head_end = loop {
        if let Some(pos) = find_slice(&wire[..total_read], b"\r\n\r\n") {
            break pos;
        }
        if total_read == wire.len() {
            // Headers alone overflow the receive window.
            return Err(Error::Capacity);
        }
        match connection.read(&mut wire[total_read..]) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => total_read += n,
            Err(_) => return Err(Error::ReadError),
        }
    };

    response.parse_head(&wire[..head_end])?;

    let leading_body = &wire[head_end + 4..total_read];
    response
        .body
        .extend_from_slice(leading_body)
        .map_err(|_| Error::Capacity)?;

    // --- Receive the rest of the body, if Content-Length says so ---
    if let Some(content_length) = response.content_length() {
        if content_length > response.body.capacity() {
            return Err(Error::Capacity);
        }
        while response.body.len() < content_length {
            let mut chunk = [0u8; 256];
            let want = (content_length - response.body.len()).min(chunk.len());
            match connection.read(&mut chunk[..want]) {
                Ok(0) => return Err(Error::ConnectionClosed),
                Ok(n) => {
                    response
                        .body
                        .extend_from_slice(&chunk[..n])
                        .map_err(|_| Error::Capacity)?;
                }
                Err(_) => return Err(Error::ReadError),
            }
        }
        response.body.truncate(content_length);
    }

    Ok(())
}

fn write_all<W: Write>(connection: &mut W, mut data: &[u8]) -> Result<(), Error> {
    while !data.is_empty() {
        match connection.write(data) {
            Ok(0) => return Err(Error::WriteError),
            Ok(n) if n <= data.len() => data = &data[n..],
            _ => return Err(Error::WriteError),
        }
    }
    Ok(())
}

// Splits `scheme://host[:port]/path` into the connect target and the
// origin-form request path.
fn split_url(url: &str) -> Result<(&str, &str), Error> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or(Error::InvalidAddress)?;
    let (host, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, "/"),
    };
    if host.is_empty() {
        return Err(Error::InvalidAddress);
    }
    Ok((host, path))
}

/// Finds the first occurrence of a slice in another slice and returns its
/// starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
