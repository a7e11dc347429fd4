//! In-place HTTP request built inside caller-owned buffers.

use heapless::{String, Vec};

use super::{Header, MAX_REQUEST_HEADERS, MAX_URL_LEN, Method};
use crate::context::Context;
use crate::error::Error;

/// An HTTP request assembled entirely on the caller's stack.
///
/// The URL is copied into a bounded buffer at construction so policies can
/// append query parameters; the body is borrowed. The header table supports
/// a mark/rollback pair so the retry policy can strip headers appended by
/// inner stages during a failed attempt before re-sending.
#[derive(Debug)]
pub struct Request<'a> {
    method: Method,
    url: String<MAX_URL_LEN>,
    headers: Vec<Header, MAX_REQUEST_HEADERS>,
    body: &'a [u8],
    context: Context<'a>,
}

impl<'a> Request<'a> {
    /// Creates a request, copying `url` into the request's URL buffer.
    ///
    /// Fails with [`Error::Capacity`] if the URL does not fit.
    pub fn new(
        context: Context<'a>,
        method: Method,
        url: &str,
        body: &'a [u8],
    ) -> Result<Self, Error> {
        Ok(Self {
            method,
            url: String::try_from(url).map_err(|_| Error::Capacity)?,
            headers: Vec::new(),
            body,
            context,
        })
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request URL, including any appended query parameters.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// The request body.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// The cancellation/deadline context this request carries.
    pub fn context(&self) -> Context<'a> {
        self.context
    }

    /// The headers appended so far, in append order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Appends a header. On any capacity failure (full table, oversized
    /// name or value) the table is left exactly as it was.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), Error> {
        // Build the header before touching the table so a failure commits
        // nothing.
        let header = Header {
            name: String::try_from(name).map_err(|_| Error::Capacity)?,
            value: String::try_from(value).map_err(|_| Error::Capacity)?,
        };
        self.headers.push(header).map_err(|_| Error::Capacity)
    }

    /// Appends `name=value` to the URL's query string, choosing `?` or `&`
    /// automatically. All-or-nothing: if the result would not fit, the URL
    /// is left unchanged.
    pub fn append_query(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let needed = 2 + name.len() + value.len();
        if MAX_URL_LEN - self.url.len() < needed {
            return Err(Error::Capacity);
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        // Capacity was checked above; these cannot fail.
        let _ = self.url.push(separator);
        let _ = self.url.push_str(name);
        let _ = self.url.push('=');
        let _ = self.url.push_str(value);
        Ok(())
    }

    /// Marks the current end of the header table. Headers appended after
    /// this point can be removed again with
    /// [`rollback_headers`](Request::rollback_headers).
    pub fn headers_mark(&self) -> usize {
        self.headers.len()
    }

    /// Truncates the header table back to a mark obtained from
    /// [`headers_mark`](Request::headers_mark), removing every header
    /// appended since. Headers appended before the mark are untouched.
    pub fn rollback_headers(&mut self, mark: usize) {
        debug_assert!(mark <= self.headers.len());
        self.headers.truncate(mark);
    }
}
