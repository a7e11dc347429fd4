//! HTTP request/response model and the policy pipeline.
//!
//! Everything here lives inside caller-owned fixed-size buffers: a
//! [`Request`] is assembled on the caller's stack, handed to a
//! [`Pipeline`](policy::Pipeline), processed by each policy in a fixed
//! order, and exchanged over the wire by the terminal transport stage,
//! which fills the caller's [`Response`]. No stage allocates.
//!
//! # Capacity model
//!
//! Buffer sizes are compile-time constants chosen for microcontroller-class
//! targets. Any operation that would exceed a capacity fails with
//! [`Error::Capacity`](crate::error::Error::Capacity) and commits nothing
//! past the buffer's prior length; buffers never grow.

/// Request and retry-safe header table.
pub mod request;

/// Response model and wire parsing.
pub mod response;

/// The policy chain: pipeline, stages, and their options.
pub mod policy;

pub use request::Request;
pub use response::Response;

use heapless::String;

/// Maximum number of headers a request can carry.
pub const MAX_REQUEST_HEADERS: usize = 16;

/// Maximum number of headers retained from a response.
pub const MAX_RESPONSE_HEADERS: usize = 16;

/// Maximum byte length of a header name.
pub const MAX_HEADER_NAME_LEN: usize = 64;

/// Maximum byte length of a header value.
pub const MAX_HEADER_VALUE_LEN: usize = 512;

/// Maximum byte length of a request URL, including query parameters
/// appended by the pipeline.
pub const MAX_URL_LEN: usize = 512;

/// Maximum byte length of a response body.
pub const MAX_RESPONSE_BODY: usize = 2048;

/// HTTP request methods understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
}

impl Method {
    /// The method's wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

/// A single HTTP header as a bounded (name, value) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name.
    pub name: String<MAX_HEADER_NAME_LEN>,
    /// Header value.
    pub value: String<MAX_HEADER_VALUE_LEN>,
}
