//! Blob storage client built on the request pipeline.
//!
//! This is the thin, concrete end of the crate: a client that uploads a
//! block blob with a single `PUT`. Everything interesting happens in the
//! pipeline underneath; this module only shows how a service client
//! composes it: copy the endpoint once at init, register the service's
//! credential scope, pick the service's API version and retry defaults,
//! and build each operation's request inside stack buffers before handing
//! it over.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut client = BlobClient::init(endpoint, credential, connector, platform,
//!     BlobClientOptions::default())?;
//! let mut response = Response::new();
//! client.upload(b"device log line", None, &mut response)?;
//! assert_eq!(response.status_code, 201);
//! ```

use core::fmt::Write as _;

use heapless::String;

use crate::context::Context;
use crate::credential::Credential;
use crate::error::Error;
use crate::http::policy::{
    ApiVersionLocation, ApiVersionOptions, Pipeline, RetryOptions, TelemetryOptions,
};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::{MAX_URL_LEN, Method};
use crate::network::Connect;
use crate::platform::Platform;

const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const BLOB_TYPE_BLOCK_BLOB: &str = "BlockBlob";
const CONTENT_LENGTH_HEADER: &str = "Content-Length";
const CONTENT_TYPE_HEADER: &str = "Content-Type";
const CONTENT_TYPE_TEXT_PLAIN: &str = "text/plain";

/// Service version spoken by this client.
pub const STORAGE_API_VERSION: &str = "2019-02-02";

/// OAuth scope blob requests are authorized for.
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

// Decimal digits of u32::MAX plus slack; Content-Length values always fit.
const CONTENT_LENGTH_DIGITS: usize = 20;

/// Options for constructing a [`BlobClient`].
#[derive(Debug, Clone, Copy)]
pub struct BlobClientOptions {
    /// API version injection: `x-ms-version` as a header by default.
    pub api_version: ApiVersionOptions,
    /// Telemetry identifier for the `User-Agent` header.
    pub telemetry: TelemetryOptions,
    /// Retry behavior; storage defaults are 5 retries, 1 s base delay,
    /// 30 s cap.
    pub retry: RetryOptions,
}

impl Default for BlobClientOptions {
    fn default() -> Self {
        Self {
            api_version: ApiVersionOptions {
                name: "x-ms-version",
                version: STORAGE_API_VERSION,
                location: ApiVersionLocation::Header,
            },
            telemetry: TelemetryOptions::default(),
            retry: RetryOptions {
                max_retries: 5,
                retry_delay_msec: 1_000,
                max_retry_delay_msec: 30_000,
                ..RetryOptions::default()
            },
        }
    }
}

/// Per-upload options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobUploadOptions<'a> {
    /// Cancellation/deadline context for this operation.
    pub context: Context<'a>,
}

/// A client for one blob endpoint.
///
/// Holds its own copy of the endpoint and a pipeline built once at init;
/// every operation assembles its request in stack buffers and runs it
/// through that pipeline.
#[derive(Debug)]
pub struct BlobClient<C: Credential, T: Connect, P: Platform> {
    endpoint: String<MAX_URL_LEN>,
    pipeline: Pipeline<C, T, P>,
}

impl<C: Credential, T: Connect, P: Platform> BlobClient<C, T, P> {
    /// Creates a client for the blob at `endpoint`.
    ///
    /// The endpoint is copied into client-owned storage, so the caller may
    /// reuse or drop its buffer afterwards. Registers [`STORAGE_SCOPE`] on
    /// the credential and builds the request pipeline.
    pub fn init(
        endpoint: &str,
        mut credential: C,
        connector: T,
        platform: P,
        options: BlobClientOptions,
    ) -> Result<Self, Error> {
        credential.set_scopes(STORAGE_SCOPE)?;
        Ok(Self {
            endpoint: String::try_from(endpoint).map_err(|_| Error::Capacity)?,
            pipeline: Pipeline::new(
                options.api_version,
                options.telemetry,
                options.retry,
                credential,
                connector,
                platform,
            ),
        })
    }

    /// The client's stored endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Mutable access to the credential, e.g. to store a refreshed token.
    pub fn credential_mut(&mut self) -> &mut C {
        self.pipeline.credential_mut()
    }

    /// Uploads `content` as a block blob, leaving the service's answer in
    /// `response`.
    ///
    /// Builds a `PUT` against the stored endpoint with the blob type,
    /// exact decimal `Content-Length`, and content type headers, then
    /// hands it to the pipeline. No network I/O happens outside the
    /// pipeline call.
    pub fn upload(
        &mut self,
        content: &[u8],
        options: Option<&BlobUploadOptions<'_>>,
        response: &mut Response,
    ) -> Result<(), Error> {
        let default_options = BlobUploadOptions::default();
        let options = options.unwrap_or(&default_options);

        let mut request = Request::new(
            options.context,
            Method::Put,
            self.endpoint.as_str(),
            content,
        )?;

        request.append_header(BLOB_TYPE_HEADER, BLOB_TYPE_BLOCK_BLOB)?;

        let mut content_length: String<CONTENT_LENGTH_DIGITS> = String::new();
        write!(content_length, "{}", content.len()).map_err(|_| Error::Capacity)?;
        request.append_header(CONTENT_LENGTH_HEADER, content_length.as_str())?;

        request.append_header(CONTENT_TYPE_HEADER, CONTENT_TYPE_TEXT_PLAIN)?;

        self.pipeline.process(&mut request, response)
    }
}
