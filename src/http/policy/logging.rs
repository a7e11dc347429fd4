//! Wire-attempt instrumentation.

use core::fmt::Write as _;

use heapless::String;

use super::{Policy, PolicyChain};
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::log::{self, Classification};

const MAX_LOG_MESSAGE_LEN: usize = 256;

/// Emits `HttpRequest` and `HttpResponse` classified messages around the
/// innermost exchange, so what gets logged is each actual wire attempt,
/// after all outer stages have shaped the request.
///
/// Messages are only formatted when [`log::should_write`] says a callback
/// is listening for the classification; otherwise this stage is a plain
/// pass-through.
#[derive(Debug, Default)]
pub struct LoggingPolicy;

impl LoggingPolicy {
    /// Creates the logging stage.
    pub fn new() -> Self {
        Self
    }
}

impl Policy for LoggingPolicy {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        if log::should_write(Classification::HttpRequest) {
            let mut message: String<MAX_LOG_MESSAGE_LEN> = String::new();
            // A message that overflows the buffer is delivered truncated.
            let _ = write!(
                message,
                "HTTP request: {} {} ({} headers, {} body bytes)",
                request.method().as_str(),
                request.url(),
                request.headers().len(),
                request.body().len()
            );
            log::write(Classification::HttpRequest, message.as_str());
        }

        let result = next.process(request, response);

        if log::should_write(Classification::HttpResponse) {
            let mut message: String<MAX_LOG_MESSAGE_LEN> = String::new();
            match &result {
                Ok(()) => {
                    let _ = write!(message, "HTTP response: {}", response.status_code);
                }
                Err(error) => {
                    let _ = write!(message, "HTTP response error: {error:?}");
                }
            }
            log::write(Classification::HttpResponse, message.as_str());
        }

        result
    }
}
