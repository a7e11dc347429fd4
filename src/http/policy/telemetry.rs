//! SDK telemetry header injection.

use super::{Policy, PolicyChain};
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;

/// Options for [`TelemetryPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct TelemetryOptions {
    /// The telemetry identifier sent as the `User-Agent` header.
    pub telemetry: &'static str,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            telemetry: concat!("libcloud/", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Appends the SDK telemetry identifier to every request so the service
/// can attribute traffic to this client.
#[derive(Debug)]
pub struct TelemetryPolicy {
    options: TelemetryOptions,
}

impl TelemetryPolicy {
    /// Creates the policy from its options.
    pub fn new(options: TelemetryOptions) -> Self {
        Self { options }
    }
}

impl Policy for TelemetryPolicy {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        request.append_header("User-Agent", self.options.telemetry)?;
        next.process(request, response)
    }
}
