//! Service API version injection.

use super::{Policy, PolicyChain};
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;

/// Where the API version is placed on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersionLocation {
    /// As a request header, `name: version`.
    Header,
    /// As a query parameter, `?name=version`.
    QueryParameter,
}

/// Options for [`ApiVersionPolicy`]: the parameter name, the version
/// string, and where to put it. Each service client supplies its own.
#[derive(Debug, Clone, Copy)]
pub struct ApiVersionOptions {
    /// Header or query parameter name, e.g. `x-ms-version`.
    pub name: &'static str,
    /// Version value, e.g. `2019-02-02`.
    pub version: &'static str,
    /// Placement mode.
    pub location: ApiVersionLocation,
}

/// Injects the service API version into every request.
#[derive(Debug)]
pub struct ApiVersionPolicy {
    options: ApiVersionOptions,
}

impl ApiVersionPolicy {
    /// Creates the policy from its options.
    pub fn new(options: ApiVersionOptions) -> Self {
        Self { options }
    }
}

impl Policy for ApiVersionPolicy {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        match self.options.location {
            ApiVersionLocation::Header => {
                request.append_header(self.options.name, self.options.version)?;
            }
            ApiVersionLocation::QueryParameter => {
                request.append_query(self.options.name, self.options.version)?;
            }
        }
        next.process(request, response)
    }
}
