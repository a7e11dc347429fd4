//! The policy chain: a fixed, ordered sequence of request-processing
//! stages terminated by the transport.
//!
//! Each [`Policy`] may augment the request, delegate to the remainder of
//! the chain through [`PolicyChain::process`], and inspect or react to the
//! result flowing back up. The order is fixed when the [`Pipeline`] is
//! built and is the same for every request:
//!
//! ```text
//! api-version → telemetry → retry → credential → logging → transport
//! ```
//!
//! Version and telemetry headers sit outside the retry stage so they are
//! appended exactly once; retry wraps credential and transport so a
//! re-authenticated attempt is what gets retried; logging wraps only the
//! innermost exchange so it observes each actual wire attempt. A policy
//! must never leave request mutations behind after delegating unless an
//! outer stage (retry) rolls them back.

pub mod apiversion;
pub mod credential;
pub mod logging;
pub mod retry;
pub mod telemetry;
pub mod transport;

pub use apiversion::{ApiVersionLocation, ApiVersionOptions, ApiVersionPolicy};
pub use credential::CredentialPolicy;
pub use logging::LoggingPolicy;
pub use retry::{RetryOptions, RetryPolicy};
pub use telemetry::{TelemetryOptions, TelemetryPolicy};
pub use transport::TransportPolicy;

use crate::credential::Credential;
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::network::Connect;
use crate::platform::Platform;

/// One stage of the request pipeline.
pub trait Policy {
    /// Processes `request`, optionally delegating to the remaining chain
    /// via `next`, and leaves the outcome of the exchange in `response`.
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error>;
}

/// The remaining portion of a pipeline, handed to each policy so it can
/// delegate to the stages after it.
pub struct PolicyChain<'a, 'b> {
    policies: &'a mut [&'b mut dyn Policy],
}

impl core::fmt::Debug for PolicyChain<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolicyChain")
            .field("remaining", &self.policies.len())
            .finish()
    }
}

impl<'a, 'b> PolicyChain<'a, 'b> {
    /// Wraps an ordered policy slice as a chain. The last entry must be a
    /// terminal stage that never delegates.
    pub fn new(policies: &'a mut [&'b mut dyn Policy]) -> Self {
        Self { policies }
    }

    /// Invokes the next policy with the remainder of the chain.
    ///
    /// Fails with [`Error::EmptyPipeline`] if the chain is exhausted,
    /// which means a terminal stage delegated by mistake.
    pub fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
    ) -> Result<(), Error> {
        let (head, rest) = self
            .policies
            .split_first_mut()
            .ok_or(Error::EmptyPipeline)?;
        let mut next = PolicyChain { policies: rest };
        head.process(request, response, &mut next)
    }
}

/// A client's request pipeline: the six concrete policies, owned by value
/// and composed once at client construction.
///
/// The execution order is fixed by [`process`](Pipeline::process); it
/// cannot be reordered per call.
#[derive(Debug)]
pub struct Pipeline<C: Credential, T: Connect, P: Platform> {
    api_version: ApiVersionPolicy,
    telemetry: TelemetryPolicy,
    retry: RetryPolicy<P>,
    credential: CredentialPolicy<C>,
    logging: LoggingPolicy,
    transport: TransportPolicy<T>,
}

impl<C: Credential, T: Connect, P: Platform> Pipeline<C, T, P> {
    /// Builds a pipeline from the client's options and capabilities.
    pub fn new(
        api_version: ApiVersionOptions,
        telemetry: TelemetryOptions,
        retry: RetryOptions,
        credential: C,
        connector: T,
        platform: P,
    ) -> Self {
        Self {
            api_version: ApiVersionPolicy::new(api_version),
            telemetry: TelemetryPolicy::new(telemetry),
            retry: RetryPolicy::new(retry, platform),
            credential: CredentialPolicy::new(credential),
            logging: LoggingPolicy::new(),
            transport: TransportPolicy::new(connector),
        }
    }

    /// Mutable access to the credential, e.g. to store a refreshed token.
    pub fn credential_mut(&mut self) -> &mut C {
        self.credential.credential_mut()
    }

    /// Runs `request` through the full policy chain, leaving the outcome
    /// in `response`. Blocks the calling thread until the exchange (and
    /// any retries, including backoff waits) completes or the request's
    /// context cancels it.
    pub fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
    ) -> Result<(), Error> {
        let mut policies: [&mut dyn Policy; 6] = [
            &mut self.api_version,
            &mut self.telemetry,
            &mut self.retry,
            &mut self.credential,
            &mut self.logging,
            &mut self.transport,
        ];
        PolicyChain::new(&mut policies).process(request, response)
    }
}
