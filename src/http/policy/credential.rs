//! Credential application stage.

use super::{Policy, PolicyChain};
use crate::credential::Credential;
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;

/// Asks the client's credential to authorize the request before the inner
/// chain sends it. A credential failure short-circuits with
/// [`Error::AuthenticationFailed`]; the inner chain is never invoked. This
/// stage itself never retries; wrapping it is the retry policy's job, so
/// a token refreshed between attempts is applied to the re-attempt.
#[derive(Debug)]
pub struct CredentialPolicy<C: Credential> {
    credential: C,
}

impl<C: Credential> CredentialPolicy<C> {
    /// Creates the policy around a credential capability.
    pub fn new(credential: C) -> Self {
        Self { credential }
    }

    /// Mutable access to the wrapped credential.
    pub fn credential_mut(&mut self) -> &mut C {
        &mut self.credential
    }
}

impl<C: Credential> Policy for CredentialPolicy<C> {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        match self.credential.apply(request) {
            Ok(()) => next.process(request, response),
            // Capacity failures while writing the header are still capacity
            // errors; everything else is an authentication failure.
            Err(Error::Capacity) => Err(Error::Capacity),
            Err(_) => Err(Error::AuthenticationFailed),
        }
    }
}
