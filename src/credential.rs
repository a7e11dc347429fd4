//! Credential capability consumed by the pipeline's auth stage.
//!
//! The pipeline never inspects how a token is obtained; it only asks the
//! credential to authorize a request right before the transport sends it.
//! Token *acquisition* (OAuth flows, SAS signing, ...) lives outside this
//! crate: the host application refreshes the token however its platform
//! allows and hands the result to the credential. Because the credential
//! stage runs inside the retry loop, a token refreshed between attempts is
//! picked up by the next attempt automatically.

use heapless::String;

use crate::error::Error;
use crate::http::request::Request;

/// Maximum byte length of a stored access token.
pub const MAX_TOKEN_LEN: usize = 384;

/// Maximum byte length of a stored scope string.
pub const MAX_SCOPES_LEN: usize = 128;

/// A capability that can authorize HTTP requests.
pub trait Credential {
    /// Registers the scope set requests will be authorized for. Called
    /// once by the service client at init time.
    fn set_scopes(&mut self, scopes: &str) -> Result<(), Error>;

    /// Authorizes `request`, typically by appending an `Authorization`
    /// header. Failing here short-circuits the pipeline with an
    /// authentication error before any network I/O happens.
    fn apply(&mut self, request: &mut Request<'_>) -> Result<(), Error>;
}

/// The no-op credential for anonymous access. Requests pass through the
/// auth stage unmodified.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl Credential for Anonymous {
    fn set_scopes(&mut self, _scopes: &str) -> Result<(), Error> {
        Ok(())
    }

    fn apply(&mut self, _request: &mut Request<'_>) -> Result<(), Error> {
        Ok(())
    }
}

/// A credential holding a caller-supplied bearer token.
///
/// The host application acquires and refreshes the token out-of-band and
/// stores it with [`set_token`](BearerTokenCredential::set_token); each
/// request then carries `Authorization: Bearer <token>`.
#[derive(Debug, Default)]
pub struct BearerTokenCredential {
    token: String<MAX_TOKEN_LEN>,
    scopes: String<MAX_SCOPES_LEN>,
}

impl BearerTokenCredential {
    /// Creates a credential with no token. Applying it before a token is
    /// stored fails with [`Error::AuthenticationFailed`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces the access token.
    pub fn set_token(&mut self, token: &str) -> Result<(), Error> {
        self.token = String::try_from(token).map_err(|_| Error::Capacity)?;
        Ok(())
    }

    /// Returns the scope string registered by the service client.
    pub fn scopes(&self) -> &str {
        self.scopes.as_str()
    }
}

impl Credential for BearerTokenCredential {
    fn set_scopes(&mut self, scopes: &str) -> Result<(), Error> {
        self.scopes = String::try_from(scopes).map_err(|_| Error::Capacity)?;
        Ok(())
    }

    fn apply(&mut self, request: &mut Request<'_>) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::AuthenticationFailed);
        }
        let mut value: String<{ crate::http::MAX_HEADER_VALUE_LEN }> = String::new();
        value.push_str("Bearer ").map_err(|_| Error::Capacity)?;
        value
            .push_str(self.token.as_str())
            .map_err(|_| Error::Capacity)?;
        request.append_header("Authorization", value.as_str())
    }
}
