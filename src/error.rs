//! Common error types for pipeline operations

/// A common error type for every fallible operation in the crate.
///
/// This enum defines the errors that can surface while building a request,
/// running it through the policy pipeline, or exchanging it over the
/// network. It is designed to be simple and portable for `no_std`
/// environments: every operation returns an explicit `Result`, nothing
/// panics on the request path.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A caller-supplied buffer or header table was too small. Nothing was
    /// written past the buffer's prior length.
    Capacity,
    /// The request's context was cancelled or its deadline expired.
    Canceled,
    /// The credential could not produce an authorization header.
    AuthenticationFailed,
    /// The request URL could not be split into host and path.
    InvalidAddress,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// The connection was closed before the exchange completed.
    ConnectionClosed,
    /// An error occurred during a read operation.
    ReadError,
    /// An error occurred during a write operation.
    WriteError,
    /// A timeout occurred.
    Timeout,
    /// The response bytes did not parse as an HTTP response.
    MalformedResponse,
    /// A policy delegated past the terminal transport stage. This is a
    /// programmer error in pipeline construction, not a runtime condition.
    EmptyPipeline,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Capacity => defmt::write!(f, "Capacity"),
            Error::Canceled => defmt::write!(f, "Canceled"),
            Error::AuthenticationFailed => defmt::write!(f, "AuthenticationFailed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::MalformedResponse => defmt::write!(f, "MalformedResponse"),
            Error::EmptyPipeline => defmt::write!(f, "EmptyPipeline"),
        }
    }
}
