//! A network abstraction layer for embedded systems
//!
//! The pipeline's terminal transport stage is written against these traits
//! rather than any concrete socket. The target platform brings its own TCP
//! or TLS stack by implementing [`Read`], [`Write`], and [`Close`] for its
//! connection type and [`Connect`] for whatever opens connections, and the
//! pipeline drives it synchronously.
//!
//! The pipeline opens one connection per attempt through [`Connect`], so a
//! retried request never reuses a half-broken socket.

#![deny(unsafe_code)]

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Byte-stream read half of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte-stream write half of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Orderly connection shutdown.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote`, given as `host` or `host:port`
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}
