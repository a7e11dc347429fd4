//! # libcloud - Embedded cloud client core
//!
//! An allocation-free HTTP request pipeline for devices that talk to cloud
//! services from microcontroller-class hardware. Requests are built,
//! authenticated, retried, logged, and sent entirely inside caller-owned
//! fixed-size buffers: no heap, no blocking locks, deterministic worst-case
//! memory use. This library is designed for embedded systems and supports
//! `no_std` environments.
//!
//! ## Features
//!
//! ### Request pipeline
//! - **Policy chain**: a fixed, ordered sequence of stages (API version,
//!   telemetry, retry, credential, logging) terminated by a transport stage
//! - **Retry with backoff**: exponential, capped delays with header rollback
//!   so re-sent requests never accumulate duplicate headers
//! - **Cancellation**: a deadline/cancel context bounds total latency,
//!   including backoff waits
//!
//! ### Logging
//! - Process-wide, lock-free classification filter and callback registration
//! - A cost-free "would this be logged" query so message formatting can be
//!   skipped entirely when no one is listening
//!
//! ### Transport seam
//! - Bring-your-own socket: the pipeline drives any type implementing the
//!   [`network`] connection traits
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libcloud = "0.1.0"
//! ```
//!
//! ### Uploading a blob
//!
//! ```rust,no_run
//! use libcloud::credential::BearerTokenCredential;
//! use libcloud::http::Response;
//! use libcloud::storage::{BlobClient, BlobClientOptions};
//! # use libcloud::network::{Connect, Connection};
//! # use libcloud::platform::Platform;
//! # struct MockConnection;
//! # impl libcloud::network::Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libcloud::network::Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libcloud::network::Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Connection for MockConnection {}
//! # struct MockNetwork;
//! # impl Connect for MockNetwork {
//! #     type Connection = MockConnection;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<Self::Connection, Self::Error> {
//! #         Ok(MockConnection)
//! #     }
//! # }
//! # struct MockPlatform;
//! # impl Platform for MockPlatform {
//! #     fn clock_msec(&mut self) -> u64 { 0 }
//! #     fn sleep_msec(&mut self, _msec: u64) {}
//! # }
//!
//! let mut credential = BearerTokenCredential::new();
//! credential.set_token("eyJ0...").unwrap();
//!
//! let mut client = BlobClient::init(
//!     "https://contoso.blob.core.windows.net/container/blob",
//!     credential,
//!     MockNetwork,
//!     MockPlatform,
//!     BlobClientOptions::default(),
//! ).unwrap();
//!
//! let mut response = Response::new();
//! // client.upload(b"hello", None, &mut response)?;
//! ```
//!
//! ### Observing the pipeline
//!
//! ```rust
//! use libcloud::log::{self, Classification};
//!
//! fn on_message(classification: Classification, message: &str) {
//!     // forward to RTT, UART, defmt, ...
//!     let _ = (classification, message);
//! }
//!
//! static FILTER: [Classification; 3] = [
//!     Classification::HttpResponse,
//!     Classification::HttpRetry,
//!     Classification::EndOfList,
//! ];
//!
//! log::set_callback(Some(on_message));
//! log::set_classifications(Some(&FILTER[..]));
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, etc.)
//! - Linux-based IoT devices (Raspberry Pi, etc.)
//! - Any platform supporting Rust's `core` library
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Common error type shared by every fallible operation in the crate.
pub mod error;

/// Cancellation and deadline propagation for in-flight requests.
pub mod context;

/// Platform seam providing a monotonic clock and a blocking sleep.
pub mod platform;

/// Network abstraction layer: the connection traits the transport stage
/// drives to perform the actual request/response exchange.
pub mod network;

/// Process-wide, lock-free log classification filter and callback registry.
pub mod log;

/// Credential capability consumed by the pipeline's auth stage.
pub mod credential;

/// HTTP request/response model and the policy pipeline that processes them.
pub mod http;

/// Blob storage client: the thin example showing how a service client
/// composes the request builder and pipeline.
pub mod storage;
