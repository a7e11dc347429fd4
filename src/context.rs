//! Cancellation and deadline propagation.
//!
//! A [`Context`] rides on every request and bounds how long the pipeline may
//! keep working on it. The retry policy consults it before every attempt and
//! while waiting out a backoff delay; the transport checks the cancellation
//! flag before touching the network. A cancelled context makes the pipeline
//! return [`Error::Canceled`](crate::error::Error::Canceled) instead of
//! finishing further attempts.
//!
//! Deadlines are absolute values of the platform's millisecond clock (see
//! [`Platform::clock_msec`](crate::platform::Platform::clock_msec)), so they
//! survive being copied between stack frames without re-arming. The cancel
//! flag is a caller-owned [`AtomicBool`] so an interrupt handler or another
//! thread can abort an in-flight request.

use core::sync::atomic::{AtomicBool, Ordering};

/// Cancellation/deadline context carried by a request.
///
/// `Context` is `Copy`; handing it to a request does not transfer ownership
/// of the cancel flag, which stays with the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'a> {
    deadline_msec: Option<u64>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Context<'a> {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bounds the request by an absolute deadline on the platform clock.
    pub fn with_deadline(self, deadline_msec: u64) -> Self {
        Self {
            deadline_msec: Some(deadline_msec),
            ..self
        }
    }

    /// Attaches a caller-owned cancellation flag. Storing `true` in the
    /// flag aborts the request at its next cancellation check.
    pub fn with_cancel(self, cancel: &'a AtomicBool) -> Self {
        Self {
            cancel: Some(cancel),
            ..self
        }
    }

    /// Returns the absolute deadline in platform milliseconds, if any.
    pub fn deadline_msec(&self) -> Option<u64> {
        self.deadline_msec
    }

    /// Returns `true` once the cancel flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        match self.cancel {
            Some(flag) => flag.load(Ordering::Relaxed),
            None => false,
        }
    }

    /// Returns `true` if the deadline has passed at clock value `now_msec`.
    pub fn is_expired(&self, now_msec: u64) -> bool {
        match self.deadline_msec {
            Some(deadline) => now_msec >= deadline,
            None => false,
        }
    }
}
