//! Platform seam for time-dependent pipeline behavior.
//!
//! The retry policy needs two things no portable crate can provide on bare
//! metal: a monotonic millisecond clock for deadline arithmetic and a
//! blocking sleep for backoff waits. The target platform supplies both by
//! implementing [`Platform`], the same way it supplies a socket by
//! implementing the [`network`](crate::network) traits.

/// A trait for platform-specific time functionality.
///
/// This trait must be implemented by the target platform to provide the
/// clock and sleep the retry policy's backoff logic relies on.
pub trait Platform {
    /// Returns a monotonic millisecond tick. The epoch is arbitrary; only
    /// differences and comparisons against [`Context`] deadlines matter.
    ///
    /// [`Context`]: crate::context::Context
    fn clock_msec(&mut self) -> u64;

    /// Blocks the calling thread for `msec` milliseconds.
    ///
    /// Backoff waits are issued in small slices, so an implementation may
    /// be as coarse as a busy-wait without hurting cancellation latency.
    fn sleep_msec(&mut self, msec: u64);
}
