//! Retry with capped exponential backoff.

use core::fmt::Write as _;

use heapless::String;

use super::{Policy, PolicyChain};
use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::log::{self, Classification};
use crate::platform::Platform;

// Backoff sleeps are issued in slices this long so an external cancel
// aborts the wait promptly.
const CANCEL_POLL_MSEC: u64 = 100;

const MAX_RETRY_LOG_LEN: usize = 64;

/// Status codes worth re-attempting: request timeout, throttling, and the
/// transient 5xx family.
pub const DEFAULT_RETRYABLE_STATUS_CODES: &[u16] = &[408, 429, 500, 502, 503, 504];

/// Options for [`RetryPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    /// Maximum number of re-attempts after the initial one. Total attempts
    /// on persistent retryable failure is `max_retries + 1`.
    pub max_retries: u32,
    /// Base delay before the first re-attempt, in milliseconds.
    pub retry_delay_msec: u64,
    /// Upper bound every computed delay is clamped to, in milliseconds.
    pub max_retry_delay_msec: u64,
    /// Response status codes that make an otherwise-successful exchange
    /// worth re-attempting.
    pub retryable_status_codes: &'static [u16],
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 4,
            retry_delay_msec: 800,
            max_retry_delay_msec: 60_000,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES,
        }
    }
}

impl RetryOptions {
    /// The backoff delay before re-attempt number `attempt` (zero-based):
    /// `min(base << attempt, cap)`. Shift overflow saturates at the cap,
    /// so delays are non-decreasing and never exceed it.
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        match 1u64.checked_shl(attempt) {
            Some(factor) => self
                .retry_delay_msec
                .saturating_mul(factor)
                .min(self.max_retry_delay_msec),
            None => self.max_retry_delay_msec,
        }
    }
}

// What the retry loop should do with one attempt's outcome.
enum Verdict {
    Done,
    Retry,
}

/// Re-invokes the inner chain (credential, logging, transport) on
/// retryable failures, waiting out a capped exponential backoff between
/// attempts and rolling the request's headers back to the pre-attempt
/// mark so re-sent requests never accumulate duplicates.
#[derive(Debug)]
pub struct RetryPolicy<P: Platform> {
    options: RetryOptions,
    platform: P,
}

impl<P: Platform> RetryPolicy<P> {
    /// Creates the policy from its options and the platform clock/sleep.
    pub fn new(options: RetryOptions, platform: P) -> Self {
        Self { options, platform }
    }

    fn verdict(&self, result: &Result<(), Error>, response: &Response) -> Verdict {
        match result {
            Ok(()) => {
                if self
                    .options
                    .retryable_status_codes
                    .contains(&response.status_code)
                {
                    Verdict::Retry
                } else {
                    Verdict::Done
                }
            }
            Err(error) => {
                if error_is_retryable(*error) {
                    Verdict::Retry
                } else {
                    Verdict::Done
                }
            }
        }
    }

    // Blocks for `delay_msec`, honoring the context. Refuses to start a
    // wait that cannot finish before the deadline.
    fn wait(&mut self, request: &Request<'_>, delay_msec: u64) -> Result<(), Error> {
        let context = request.context();
        if context.is_cancelled() {
            return Err(Error::Canceled);
        }
        let now = self.platform.clock_msec();
        if context.is_expired(now.saturating_add(delay_msec)) {
            return Err(Error::Canceled);
        }

        let mut remaining = delay_msec;
        while remaining > 0 {
            let slice = remaining.min(CANCEL_POLL_MSEC);
            self.platform.sleep_msec(slice);
            remaining -= slice;
            if context.is_cancelled() {
                return Err(Error::Canceled);
            }
        }
        Ok(())
    }
}

impl<P: Platform> Policy for RetryPolicy<P> {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        let mark = request.headers_mark();
        let mut attempt: u32 = 0;

        loop {
            // Strip whatever the inner stages appended during the previous
            // attempt; legitimately-changing fields (a refreshed token) are
            // re-applied by those stages on the way back down.
            request.rollback_headers(mark);

            if request.context().is_cancelled()
                || request.context().is_expired(self.platform.clock_msec())
            {
                return Err(Error::Canceled);
            }

            let result = next.process(request, response);

            match self.verdict(&result, response) {
                Verdict::Done => return result,
                Verdict::Retry if attempt < self.options.max_retries => {
                    let delay_msec = self.options.delay_for_attempt(attempt);

                    if log::should_write(Classification::HttpRetry) {
                        let mut message: String<MAX_RETRY_LOG_LEN> = String::new();
                        let _ = write!(
                            message,
                            "retry #{} in {} msec",
                            attempt + 1,
                            delay_msec
                        );
                        log::write(Classification::HttpRetry, message.as_str());
                    }

                    self.wait(request, delay_msec)?;
                    attempt += 1;
                }
                // Budget exhausted: surface the last attempt's outcome
                // unchanged (a retryable status is still a completed
                // exchange, not an error).
                Verdict::Retry => return result,
            }
        }
    }
}

fn error_is_retryable(error: Error) -> bool {
    matches!(
        error,
        Error::ConnectionRefused
            | Error::ConnectionClosed
            | Error::ReadError
            | Error::WriteError
            | Error::Timeout
    )
}
