use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use libcloud::context::Context;
use libcloud::error::Error;
use libcloud::http::policy::{Policy, PolicyChain, RetryOptions, RetryPolicy};
use libcloud::http::request::Request;
use libcloud::http::response::Response;
use libcloud::http::Method;
use libcloud::platform::Platform;

fn request<'a>(context: Context<'a>) -> Request<'a> {
    Request::new(context, Method::Put, "https://host/container/blob", b"body").unwrap()
}

/// Records its name when invoked, delegates, then records the forwarded
/// result so tests can see what flowed back up the chain.
struct RecordingPolicy {
    name: &'static str,
    trace: Rc<RefCell<Vec<String>>>,
}

impl Policy for RecordingPolicy {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        response: &mut Response,
        next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        self.trace.borrow_mut().push(format!("{}:enter", self.name));
        let result = next.process(request, response);
        self.trace
            .borrow_mut()
            .push(format!("{}:{}", self.name, if result.is_ok() { "ok" } else { "err" }));
        result
    }
}

/// Terminal stage stand-in: scripted results per attempt, never delegates.
struct StubTransport {
    attempts: Rc<RefCell<u32>>,
    script: Vec<Result<u16, Error>>,
}

impl StubTransport {
    fn new(script: Vec<Result<u16, Error>>) -> Self {
        Self {
            attempts: Rc::new(RefCell::new(0)),
            script,
        }
    }

    fn attempts(&self) -> Rc<RefCell<u32>> {
        Rc::clone(&self.attempts)
    }
}

impl Policy for StubTransport {
    fn process(
        &mut self,
        _request: &mut Request<'_>,
        response: &mut Response,
        _next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        let attempt = *self.attempts.borrow() as usize;
        *self.attempts.borrow_mut() += 1;
        response.reset();
        let outcome = self
            .script
            .get(attempt)
            .copied()
            .unwrap_or_else(|| *self.script.last().unwrap());
        match outcome {
            Ok(status) => {
                response.status_code = status;
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

/// A failing policy that never delegates.
struct FailingPolicy(Error);

impl Policy for FailingPolicy {
    fn process(
        &mut self,
        _request: &mut Request<'_>,
        _response: &mut Response,
        _next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        Err(self.0)
    }
}

/// Appends a header on every attempt before failing retryably, to prove
/// rollback strips it again between attempts.
struct HeaderAppendingTransport {
    attempts: Rc<RefCell<u32>>,
    headers_seen: Rc<RefCell<Vec<usize>>>,
}

impl Policy for HeaderAppendingTransport {
    fn process(
        &mut self,
        request: &mut Request<'_>,
        _response: &mut Response,
        _next: &mut PolicyChain<'_, '_>,
    ) -> Result<(), Error> {
        *self.attempts.borrow_mut() += 1;
        request.append_header("x-attempt-scoped", "1").unwrap();
        self.headers_seen.borrow_mut().push(request.headers().len());
        Err(Error::Timeout)
    }
}

/// Test clock: sleeping advances time; every sleep slice is recorded.
struct MockPlatform {
    now: Rc<RefCell<u64>>,
    slept: Rc<RefCell<u64>>,
    cancel_after_msec: Option<(u64, &'static AtomicBool)>,
}

impl MockPlatform {
    fn new() -> Self {
        Self {
            now: Rc::new(RefCell::new(0)),
            slept: Rc::new(RefCell::new(0)),
            cancel_after_msec: None,
        }
    }
}

impl Platform for MockPlatform {
    fn clock_msec(&mut self) -> u64 {
        *self.now.borrow()
    }

    fn sleep_msec(&mut self, msec: u64) {
        *self.now.borrow_mut() += msec;
        *self.slept.borrow_mut() += msec;
        if let Some((after, flag)) = self.cancel_after_msec {
            if *self.now.borrow() >= after {
                flag.store(true, Ordering::Relaxed);
            }
        }
    }
}

fn retry_options(max_retries: u32) -> RetryOptions {
    RetryOptions {
        max_retries,
        retry_delay_msec: 100,
        max_retry_delay_msec: 1_000,
        ..RetryOptions::default()
    }
}

#[test]
fn policies_execute_in_configured_order() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut p1 = RecordingPolicy {
        name: "p1",
        trace: Rc::clone(&trace),
    };
    let mut p2 = RecordingPolicy {
        name: "p2",
        trace: Rc::clone(&trace),
    };
    let mut transport = StubTransport::new(vec![Ok(200)]);

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 3] = [&mut p1, &mut p2, &mut transport];
    PolicyChain::new(&mut policies)
        .process(&mut request, &mut response)
        .unwrap();

    assert_eq!(
        *trace.borrow(),
        vec!["p1:enter", "p2:enter", "p2:ok", "p1:ok"]
    );
    assert_eq!(response.status_code, 200);
}

#[test]
fn failing_policy_short_circuits_and_outer_stage_sees_the_error() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut p1 = RecordingPolicy {
        name: "p1",
        trace: Rc::clone(&trace),
    };
    let mut p2 = FailingPolicy(Error::AuthenticationFailed);
    let mut transport = StubTransport::new(vec![Ok(200)]);
    let attempts = transport.attempts();

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 3] = [&mut p1, &mut p2, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Err(Error::AuthenticationFailed));
    assert_eq!(*attempts.borrow(), 0, "transport must never be invoked");
    assert_eq!(*trace.borrow(), vec!["p1:enter", "p1:err"]);
}

#[test]
fn delegating_past_the_terminal_stage_is_an_error() {
    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 0] = [];
    assert_eq!(
        PolicyChain::new(&mut policies).process(&mut request, &mut response),
        Err(Error::EmptyPipeline)
    );
}

#[test]
fn persistent_retryable_failure_makes_max_retries_plus_one_attempts() {
    let mut retry = RetryPolicy::new(retry_options(3), MockPlatform::new());
    let mut transport = StubTransport::new(vec![Err(Error::Timeout)]);
    let attempts = transport.attempts();

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Err(Error::Timeout));
    assert_eq!(*attempts.borrow(), 4);
}

#[test]
fn backoff_sleeps_add_up_to_the_computed_delays() {
    let platform = MockPlatform::new();
    let slept = Rc::clone(&platform.slept);
    let options = retry_options(3);
    let expected: u64 = (0..3).map(|a| options.delay_for_attempt(a)).sum();

    let mut retry = RetryPolicy::new(options, platform);
    let mut transport = StubTransport::new(vec![Err(Error::ReadError)]);

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let _ = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(*slept.borrow(), expected);
}

#[test]
fn retryable_status_code_is_retried_and_surfaced_as_success() {
    let mut retry = RetryPolicy::new(retry_options(2), MockPlatform::new());
    let mut transport = StubTransport::new(vec![Ok(503)]);
    let attempts = transport.attempts();

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    // Exhaustion surfaces the last completed exchange, not an error.
    assert_eq!(result, Ok(()));
    assert_eq!(response.status_code, 503);
    assert_eq!(*attempts.borrow(), 3);
}

#[test]
fn eventual_success_stops_retrying() {
    let mut retry = RetryPolicy::new(retry_options(5), MockPlatform::new());
    let mut transport = StubTransport::new(vec![Err(Error::Timeout), Ok(503), Ok(201)]);
    let attempts = transport.attempts();

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Ok(()));
    assert_eq!(response.status_code, 201);
    assert_eq!(*attempts.borrow(), 3);
}

#[test]
fn non_retryable_error_propagates_without_consuming_budget() {
    let mut retry = RetryPolicy::new(retry_options(5), MockPlatform::new());
    let mut transport = StubTransport::new(vec![Err(Error::MalformedResponse)]);
    let attempts = transport.attempts();

    let mut request = request(Context::background());
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Err(Error::MalformedResponse));
    assert_eq!(*attempts.borrow(), 1);
}

#[test]
fn headers_are_rolled_back_before_every_reattempt() {
    let attempts = Rc::new(RefCell::new(0));
    let headers_seen = Rc::new(RefCell::new(Vec::new()));
    let mut retry = RetryPolicy::new(retry_options(3), MockPlatform::new());
    let mut transport = HeaderAppendingTransport {
        attempts: Rc::clone(&attempts),
        headers_seen: Rc::clone(&headers_seen),
    };

    let mut request = request(Context::background());
    request.append_header("x-outer", "stays").unwrap();
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let _ = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(*attempts.borrow(), 4);
    // Every attempt saw the outer header plus exactly its own appended one.
    assert_eq!(*headers_seen.borrow(), vec![2, 2, 2, 2]);
}

#[test]
fn precancelled_context_aborts_before_the_first_attempt() {
    static CANCEL: AtomicBool = AtomicBool::new(false);
    CANCEL.store(true, Ordering::Relaxed);

    let mut retry = RetryPolicy::new(retry_options(3), MockPlatform::new());
    let mut transport = StubTransport::new(vec![Ok(200)]);
    let attempts = transport.attempts();

    let context = Context::background().with_cancel(&CANCEL);
    let mut request = request(context);
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Err(Error::Canceled));
    assert_eq!(*attempts.borrow(), 0);
    CANCEL.store(false, Ordering::Relaxed);
}

#[test]
fn cancellation_during_backoff_aborts_the_wait() {
    static CANCEL: AtomicBool = AtomicBool::new(false);
    CANCEL.store(false, Ordering::Relaxed);

    let mut platform = MockPlatform::new();
    // Raise the flag partway through the first backoff wait.
    platform.cancel_after_msec = Some((50, &CANCEL));
    let mut retry = RetryPolicy::new(retry_options(3), platform);
    let mut transport = StubTransport::new(vec![Err(Error::Timeout)]);
    let attempts = transport.attempts();

    let context = Context::background().with_cancel(&CANCEL);
    let mut request = request(context);
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Err(Error::Canceled));
    assert_eq!(*attempts.borrow(), 1, "no further attempts after cancel");
    CANCEL.store(false, Ordering::Relaxed);
}

#[test]
fn backoff_that_cannot_finish_before_the_deadline_is_cancelled() {
    let mut retry = RetryPolicy::new(retry_options(3), MockPlatform::new());
    let mut transport = StubTransport::new(vec![Err(Error::Timeout)]);
    let attempts = transport.attempts();

    // Clock starts at 0; the first backoff of 100 msec would end exactly
    // at the deadline, so the wait is refused.
    let context = Context::background().with_deadline(100);
    let mut request = request(context);
    let mut response = Response::new();
    let mut policies: [&mut dyn Policy; 2] = [&mut retry, &mut transport];
    let result = PolicyChain::new(&mut policies).process(&mut request, &mut response);

    assert_eq!(result, Err(Error::Canceled));
    assert_eq!(*attempts.borrow(), 1);
}
