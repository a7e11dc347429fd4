//! Process-wide, lock-free logging for pipeline instrumentation.
//!
//! The logging policy (and any other instrumented code, such as a device
//! protocol layer) reports what it is doing as `(classification, message)`
//! pairs. The host application decides whether anyone listens:
//!
//! - [`set_callback`] registers at most one receiving function; with no
//!   callback registered, a log attempt is cheap and side-effect free.
//! - [`set_classifications`] registers a caller-owned, sentinel-terminated
//!   filter list; with no list registered, every classification is
//!   delivered.
//!
//! Both registrations are plain atomic pointer replacements. Readers racing
//! a registration may observe the old or the new value of either field,
//! which is acceptable for advisory logging, but they can never observe a
//! torn pointer, and no blocking lock ever sits on the request path.
//!
//! [`should_write`] answers "would this classification be delivered right
//! now" without formatting or copying anything, so callers can skip
//! expensive message assembly entirely when no one is listening:
//!
//! ```rust
//! use libcloud::log::{self, Classification};
//!
//! if log::should_write(Classification::DeviceToken) {
//!     // build the message only now
//!     log::write(Classification::DeviceToken, "token refreshed");
//! }
//! ```

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// Identifies the origin and kind of a log message.
///
/// The set is closed: instrumented code in this crate and in device
/// protocol layers built on it only ever emits the tags below.
/// [`Classification::EndOfList`] is not a real classification; it exists
/// solely to terminate a caller-supplied filter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A request is about to be handed to the transport.
    HttpRequest,
    /// A response (or transport failure) came back from the wire.
    HttpResponse,
    /// The retry policy scheduled another attempt.
    HttpRetry,
    /// A device protocol layer received a topic.
    DeviceReceivedTopic,
    /// A device protocol layer received a payload.
    DeviceReceivedPayload,
    /// A device protocol layer is retrying an operation.
    DeviceRetry,
    /// A device protocol layer produced or refreshed a token.
    DeviceToken,
    /// Platform-level device diagnostics.
    DevicePlatform,
    /// Terminates a filter list. Never a message's own classification.
    EndOfList,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Classification {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Classification::HttpRequest => defmt::write!(f, "HttpRequest"),
            Classification::HttpResponse => defmt::write!(f, "HttpResponse"),
            Classification::HttpRetry => defmt::write!(f, "HttpRetry"),
            Classification::DeviceReceivedTopic => defmt::write!(f, "DeviceReceivedTopic"),
            Classification::DeviceReceivedPayload => defmt::write!(f, "DeviceReceivedPayload"),
            Classification::DeviceRetry => defmt::write!(f, "DeviceRetry"),
            Classification::DeviceToken => defmt::write!(f, "DeviceToken"),
            Classification::DevicePlatform => defmt::write!(f, "DevicePlatform"),
            Classification::EndOfList => defmt::write!(f, "EndOfList"),
        }
    }
}

/// Receives `(classification, message)` pairs that pass the filter.
pub type Callback = fn(Classification, &str);

// Registration replaces these wholesale; log attempts load each exactly
// once. Relaxed suffices: the contract is torn-read freedom per field, not
// ordering between the two fields.
static CLASSIFICATIONS: AtomicPtr<Classification> = AtomicPtr::new(ptr::null_mut());
static CALLBACK: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Registers the classification filter list, or clears it with `None`
/// (meaning "log everything").
///
/// The list is caller-owned and `'static`; the registry only stores a
/// pointer to it. It must be terminated by [`Classification::EndOfList`].
///
/// # Panics
///
/// Panics if the list does not contain the terminating sentinel. The
/// membership walk stops at the sentinel, so an unterminated list would
/// read past the caller's array.
pub fn set_classifications(classifications: Option<&'static [Classification]>) {
    match classifications {
        Some(list) => {
            assert!(
                list.contains(&Classification::EndOfList),
                "classification filter list must be terminated by EndOfList"
            );
            CLASSIFICATIONS.store(list.as_ptr() as *mut Classification, Ordering::Relaxed);
        }
        None => CLASSIFICATIONS.store(ptr::null_mut(), Ordering::Relaxed),
    }
}

/// Registers the message callback, or clears it with `None`. The last
/// write wins; replacing the callback affects only subsequent log
/// attempts.
pub fn set_callback(callback: Option<Callback>) {
    let raw = match callback {
        Some(callback) => callback as *mut (),
        None => ptr::null_mut(),
    };
    CALLBACK.store(raw, Ordering::Relaxed);
}

// Shared engine behind `should_write` and `write`.
//
// With `log_it` false it only answers whether the message would be
// delivered; with `log_it` true it additionally delivers it. Both loads
// happen once up front so the decision and the delivery agree even if a
// registration races this call.
#[allow(unsafe_code)]
fn write_engine(log_it: bool, classification: Classification, message: &str) -> bool {
    let raw_callback = CALLBACK.load(Ordering::Relaxed);
    let raw_classifications = CLASSIFICATIONS.load(Ordering::Relaxed);

    if raw_callback.is_null() {
        // No one is listening.
        return false;
    }
    // SAFETY: non-null values stored in CALLBACK originate exclusively
    // from a `Callback` fn pointer cast in `set_callback`.
    let callback: Callback = unsafe { core::mem::transmute(raw_callback) };

    if raw_classifications.is_null() {
        // No filter registered: log everything.
        if log_it {
            callback(classification, message);
        }
        return true;
    }

    let mut cls = raw_classifications as *const Classification;
    // SAFETY: non-null values stored in CLASSIFICATIONS point at the first
    // element of a caller-owned `'static` slice that `set_classifications`
    // verified contains the EndOfList sentinel, so this walk stays inside
    // the slice.
    while unsafe { *cls } != Classification::EndOfList {
        // If this message's classification is in the caller-provided list,
        // it should be logged.
        if unsafe { *cls } == classification {
            if log_it {
                callback(classification, message);
            }
            return true;
        }
        // SAFETY: the current element was not the sentinel, so at least
        // one more element exists before it.
        cls = unsafe { cls.add(1) };
    }

    false
}

/// Returns whether a message with this classification would be delivered
/// right now, without formatting or delivering anything.
pub fn should_write(classification: Classification) -> bool {
    write_engine(false, classification, "")
}

/// Delivers `message` to the registered callback if its classification
/// passes the current filter; otherwise does nothing.
pub fn write(classification: Classification, message: &str) {
    debug_assert!(
        classification != Classification::EndOfList,
        "EndOfList is a list terminator, not a message classification"
    );
    let _ = write_engine(true, classification, message);
}
