//! Time abstraction for platform-agnostic timing.
//!
//! Provides the `TimeSource` trait consumed by telemetry fusion, so slew
//! limits and freshness windows can be tested without a real clock.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonic time source.
///
/// - `TokioClock` (in the host crate) reads `tokio::time::Instant`
/// - `MockTime` for host testing with controllable time
///
/// # Example
///
/// ```
/// use groundlink_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let start = time.now_us();
/// time.advance(20_000);
/// assert_eq!(time.elapsed_since(start), 20_000);
/// ```
pub trait TimeSource: Send + Sync {
    /// Returns current time in microseconds since an arbitrary epoch.
    fn now_us(&self) -> u64;

    /// Returns current time in milliseconds.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction so a reference in the future yields 0.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Mock time source with manual advancement.
///
/// Clones share the same counter, so a test can keep one handle while the
/// code under test owns another.
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Arc<AtomicU64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        let time = Self::default();
        time.set(us);
        time
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.store(us, Ordering::SeqCst);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.fetch_add(us, Ordering::SeqCst);
    }

    /// Advances the current time by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.load(Ordering::SeqCst)
    }
}
