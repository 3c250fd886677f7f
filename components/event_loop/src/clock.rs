//! Time sources for the event loop.
//!
//! The loop never reads time directly: it consults an injected [`Clock`].
//! Production code uses [`SystemClock`]; tests use [`VirtualClock`], which
//! only moves when explicitly advanced, making timer ordering fully
//! deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// `now` reports time elapsed since the clock's epoch and never decreases.
/// `sleep` waits until the given duration has passed on this clock; a
/// virtual clock simply advances itself, which is how the loop waits for a
/// future due-time without busy-polling.
pub trait Clock: Send + Sync {
    /// Returns the time elapsed since the clock's epoch.
    fn now(&self) -> Duration;

    /// Waits until `duration` has passed on this clock.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time, measured from the instant the clock was created.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A manually advanced clock for deterministic tests.
///
/// Time starts at zero and moves only through [`advance`](Self::advance)
/// (or [`Clock::sleep`], which advances by the requested amount). Hosts
/// typically share the clock with the loop via `Arc` and advance it
/// between ticks.
///
/// # Examples
///
/// ```
/// use event_loop::{Clock, VirtualClock};
/// use std::time::Duration;
///
/// let clock = VirtualClock::new();
/// assert_eq!(clock.now(), Duration::ZERO);
///
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.now(), Duration::from_millis(5));
/// ```
#[derive(Debug, Default)]
pub struct VirtualClock {
    now_nanos: AtomicU64,
}

impl VirtualClock {
    /// Creates a virtual clock at time zero.
    pub fn new() -> Self {
        Self {
            now_nanos: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.now_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
