//! Time sources and the expiration timer used by the TTL cache.
//!
//! The TTL cache never sleeps or spawns anything. It reads the current time
//! from a [`Clock`] and keeps an [`ExpirationTimer`]: a one-shot deadline that
//! can be armed, re-armed and cancelled. Due deadlines are serviced on the
//! cache's own thread, at the start of the next operation (or an explicit
//! `tick`), so rotation never races with other mutations.
//!
//! - [`SystemClock`]: monotonic wall time (`Instant`).
//! - [`ManualClock`]: a shared, manually advanced time for tests and
//!   simulations.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
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
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give another
/// to the cache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sectorkit::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(40));
/// assert_eq!(clock.now(), Duration::from_millis(40));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(saturating_nanos(by), Ordering::Relaxed);
    }

    /// Jumps to an absolute time. Moving backwards is ignored.
    pub fn set(&self, at: Duration) {
        self.nanos.fetch_max(saturating_nanos(at), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[inline]
fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Cancelable one-shot deadline with a fixed period.
///
/// Models "invoke a callback after `period`, unless cancelled first". The
/// owner polls [`is_due`](Self::is_due) and runs the callback itself.
#[derive(Debug, Clone, Copy)]
pub struct ExpirationTimer {
    period: Duration,
    deadline: Option<Duration>,
}

impl ExpirationTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Pending deadline, if armed.
    #[inline]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Schedules the next fire at `now + period`, replacing any pending one.
    pub fn arm(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.period));
    }

    /// Schedules the next fire one period after the current deadline.
    ///
    /// Keeps a steady cadence when several deadlines are serviced late.
    /// Behaves like [`arm`](Self::arm) when nothing is pending.
    pub fn rearm_from_deadline(&mut self, now: Duration) {
        let base = self.deadline.unwrap_or(now);
        self.deadline = Some(base.saturating_add(self.period));
    }

    /// Cancels the pending fire. Cancelling twice is a no-op.
    #[inline]
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` if armed and the deadline has passed.
    #[inline]
    pub fn is_due(&self, now: Duration) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Number of fires that would have happened by `now`, capped at `limit`.
    ///
    /// Assumes each fire re-arms from its own deadline.
    pub fn fires_by(&self, now: Duration, limit: usize) -> usize {
        let Some(deadline) = self.deadline else {
            return 0;
        };
        if now < deadline {
            return 0;
        }
        let period = self.period.as_nanos().max(1);
        let extra = (now - deadline).as_nanos() / period;
        usize::try_from(extra)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
            .min(limit)
    }
}
