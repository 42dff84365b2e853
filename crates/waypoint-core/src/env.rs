//! Environment abstraction for deterministic testing.
//!
//! Decouples the session driver from the system clock so the same driver
//! code can run against a virtual clock (`turmoil`, in `waypoint-harness`)
//! and against `std::time::Instant` in production, without a single `#[cfg]`
//! in either.

use std::time::Duration;

/// Abstract environment providing monotonic time and an async sleep.
///
/// # Safety
///
/// Implementations MUST guarantee `now()` never goes backwards within a
/// single execution context.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; simulation
    /// environments use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
