//! [`Environment`] implementation backed by turmoil's virtual clock.
//!
//! Turmoil intercepts `tokio::time::Instant` and `tokio::time::sleep` inside
//! a simulated host, so this is a thin pass-through rather than anything
//! turmoil-specific: the same driver code in `waypoint-server::connection`
//! runs unmodified, it just happens to be ticked by turmoil's scheduler
//! instead of a real OS clock.

use std::time::Duration;

use waypoint_core::Environment;

/// Simulation environment: virtual time, ticked by turmoil.
#[derive(Clone, Copy, Default)]
pub struct SimEnv;

impl SimEnv {
    /// Create a new simulation environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SimEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
