//! Production [`Environment`] implementation using system time.
//!
//! There is no randomness to supply here — unlike a keying/session-id
//! scheme, this protocol derives everything from the wire (username, key
//! id, coordinates), so the production environment only needs a clock.

use std::time::Duration;

use waypoint_core::Environment;

/// Production environment backed by `std::time::Instant` and
/// `tokio::time::sleep`.
#[derive(Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
