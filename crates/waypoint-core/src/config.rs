//! Immutable per-process configuration (spec §3, §3.1).

use std::time::Duration;

use serde::Deserialize;

use crate::auth::{self, KeyTable};

/// Text encoding the protocol is carried in.
///
/// Kept as a typed marker rather than assumed, so a future encoding is a
/// compile-time extension point rather than a silent behavior change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Encoding {
    /// 7-bit ASCII; the only encoding this protocol currently supports.
    Ascii,
}

/// Server configuration, read once at startup and shared read-only across
/// every session (spec §5: "read-only after startup, no synchronization
/// needed").
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Byte sequence ending every protocol message.
    pub terminator: Vec<u8>,
    /// Text encoding in effect.
    pub encoding: Encoding,
    /// Ordered `(server_key, client_key)` table; index is the Key ID.
    pub keys: KeyTable,
    /// Per-read inactivity bound while not recharging.
    pub timeout: Duration,
    /// Bound between a `RECHARGING` notification and `FULL POWER`.
    pub timeout_recharging: Duration,
    /// Per-robot forward-move budget.
    pub max_steps: u32,
    /// Upper bound on failed moves before the navigator gives up.
    pub max_obstacle_hits: u32,
}

/// Default forward-move budget.
///
/// The specification leaves this unbounded by default ("per-robot forward-
/// move budget", no stated constant); this value is generous enough not to
/// bound any session that would otherwise complete.
pub const DEFAULT_MAX_STEPS: u32 = 1000;

/// Default cap on failed moves (spec §3).
pub const DEFAULT_MAX_OBSTACLE_HITS: u32 = 20;

/// Default per-read inactivity bound (spec §3).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default recharge-wait bound (spec §3).
pub const DEFAULT_TIMEOUT_RECHARGING: Duration = Duration::from_secs(5);

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            terminator: waypoint_proto::DEFAULT_TERMINATOR.to_vec(),
            encoding: Encoding::Ascii,
            keys: auth::default_key_table(),
            timeout: DEFAULT_TIMEOUT,
            timeout_recharging: DEFAULT_TIMEOUT_RECHARGING,
            max_steps: DEFAULT_MAX_STEPS,
            max_obstacle_hits: DEFAULT_MAX_OBSTACLE_HITS,
        }
    }
}
