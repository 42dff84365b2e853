//! Terminal outcomes for a session (spec §7).
//!
//! These are not `Result`-style failures the caller recovers from — a
//! `Session` never returns an `Err` from its transition methods, it always
//! produces the actions the protocol demands. This enum exists so the
//! runtime can log each terminal condition at the level its taxonomy entry
//! calls for (§7.1) without pattern-matching on encoded wire bytes.

use thiserror::Error;

/// Why a session ended.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Oversize frame, malformed content, or wrong alternative for the
    /// current phase.
    #[error("syntax error")]
    SyntaxError,
    /// A numerically valid Key ID fell outside the key table.
    #[error("key id out of range")]
    KeyOutOfRange,
    /// The client's confirmation number did not match.
    #[error("login failed")]
    LoginFailed,
    /// A recharge-protocol rule was violated.
    #[error("logic error")]
    LogicError,
    /// The step or obstacle-hit budget was exhausted before reaching the
    /// origin. Carries no wire response.
    #[error("step or obstacle budget exhausted")]
    Exhausted,
}

impl SessionError {
    /// Whether this outcome has a corresponding wire response.
    ///
    /// `Exhausted` (and the runtime-only `Timeout`, tracked outside this
    /// enum since a `Session` has no notion of time) close silently.
    #[must_use]
    pub fn has_response(self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_has_no_wire_response() {
        assert!(!SessionError::Exhausted.has_response());
        assert!(SessionError::SyntaxError.has_response());
        assert!(SessionError::LoginFailed.has_response());
    }
}
