//! Error taxonomy for framing and message validation.

use thiserror::Error;

/// Result alias for the protocol layer.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while framing or validating a message.
///
/// Both variants map directly to a wire response (`SYNTAX ERROR` and
/// `KEY OUT OF RANGE` respectively); the session controller decides when to
/// send it and when to close.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A frame was malformed, oversized, or didn't match any admissible
    /// alternative for the phase it arrived in.
    #[error("syntax error: {reason}")]
    Syntax {
        /// Human-readable description, used only for logging.
        reason: &'static str,
    },

    /// A `KEY_ID` parsed as a valid signed integer but fell outside
    /// `[0, table_len)`.
    #[error("key id {key_id} out of range (table has {table_len} entries)")]
    KeyOutOfRange {
        /// The parsed key id.
        key_id: i64,
        /// Number of entries in the key table.
        table_len: usize,
    },
}
