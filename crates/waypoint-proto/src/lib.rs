//! Wire framing and message validation for the waypoint robot protocol.
//!
//! This crate has no knowledge of sockets, time, or session state: it turns
//! a stream of bytes into framed payloads ([`framer`]) and framed payloads
//! into typed messages ([`message`]). Everything here is pure and
//! synchronous so it can be exercised with plain unit tests and property
//! tests, independent of how bytes actually arrive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod framer;
pub mod message;
pub mod server_message;

pub use errors::{ProtocolError, Result};
pub use framer::{FrameOutcome, next_frame};
pub use message::{
    ClientMessage, Expected, RechargeEvent, classify, classify_recharge, max_len_for,
    max_len_for_recharge, validate_key_id,
};
pub use server_message::ServerMessage;

/// Default terminator: `\x07\x08` (BEL, BS).
pub const DEFAULT_TERMINATOR: &[u8] = b"\x07\x08";

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 9999;
