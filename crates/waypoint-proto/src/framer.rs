//! Terminator-delimited framing with early rejection of oversized messages.
//!
//! The framer holds no socket and no payload of its own: callers own a
//! carry-over buffer (bytes read but not yet consumed into a complete
//! message) and call [`next_frame`] after every read. This lets the same
//! logic run against a live `TcpStream`, a `turmoil` virtual socket, or a
//! `Vec<u8>` split at arbitrary points in a test.

use crate::errors::{ProtocolError, Result};

/// Outcome of attempting to frame the next message out of a carry-over
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A complete message was found within the length budget.
    ///
    /// The returned bytes exclude the terminator. The caller's buffer has
    /// had the frame (including the terminator) drained from its front.
    Frame(Vec<u8>),

    /// No terminator has appeared yet and the buffer is not yet provably
    /// oversize. Wait for more bytes.
    Incomplete,
}

/// Attempt to extract the next complete message from `buf`.
///
/// `max_len` is the maximum payload length (excluding the terminator)
/// admissible for whichever message kind(s) are expected next — when more
/// than one kind is admissible (e.g. a username or a `RECHARGING`
/// notification), pass the maximum over all admissible alternatives.
///
/// # Errors
///
/// Returns [`ProtocolError::Syntax`] if a terminator is found past `max_len`,
/// or if the buffer has grown past the point where any eventual terminator
/// could still land within `max_len`.
pub fn next_frame(buf: &mut Vec<u8>, terminator: &[u8], max_len: usize) -> Result<FrameOutcome> {
    debug_assert!(!terminator.is_empty());

    if let Some(pos) = find_terminator(buf, terminator) {
        if pos > max_len {
            return Err(ProtocolError::Syntax { reason: "message exceeds maximum length" });
        }

        let payload = buf[..pos].to_vec();
        buf.drain(..pos + terminator.len());
        return Ok(FrameOutcome::Frame(payload));
    }

    // No full terminator is present, but its tail bytes may already be
    // sitting in `buf` as a partial match (e.g. just the first byte of a
    // two-byte terminator) — those bytes could still become the start of
    // an in-budget terminator once the rest arrives, so they don't count
    // against the payload. Anything before that partial match is
    // guaranteed payload, because `find_terminator` already ruled out a
    // full match anywhere else in `buf`.
    let partial = partial_terminator_prefix_len(buf, terminator);
    if buf.len() - partial > max_len {
        return Err(ProtocolError::Syntax { reason: "message exceeds maximum length" });
    }

    Ok(FrameOutcome::Incomplete)
}

/// Find the first occurrence of `terminator` in `buf`, if any.
fn find_terminator(buf: &[u8], terminator: &[u8]) -> Option<usize> {
    if terminator.len() > buf.len() {
        return None;
    }
    buf.windows(terminator.len()).position(|window| window == terminator)
}

/// Length of the longest suffix of `buf` that equals a proper prefix of
/// `terminator` — the number of trailing bytes that could still grow into a
/// terminator match as more bytes arrive. Zero if `buf` doesn't end with any
/// prefix of `terminator`.
fn partial_terminator_prefix_len(buf: &[u8], terminator: &[u8]) -> usize {
    let max_k = (terminator.len() - 1).min(buf.len());
    (1..=max_k).rev().find(|&k| buf[buf.len() - k..] == terminator[..k]).unwrap_or(0)
}
