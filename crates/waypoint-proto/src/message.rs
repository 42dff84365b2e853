//! Syntactic validation and semantic decoding of client messages.
//!
//! Matching precedence is fixed: `RECHARGING` and `FULL POWER` are checked
//! before any phase-specific alternative (username or secret), since the
//! recharge overlay must be able to interrupt any phase.

use crate::errors::{ProtocolError, Result};

/// Literal recharge notification.
pub const RECHARGING: &[u8] = b"RECHARGING";

/// Literal resume notification.
pub const FULL_POWER: &[u8] = b"FULL POWER";

/// A decoded client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Free-form robot username.
    Username(Vec<u8>),
    /// Selected key id, syntactically valid but not yet range-checked.
    KeyId(i64),
    /// Client's confirmation number.
    Confirmation(i64),
    /// Movement acknowledgement with the robot's current coordinates.
    Ok { x: i64, y: i64 },
    /// Recharge notification.
    Recharging,
    /// Resume-from-recharge notification.
    FullPower,
    /// The secret payload retrieved at the origin.
    Secret(Vec<u8>),
}

/// Which message kind(s) the caller expects next.
///
/// `RECHARGING` and `FULL_POWER` are implicitly admissible in every phase
/// per the recharge overlay and are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A robot username.
    Username,
    /// A key id selection.
    KeyId,
    /// A client confirmation number.
    Confirmation,
    /// A movement acknowledgement.
    Ok,
    /// The secret payload.
    Secret,
}

/// Maximum payload length (excluding terminator) for each message kind, per
/// §6 of the specification.
pub const MAX_USERNAME_LEN: usize = 18;
pub const MAX_KEY_ID_LEN: usize = 3;
pub const MAX_CONFIRMATION_LEN: usize = 5;
pub const MAX_OK_LEN: usize = 10;
pub const MAX_RECHARGING_LEN: usize = RECHARGING.len();
pub const MAX_FULL_POWER_LEN: usize = FULL_POWER.len();
pub const MAX_SECRET_LEN: usize = 98;

/// Maximum admissible payload length for `expected`, accounting for the
/// `RECHARGING` alternative that is always admissible alongside it.
///
/// This is the `L` the framer must use: "the maximum over all admissible
/// alternatives at that point."
#[must_use]
pub fn max_len_for(expected: Expected) -> usize {
    let specific = match expected {
        Expected::Username => MAX_USERNAME_LEN,
        Expected::KeyId => MAX_KEY_ID_LEN,
        Expected::Confirmation => MAX_CONFIRMATION_LEN,
        Expected::Ok => MAX_OK_LEN,
        Expected::Secret => MAX_SECRET_LEN,
    };
    specific.max(MAX_RECHARGING_LEN).max(MAX_FULL_POWER_LEN)
}

/// Maximum admissible length while waiting out a recharge.
///
/// Any message is syntactically welcome here (only its literal value
/// matters to [`classify_recharge`]), so this is the widest of the
/// ordinary per-kind bounds rather than a phase-specific one.
#[must_use]
pub fn max_len_for_recharge() -> usize {
    MAX_SECRET_LEN.max(MAX_RECHARGING_LEN).max(MAX_FULL_POWER_LEN)
}

/// The only distinction that matters while a session is recharging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechargeEvent {
    /// The robot reported `FULL POWER`; the recharge is over.
    FullPower,
    /// Anything else, including a second `RECHARGING` — a protocol
    /// violation while recharging.
    Other,
}

/// Classify a payload received while a session is recharging.
///
/// Unlike [`classify`], this never fails: an unrecognized payload is simply
/// [`RechargeEvent::Other`], which the caller treats as a logic violation.
#[must_use]
pub fn classify_recharge(payload: &[u8]) -> RechargeEvent {
    if payload == FULL_POWER { RechargeEvent::FullPower } else { RechargeEvent::Other }
}

/// Classify a raw payload (terminator already stripped) against `expected`.
///
/// # Errors
///
/// Returns [`ProtocolError::Syntax`] if the payload matches neither
/// `RECHARGING`/`FULL POWER` nor the shape required by `expected`.
pub fn classify(payload: &[u8], expected: Expected) -> Result<ClientMessage> {
    if payload == RECHARGING {
        return Ok(ClientMessage::Recharging);
    }
    if payload == FULL_POWER {
        return Ok(ClientMessage::FullPower);
    }

    match expected {
        Expected::Username => Ok(ClientMessage::Username(payload.to_vec())),
        Expected::KeyId => parse_signed_decimal(payload).map(ClientMessage::KeyId),
        Expected::Confirmation => parse_signed_decimal(payload).map(ClientMessage::Confirmation),
        Expected::Ok => parse_ok(payload),
        Expected::Secret => {
            if payload.is_empty() {
                Err(ProtocolError::Syntax { reason: "secret message must not be empty" })
            } else {
                Ok(ClientMessage::Secret(payload.to_vec()))
            }
        },
    }
}

/// Range-check a syntactically valid key id against the key table length.
///
/// # Errors
///
/// Returns [`ProtocolError::KeyOutOfRange`] if `key_id` is outside
/// `[0, table_len)`. A negative key id (the minus sign "counts as a
/// number") is out of range, never a syntax error.
pub fn validate_key_id(key_id: i64, table_len: usize) -> Result<usize> {
    if key_id >= 0 && (key_id as usize) < table_len {
        Ok(key_id as usize)
    } else {
        Err(ProtocolError::KeyOutOfRange { key_id, table_len })
    }
}

/// Parse an optional minus sign followed by one or more decimal digits.
fn parse_signed_decimal(payload: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| ProtocolError::Syntax { reason: "not valid ASCII decimal" })?;

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::Syntax { reason: "expected optional '-' then decimal digits" });
    }

    let magnitude: i64 =
        digits.parse().map_err(|_| ProtocolError::Syntax { reason: "decimal value overflow" })?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse `"OK <int> <int>"`.
fn parse_ok(payload: &[u8]) -> Result<ClientMessage> {
    let rest = payload
        .strip_prefix(b"OK ")
        .ok_or(ProtocolError::Syntax { reason: "expected 'OK ' prefix" })?;

    let mut parts = rest.splitn(2, |&b| b == b' ');
    let x_part = parts.next().ok_or(ProtocolError::Syntax { reason: "missing x coordinate" })?;
    let y_part = parts.next().ok_or(ProtocolError::Syntax { reason: "missing y coordinate" })?;

    if y_part.contains(&b' ') {
        return Err(ProtocolError::Syntax { reason: "too many fields in OK message" });
    }

    let x = parse_signed_decimal(x_part)?;
    let y = parse_signed_decimal(y_part)?;

    Ok(ClientMessage::Ok { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recharging_takes_precedence_over_username() {
        assert_eq!(classify(RECHARGING, Expected::Username).unwrap(), ClientMessage::Recharging);
    }

    #[test]
    fn full_power_takes_precedence_over_secret() {
        assert_eq!(classify(FULL_POWER, Expected::Secret).unwrap(), ClientMessage::FullPower);
    }

    #[test]
    fn parses_plain_username() {
        assert_eq!(
            classify(b"Oompa Loompa", Expected::Username).unwrap(),
            ClientMessage::Username(b"Oompa Loompa".to_vec())
        );
    }

    #[test]
    fn parses_negative_key_id_as_syntactically_valid() {
        assert_eq!(classify(b"-1", Expected::KeyId).unwrap(), ClientMessage::KeyId(-1));
    }

    #[test]
    fn negative_key_id_is_out_of_range_not_syntax() {
        let err = validate_key_id(-1, 5).unwrap_err();
        assert!(matches!(err, ProtocolError::KeyOutOfRange { key_id: -1, table_len: 5 }));
    }

    #[test]
    fn key_id_within_range() {
        assert_eq!(validate_key_id(0, 5).unwrap(), 0);
        assert_eq!(validate_key_id(4, 5).unwrap(), 4);
    }

    #[test]
    fn key_id_at_upper_bound_is_out_of_range() {
        assert!(validate_key_id(5, 5).is_err());
    }

    #[test]
    fn rejects_non_decimal_key_id() {
        let err = classify(b"12a", Expected::KeyId).unwrap_err();
        assert!(matches!(err, ProtocolError::Syntax { .. }));
    }

    #[test]
    fn parses_ok_message() {
        assert_eq!(classify(b"OK 3 -5", Expected::Ok).unwrap(), ClientMessage::Ok { x: 3, y: -5 });
    }

    #[test]
    fn rejects_malformed_ok_message() {
        assert!(classify(b"OK 3", Expected::Ok).is_err());
        assert!(classify(b"OK 3 4 5", Expected::Ok).is_err());
        assert!(classify(b"3 4", Expected::Ok).is_err());
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(classify(b"", Expected::Secret).is_err());
    }

    #[test]
    fn max_len_for_username_accounts_for_recharging() {
        assert_eq!(max_len_for(Expected::Username), 18);
        assert_eq!(max_len_for(Expected::KeyId), 10); // RECHARGING is longer than 3
    }

    #[test]
    fn recharge_classification_only_recognizes_full_power() {
        assert_eq!(classify_recharge(FULL_POWER), RechargeEvent::FullPower);
        assert_eq!(classify_recharge(RECHARGING), RechargeEvent::Other);
        assert_eq!(classify_recharge(b"OK 1 2"), RechargeEvent::Other);
    }
}
