//! Keyed-hash authentication handshake (spec §4.3).
//!
//! The handshake has no state of its own beyond a username hash and a key
//! lookup; every function here is pure so the arithmetic identity in the
//! specification's testable properties (`((hash+s)+c) mod 2^16 == (hash+s+c)
//! mod 2^16`) can be checked directly.

use serde::Deserialize;

const MODULUS: u32 = 1 << 16;

/// One row of the key table: the value the server adds to authenticate
/// itself, and the value the client is expected to add back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct KeyPair {
    /// Added to the username hash to produce the server confirmation.
    pub server: u16,
    /// Added to the username hash to produce the expected client
    /// confirmation.
    pub client: u16,
}

/// Ordered table of `(server_key, client_key)` pairs; index is the Key ID.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct KeyTable(Vec<KeyPair>);

impl KeyTable {
    /// Build a key table from an ordered list of pairs.
    #[must_use]
    pub fn new(pairs: Vec<KeyPair>) -> Self {
        Self(pairs)
    }

    /// Number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the key pair at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&KeyPair> {
        self.0.get(index)
    }
}

impl FromIterator<KeyPair> for KeyTable {
    fn from_iter<T: IntoIterator<Item = KeyPair>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The key table the protocol ships with out of the box: a single entry at
/// Key ID 0, `(server: 23019, client: 32037)`, matching the canonical
/// worked example in the specification's testable properties.
#[must_use]
pub fn default_key_table() -> KeyTable {
    KeyTable::new(vec![KeyPair { server: 23_019, client: 32_037 }])
}

/// Compute `(sum_of_byte_values(username) * 1000) mod 2^16`.
///
/// The sum is accumulated in 64-bit arithmetic before scaling and reducing,
/// so usernames at the protocol's 18-byte limit cannot overflow the
/// intermediate product.
#[must_use]
pub fn username_hash(username: &[u8]) -> u16 {
    let sum: u64 = username.iter().map(|&b| u64::from(b)).sum();
    ((sum * 1000) % u64::from(MODULUS)) as u16
}

/// Compute the server confirmation number sent after a key id is selected.
#[must_use]
pub fn server_confirmation(hash: u16, key: &KeyPair) -> u16 {
    ((u32::from(hash) + u32::from(key.server)) % MODULUS) as u16
}

/// Compute the client confirmation number the client is expected to send
/// back.
#[must_use]
pub fn expected_client_confirmation(hash: u16, key: &KeyPair) -> u16 {
    ((u32::from(hash) + u32::from(key.client)) % MODULUS) as u16
}

/// Check a claimed client confirmation (decoded as a signed integer, which
/// may be negative or exceed `u16::MAX`) against the expected value.
#[must_use]
pub fn client_confirmation_matches(hash: u16, key: &KeyPair, claimed: i64) -> bool {
    let expected = i64::from(expected_client_confirmation(hash, key));
    claimed == expected
}
