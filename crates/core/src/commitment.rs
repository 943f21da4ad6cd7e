//! Sealed-ballot commitment scheme.
//!
//! A voter picks a candidate and a random 32-byte salt, and publishes only
//! `H(candidate_id || salt)` during the commit phase. During the reveal phase
//! they disclose both values and anyone can recompute the hash.
//!
//! `H` is BLAKE3-256 over a fixed 64-byte message: the candidate id as a
//! 256-bit big-endian integer followed by the salt. This is the packed
//! `(uint256, bytes32)` layout, so a candidate id can never bleed into the
//! salt bytes.

use crate::{Error, Hash};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the encoded commitment message.
pub const MESSAGE_LEN: usize = 64;

/// A caller-chosen secret that blinds the candidate choice.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(#[serde(with = "crate::serde_hex")] pub [u8; 32]);

impl Salt {
    /// Draw a fresh salt from the operating system CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        crate::serde_hex::decode(s).map(Self)
    }
}

// Never print salt bytes.
impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(..)")
    }
}

impl FromStr for Salt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim().trim_start_matches("0x")).ok_or(Error::InvalidHash)
    }
}

/// Encode `candidate_id || salt` as the committed message.
pub fn encode(candidate_id: u64, salt: &Salt) -> [u8; MESSAGE_LEN] {
    let mut message = [0u8; MESSAGE_LEN];
    message[24..32].copy_from_slice(&candidate_id.to_be_bytes());
    message[32..].copy_from_slice(&salt.0);
    message
}

/// Compute the commitment for a candidate choice.
pub fn commit(candidate_id: u64, salt: &Salt) -> Hash {
    Hash::of(&encode(candidate_id, salt))
}

/// Check a revealed `(candidate_id, salt)` against a stored commitment.
///
/// The comparison runs in constant time.
pub fn verify_reveal(stored: &Hash, candidate_id: u64, salt: &Salt) -> bool {
    let recomputed = blake3::hash(&encode(candidate_id, salt));
    recomputed == blake3::Hash::from(stored.0)
}
