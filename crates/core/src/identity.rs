//! Voter and owner identities.

use crate::Error;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque 32-byte identity token.
///
/// Usually derived from an ed25519 public key with
/// [`Identity::from_public_key`], but any non-zero token is accepted: whoever
/// hands an identity to the election is responsible for having authenticated
/// it. The all-zero token is the null identity and is rejected everywhere.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(#[serde(with = "crate::serde_hex")] pub [u8; 32]);

impl Identity {
    /// The null identity.
    pub const NULL: Self = Self([0u8; 32]);

    /// Derive the identity of an ed25519 public key (BLAKE3 of the key bytes).
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        Self(*blake3::hash(key.as_bytes()).as_bytes())
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        crate::serde_hex::decode(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim().trim_start_matches("0x")).ok_or(Error::InvalidIdentity)
    }
}

impl From<&VerifyingKey> for Identity {
    fn from(key: &VerifyingKey) -> Self {
        Self::from_public_key(key)
    }
}
