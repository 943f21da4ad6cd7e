//! Error types for sealvote-core.

use thiserror::Error;

use crate::{Identity, Phase};

/// Every way an election operation or transaction can be refused.
///
/// All of these are precondition failures: when one is returned, nothing has
/// been mutated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An administrative operation was attempted by someone other than the owner.
    #[error("caller is not the election owner")]
    NotOwner,

    /// The operation is not legal in the current phase.
    #[error("invalid phase for this operation: requires {required}, election is in {actual}")]
    WrongPhase { required: Phase, actual: Phase },

    /// Caller (or the identity being removed) is not an eligible voter.
    #[error("not an eligible voter")]
    NotEligible,

    #[error("already registered")]
    AlreadyRegistered,

    /// The null identity, or a token that is not 32 bytes of hex.
    #[error("invalid identity")]
    InvalidIdentity,

    #[error("no voters registered")]
    NoVotersRegistered,

    #[error("already committed")]
    AlreadyCommitted,

    /// The zero commitment, or a token that is not 32 bytes of hex.
    #[error("invalid hash")]
    InvalidHash,

    #[error("no commitment to reveal")]
    NotCommitted,

    #[error("hash mismatch - invalid reveal")]
    HashMismatchInvalidReveal,

    #[error("already revealed")]
    AlreadyRevealed,

    #[error("invalid candidate: {0}")]
    InvalidCandidate(u64),

    #[error("election name required")]
    ElectionNameRequired,

    #[error("name required for candidate {0}")]
    CandidateNameRequired(usize),

    #[error("need at least 2 candidates, got {0}")]
    TooFewCandidates(usize),

    #[error("too many candidates: {0} (max 50)")]
    TooManyCandidates(usize),

    #[error("batch too large: {0} identities (max 100)")]
    BatchTooLarge(usize),

    #[error("election not ended")]
    ElectionNotEnded,

    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    /// The transaction signature does not verify against its signer key.
    #[error("invalid signature for signer: {0}")]
    InvalidSignature(Identity),

    #[error("invalid public key")]
    InvalidPublicKey,

    /// Replayed or out-of-order transaction.
    #[error("stale nonce: expected {expected}, got {got}")]
    StaleNonce { expected: u64, got: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Decoded state that no sequence of operations could have produced.
    #[error("invalid election state: {0}")]
    InvalidState(String),
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}
