//! sealvote-core: Commit-reveal election protocol.
//!
//! An [`Election`] is made of four parts, each only depending on the ones
//! before it:
//! - the eligibility registry (`add_voter`, `remove_voter`, ...)
//! - the phase state machine (`Registration -> Commit -> Reveal -> Ended`)
//! - the commit-reveal ledger (`commit_vote`, `reveal_vote`)
//! - the tally (`results`, `winner`, `stats`)
//!
//! The [`Engine`] wraps a single election and applies signed
//! [`Transaction`]s to it one at a time, deriving the caller identity from the
//! signing key.

mod serde_hex;
mod hash;
mod identity;
mod error;
pub mod commitment;
mod phase;
mod event;
mod registry;
mod election;
mod ledger;
mod tally;
mod transaction;
mod engine;

pub use hash::Hash;
pub use identity::Identity;
pub use error::Error;
pub use commitment::{Salt, commit, verify_reveal};
pub use phase::Phase;
pub use event::{Event, RecordedEvent};
pub use registry::{MAX_BATCH_SIZE, Registry, VoterRecord};
pub use election::{Candidate, Election, MAX_CANDIDATES, MIN_CANDIDATES};
pub use tally::{Stats, Turnout, Winner};
pub use transaction::{Call, Transaction};
pub use engine::{Engine, Receipt};

/// Re-export for convenience
pub use ed25519_dalek::{SigningKey, VerifyingKey};
