//! Notifications emitted on every successful state change.

use crate::{Identity, Phase};
use serde::{Deserialize, Serialize};

/// Something that happened to the election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    VoterAdded { voter: Identity },
    VoterRemoved { voter: Identity },
    /// `count` is the number of identities actually added, duplicates excluded.
    VotersAddedBatch { count: usize },
    PhaseChanged { phase: Phase },
    VoteCommitted { voter: Identity },
    VoteRevealed { voter: Identity, candidate_id: u64 },
}

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub seq: u64,
    pub event: Event,
}
