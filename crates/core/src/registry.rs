//! Eligibility registry: the set of identities allowed to vote.
//!
//! The registry only enforces its own invariants (non-null identities, no
//! duplicates, batch cap). Ownership and phase checks belong to
//! [`Election`](crate::Election), which is the only thing that mutates it.

use crate::{Error, Hash, Identity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of identities accepted by one batch registration.
pub const MAX_BATCH_SIZE: usize = 100;

/// Per-voter protocol state.
///
/// `has_revealed => has_committed => eligible` always holds: records are
/// only created eligible, and the two flags are only ever set in order by
/// [`record_commit`](Self::record_commit) and
/// [`record_reveal`](Self::record_reveal).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    eligible: bool,
    commitment: Option<Hash>,
    has_committed: bool,
    has_revealed: bool,
}

impl VoterRecord {
    fn new_eligible() -> Self {
        Self {
            eligible: true,
            commitment: None,
            has_committed: false,
            has_revealed: false,
        }
    }

    pub fn eligible(&self) -> bool {
        self.eligible
    }

    pub fn commitment(&self) -> Option<&Hash> {
        self.commitment.as_ref()
    }

    pub fn has_committed(&self) -> bool {
        self.has_committed
    }

    pub fn has_revealed(&self) -> bool {
        self.has_revealed
    }

    /// Committed but not (yet) revealed.
    pub fn is_abstaining(&self) -> bool {
        self.has_committed && !self.has_revealed
    }

    pub(crate) fn record_commit(&mut self, commitment: Hash) {
        debug_assert!(self.eligible && !self.has_committed);
        self.commitment = Some(commitment);
        self.has_committed = true;
    }

    pub(crate) fn record_reveal(&mut self) {
        debug_assert!(self.has_committed && !self.has_revealed);
        self.has_revealed = true;
    }
}

/// Map from identity to voter record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    voters: BTreeMap<Identity, VoterRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one identity.
    pub(crate) fn insert(&mut self, identity: Identity) -> Result<(), Error> {
        if identity.is_null() {
            return Err(Error::InvalidIdentity);
        }
        if self.is_eligible(&identity) {
            return Err(Error::AlreadyRegistered);
        }
        self.voters.insert(identity, VoterRecord::new_eligible());
        Ok(())
    }

    /// Register many identities at once, returning how many were new.
    ///
    /// Identities that are already eligible (or repeated within the batch)
    /// are skipped. An oversized batch or a null identity anywhere in it
    /// rejects the whole call before anything is inserted.
    pub(crate) fn insert_batch(&mut self, identities: &[Identity]) -> Result<usize, Error> {
        if identities.len() > MAX_BATCH_SIZE {
            return Err(Error::BatchTooLarge(identities.len()));
        }
        if identities.iter().any(Identity::is_null) {
            return Err(Error::InvalidIdentity);
        }

        let fresh: BTreeSet<Identity> = identities
            .iter()
            .filter(|id| !self.is_eligible(id))
            .copied()
            .collect();

        let added = fresh.len();
        for identity in fresh {
            self.voters.insert(identity, VoterRecord::new_eligible());
        }
        Ok(added)
    }

    /// Drop an identity from the registry.
    pub(crate) fn remove(&mut self, identity: &Identity) -> Result<(), Error> {
        self.voters
            .remove(identity)
            .map(|_| ())
            .ok_or(Error::NotEligible)
    }

    pub fn is_eligible(&self, identity: &Identity) -> bool {
        self.voters.get(identity).is_some_and(VoterRecord::eligible)
    }

    pub fn get(&self, identity: &Identity) -> Option<&VoterRecord> {
        self.voters.get(identity)
    }

    pub(crate) fn get_mut(&mut self, identity: &Identity) -> Option<&mut VoterRecord> {
        self.voters.get_mut(identity)
    }

    /// Iterate over all records in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &VoterRecord)> {
        self.voters.iter()
    }

    pub fn total_eligible(&self) -> usize {
        self.voters.values().filter(|r| r.eligible).count()
    }

    pub fn total_committed(&self) -> usize {
        self.voters.values().filter(|r| r.has_committed).count()
    }

    pub fn total_revealed(&self) -> usize {
        self.voters.values().filter(|r| r.has_revealed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Check every record against the invariants the mutators maintain.
    pub(crate) fn check_invariants(&self) -> Result<(), Error> {
        for (identity, record) in &self.voters {
            let broken = if identity.is_null() {
                Some("null identity registered")
            } else if !record.eligible {
                Some("ineligible record kept")
            } else if record.has_committed != record.commitment.is_some() {
                Some("commitment flag disagrees with stored commitment")
            } else if record.commitment.as_ref().is_some_and(Hash::is_zero) {
                Some("zero commitment")
            } else if record.has_revealed && !record.has_committed {
                Some("revealed without a commitment")
            } else {
                None
            };
            if let Some(what) = broken {
                return Err(Error::InvalidState(format!("{} for voter {}", what, identity)));
            }
        }
        Ok(())
    }
}
