//! The election aggregate: registry and phase machine.
//!
//! Commit/reveal operations live in `ledger.rs` and read-side queries in
//! `tally.rs`; both are further `impl Election` blocks over the same state.

use crate::{Error, Event, Identity, Phase, RecordedEvent, Registry, VoterRecord};
use serde::{Deserialize, Serialize};

/// Fewest candidates an election can be created with.
pub const MIN_CANDIDATES: usize = 2;

/// Most candidates an election can be created with.
pub const MAX_CANDIDATES: usize = 50;

/// A candidate and its running tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Index into the candidate list.
    pub id: u64,
    pub name: String,
    pub vote_count: u64,
}

/// A single commit-reveal election.
///
/// Every mutating operation takes the authenticated caller explicitly and
/// checks all of its preconditions before touching any state, so a returned
/// error always means nothing changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub(crate) name: String,
    pub(crate) owner: Identity,
    pub(crate) phase: Phase,
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) registry: Registry,
    pub(crate) events: Vec<RecordedEvent>,
}

impl Election {
    /// Create an election in the Registration phase.
    pub fn new<S: AsRef<str>>(
        owner: Identity,
        name: impl Into<String>,
        candidate_names: &[S],
    ) -> Result<Self, Error> {
        let name = name.into();
        if owner.is_null() {
            return Err(Error::InvalidIdentity);
        }
        if name.trim().is_empty() {
            return Err(Error::ElectionNameRequired);
        }
        if candidate_names.len() < MIN_CANDIDATES {
            return Err(Error::TooFewCandidates(candidate_names.len()));
        }
        if candidate_names.len() > MAX_CANDIDATES {
            return Err(Error::TooManyCandidates(candidate_names.len()));
        }
        if let Some(blank) = candidate_names
            .iter()
            .position(|n| n.as_ref().trim().is_empty())
        {
            return Err(Error::CandidateNameRequired(blank));
        }

        let candidates = candidate_names
            .iter()
            .enumerate()
            .map(|(id, n)| Candidate {
                id: id as u64,
                name: n.as_ref().to_string(),
                vote_count: 0,
            })
            .collect();

        Ok(Self {
            name,
            owner,
            phase: Phase::Registration,
            candidates,
            registry: Registry::new(),
            events: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn current_phase(&self) -> Phase {
        self.phase
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // =========================================================================
    // Eligibility registry
    // =========================================================================

    /// Register one eligible voter.
    pub fn add_voter(&mut self, caller: Identity, voter: Identity) -> Result<(), Error> {
        self.ensure_owner(caller)?;
        self.phase.ensure(Phase::Registration)?;
        self.registry.insert(voter)?;
        self.emit(Event::VoterAdded { voter });
        Ok(())
    }

    /// Register up to [`MAX_BATCH_SIZE`](crate::MAX_BATCH_SIZE) voters,
    /// skipping ones already registered. Returns the number added.
    pub fn add_voters_batch(&mut self, caller: Identity, voters: &[Identity]) -> Result<usize, Error> {
        self.ensure_owner(caller)?;
        self.phase.ensure(Phase::Registration)?;
        let count = self.registry.insert_batch(voters)?;
        self.emit(Event::VotersAddedBatch { count });
        Ok(count)
    }

    /// Revoke a voter's eligibility.
    pub fn remove_voter(&mut self, caller: Identity, voter: Identity) -> Result<(), Error> {
        self.ensure_owner(caller)?;
        self.phase.ensure(Phase::Registration)?;
        self.registry.remove(&voter)?;
        self.emit(Event::VoterRemoved { voter });
        Ok(())
    }

    pub fn is_eligible(&self, identity: &Identity) -> bool {
        self.registry.is_eligible(identity)
    }

    pub fn total_eligible_voters(&self) -> usize {
        self.registry.total_eligible()
    }

    pub fn voter(&self, identity: &Identity) -> Option<&VoterRecord> {
        self.registry.get(identity)
    }

    // =========================================================================
    // Phase state machine
    // =========================================================================

    /// Close registration and open the commit phase.
    pub fn start_commit_phase(&mut self, caller: Identity) -> Result<(), Error> {
        self.ensure_owner(caller)?;
        self.phase.ensure(Phase::Registration)?;
        if self.registry.total_eligible() == 0 {
            return Err(Error::NoVotersRegistered);
        }
        self.advance();
        Ok(())
    }

    /// Close commitments and open the reveal phase.
    pub fn start_reveal_phase(&mut self, caller: Identity) -> Result<(), Error> {
        self.ensure_owner(caller)?;
        self.phase.ensure(Phase::Commit)?;
        self.advance();
        Ok(())
    }

    /// Close reveals. Terminal.
    pub fn end_election(&mut self, caller: Identity) -> Result<(), Error> {
        self.ensure_owner(caller)?;
        self.phase.ensure(Phase::Reveal)?;
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(next) = self.phase.next() {
            self.phase = next;
            self.emit(Event::PhaseChanged { phase: next });
        }
    }

    pub(crate) fn ensure_owner(&self, caller: Identity) -> Result<(), Error> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(Error::NotOwner)
        }
    }

    // =========================================================================
    // Event log
    // =========================================================================

    /// The full, ordered event log.
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Events with sequence number `seq` or later.
    pub fn events_since(&self, seq: u64) -> &[RecordedEvent] {
        let start = usize::try_from(seq).map_or(self.events.len(), |s| s.min(self.events.len()));
        &self.events[start..]
    }

    pub(crate) fn emit(&mut self, event: Event) {
        let seq = self.events.len() as u64;
        self.events.push(RecordedEvent { seq, event });
    }

    // =========================================================================
    // Decoded state
    // =========================================================================

    /// Check the invariants that every election built through [`Election::new`]
    /// and the mutators satisfies. Used when restoring state from bytes.
    pub(crate) fn check_invariants(&self) -> Result<(), Error> {
        if self.owner.is_null() {
            return Err(invalid("null owner"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("blank election name"));
        }
        let count = self.candidates.len();
        if !(MIN_CANDIDATES..=MAX_CANDIDATES).contains(&count) {
            return Err(invalid(format!("{} candidates", count)));
        }
        for (index, candidate) in self.candidates.iter().enumerate() {
            if candidate.id != index as u64 {
                return Err(invalid(format!(
                    "candidate {} stored at index {}",
                    candidate.id, index
                )));
            }
            if candidate.name.trim().is_empty() {
                return Err(invalid(format!("blank name for candidate {}", index)));
            }
        }

        self.registry.check_invariants()?;

        let committed = self.registry.total_committed();
        let revealed = self.registry.total_revealed();
        if self.phase < Phase::Commit && committed > 0 {
            return Err(invalid("commitments recorded during registration"));
        }
        if self.phase < Phase::Reveal && revealed > 0 {
            return Err(invalid("reveals recorded before the reveal phase"));
        }
        let tally: u128 = self
            .candidates
            .iter()
            .map(|c| u128::from(c.vote_count))
            .sum();
        if tally != revealed as u128 {
            return Err(invalid(format!(
                "tally of {} votes for {} reveals",
                tally, revealed
            )));
        }

        if let Some((index, recorded)) = self
            .events
            .iter()
            .enumerate()
            .find(|(i, r)| r.seq != *i as u64)
        {
            return Err(invalid(format!(
                "event {} stored at position {}",
                recorded.seq, index
            )));
        }
        Ok(())
    }
}

pub(crate) fn invalid(what: impl Into<String>) -> Error {
    Error::InvalidState(what.into())
}
