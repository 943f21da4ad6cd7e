//! Commit-reveal ledger: sealed commitments and their openings.

use crate::commitment::verify_reveal;
use crate::{Election, Error, Event, Hash, Identity, Phase, Salt, VoterRecord};

impl Election {
    /// Record `caller`'s sealed commitment.
    ///
    /// Checks, in order: Commit phase, eligibility, no prior commitment,
    /// non-zero hash.
    pub fn commit_vote(&mut self, caller: Identity, commitment: Hash) -> Result<(), Error> {
        self.phase.ensure(Phase::Commit)?;
        let record = self.eligible_record(&caller)?;
        if record.has_committed() {
            return Err(Error::AlreadyCommitted);
        }
        if commitment.is_zero() {
            return Err(Error::InvalidHash);
        }

        if let Some(record) = self.registry.get_mut(&caller) {
            record.record_commit(commitment);
        }
        self.emit(Event::VoteCommitted { voter: caller });
        Ok(())
    }

    /// Open `caller`'s commitment and count the vote.
    ///
    /// Checks, in order: Reveal phase, eligibility, a commitment exists, not
    /// already revealed, hash match, candidate in range. The range check comes
    /// after the hash check, so a voter who committed to a nonexistent
    /// candidate learns only that the id is invalid once they prove it was
    /// what they committed to.
    pub fn reveal_vote(
        &mut self,
        caller: Identity,
        candidate_id: u64,
        salt: &Salt,
    ) -> Result<(), Error> {
        self.phase.ensure(Phase::Reveal)?;
        let record = self.eligible_record(&caller)?;
        let stored = record.commitment().copied().ok_or(Error::NotCommitted)?;
        if record.has_revealed() {
            return Err(Error::AlreadyRevealed);
        }
        if !verify_reveal(&stored, candidate_id, salt) {
            return Err(Error::HashMismatchInvalidReveal);
        }
        let index = self.candidate_index(candidate_id)?;

        self.candidates[index].vote_count += 1;
        if let Some(record) = self.registry.get_mut(&caller) {
            record.record_reveal();
        }
        self.emit(Event::VoteRevealed {
            voter: caller,
            candidate_id,
        });
        Ok(())
    }

    /// Whether `identity` has committed (the "has voted" query).
    pub fn has_voted(&self, identity: &Identity) -> bool {
        self.registry
            .get(identity)
            .is_some_and(VoterRecord::has_committed)
    }

    pub fn has_revealed(&self, identity: &Identity) -> bool {
        self.registry
            .get(identity)
            .is_some_and(VoterRecord::has_revealed)
    }

    pub fn total_commitments(&self) -> usize {
        self.registry.total_committed()
    }

    pub fn total_revealed(&self) -> usize {
        self.registry.total_revealed()
    }

    fn eligible_record(&self, identity: &Identity) -> Result<&VoterRecord, Error> {
        self.registry
            .get(identity)
            .filter(|r| r.eligible())
            .ok_or(Error::NotEligible)
    }

    pub(crate) fn candidate_index(&self, candidate_id: u64) -> Result<usize, Error> {
        usize::try_from(candidate_id)
            .ok()
            .filter(|i| *i < self.candidates.len())
            .ok_or(Error::InvalidCandidate(candidate_id))
    }
}
