//! Read-side queries: results, winner and turnout.

use crate::election::invalid;
use crate::{Candidate, Election, Error, Phase};
use serde::{Deserialize, Serialize};

/// The winning candidate of an ended election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub candidate_id: u64,
    pub name: String,
    pub vote_count: u64,
}

/// Snapshot of the aggregate counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub eligible: usize,
    pub committed: usize,
    pub revealed: usize,
    pub phase: Phase,
}

/// Participation as fractions of the eligible electorate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turnout {
    pub committed: f64,
    pub revealed: f64,
}

impl Election {
    /// All candidates in index order with their current counts.
    pub fn results(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidate(&self, candidate_id: u64) -> Result<&Candidate, Error> {
        self.candidate_index(candidate_id)
            .map(|index| &self.candidates[index])
    }

    /// The candidate with the most votes. Ties go to the lowest index.
    pub fn winner(&self) -> Result<Winner, Error> {
        self.ensure_ended()?;

        let best = self
            .candidates
            .iter()
            .reduce(|best, c| if c.vote_count > best.vote_count { c } else { best })
            .ok_or_else(|| invalid("election has no candidates"))?;

        Ok(Winner {
            candidate_id: best.id,
            name: best.name.clone(),
            vote_count: best.vote_count,
        })
    }

    /// Every candidate sharing the top count, in index order.
    ///
    /// More than one entry means [`winner`](Self::winner) resolved a tie.
    pub fn leaders(&self) -> Result<Vec<&Candidate>, Error> {
        self.ensure_ended()?;
        let top = self
            .candidates
            .iter()
            .map(|c| c.vote_count)
            .max()
            .unwrap_or(0);
        Ok(self
            .candidates
            .iter()
            .filter(|c| c.vote_count == top)
            .collect())
    }

    pub fn stats(&self) -> Stats {
        Stats {
            eligible: self.registry.total_eligible(),
            committed: self.registry.total_committed(),
            revealed: self.registry.total_revealed(),
            phase: self.phase,
        }
    }

    pub fn turnout(&self) -> Turnout {
        let stats = self.stats();
        if stats.eligible == 0 {
            return Turnout {
                committed: 0.0,
                revealed: 0.0,
            };
        }
        let eligible = stats.eligible as f64;
        Turnout {
            committed: stats.committed as f64 / eligible,
            revealed: stats.revealed as f64 / eligible,
        }
    }

    fn ensure_ended(&self) -> Result<(), Error> {
        if self.phase == Phase::Ended {
            Ok(())
        } else {
            Err(Error::ElectionNotEnded)
        }
    }
}
