//! The sealvote engine: applies signed transactions to one election.

use crate::election::invalid;
use crate::{Call, Election, Error, Hash, Identity, Transaction};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Proof that a transaction was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position in the engine history, starting at 0.
    pub seq: u64,
    pub tx_id: Hash,
    pub caller: Identity,
    /// Election state hash right after the transaction was applied.
    pub state_hash: Hash,
}

/// Single writer over one [`Election`].
///
/// Transactions are applied strictly one at a time. A rejected transaction
/// leaves the election, the nonces and the history untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    /// Current election state.
    election: Election,

    /// Next expected nonce per signer.
    nonces: BTreeMap<Identity, u64>,

    /// Applied transactions, in order.
    history: Vec<Receipt>,
}

impl Engine {
    /// Create an election owned by `owner` and wrap it.
    pub fn genesis<S: AsRef<str>>(
        owner: &VerifyingKey,
        name: impl Into<String>,
        candidate_names: &[S],
    ) -> Result<Self, Error> {
        let election = Election::new(Identity::from_public_key(owner), name, candidate_names)?;
        debug!(
            owner = %election.owner(),
            candidates = election.candidate_count(),
            "created election"
        );
        Ok(Self::from_election(election))
    }

    /// Wrap an existing election with empty nonces and history.
    pub fn from_election(election: Election) -> Self {
        Self {
            election,
            nonces: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Get the current election state.
    pub fn election(&self) -> &Election {
        &self.election
    }

    /// Get the applied-transaction history.
    pub fn history(&self) -> &[Receipt] {
        &self.history
    }

    /// Nonce the next transaction from `signer` must carry.
    pub fn next_nonce(&self, signer: &Identity) -> u64 {
        self.nonces.get(signer).copied().unwrap_or(0)
    }

    /// BLAKE3 of the canonical CBOR encoding of the election.
    pub fn state_hash(&self) -> Result<Hash, Error> {
        Hash::of_value(&self.election)
    }

    /// Verify and apply one transaction.
    pub fn submit(&mut self, tx: &Transaction) -> Result<Receipt, Error> {
        match self.apply(tx) {
            Ok(receipt) => {
                debug!(
                    seq = receipt.seq,
                    caller = %receipt.caller,
                    call = tx.call.name(),
                    state = %receipt.state_hash,
                    "applied transaction"
                );
                Ok(receipt)
            }
            Err(e) => {
                let signer = tx
                    .signer_identity()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|_| hex::encode(tx.signer));
                warn!(%signer, call = tx.call.name(), error = %e, "rejected transaction");
                Err(e)
            }
        }
    }

    fn apply(&mut self, tx: &Transaction) -> Result<Receipt, Error> {
        tx.verify_signature()?;
        let caller = tx.signer_identity()?;

        let expected = self.next_nonce(&caller);
        if tx.nonce != expected {
            return Err(Error::StaleNonce {
                expected,
                got: tx.nonce,
            });
        }
        let tx_id = tx.id()?;

        // Apply to a copy; swap in only once the state hash is known.
        let mut next = self.election.clone();
        dispatch(&mut next, caller, &tx.call)?;
        let state_hash = Hash::of_value(&next)?;

        self.election = next;
        self.nonces.insert(caller, expected + 1);
        let receipt = Receipt {
            seq: self.history.len() as u64,
            tx_id,
            caller,
            state_hash,
        };
        self.history.push(receipt.clone());
        Ok(receipt)
    }

    /// Serialize the whole engine to CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)?;
        Ok(buf)
    }

    /// Restore an engine from [`to_bytes`](Self::to_bytes) output.
    ///
    /// Decoded state is checked against the election invariants, the receipt
    /// sequence and the nonce counters before it is returned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let engine: Self = ciborium::from_reader(bytes)?;
        engine.check_invariants()?;
        Ok(engine)
    }

    fn check_invariants(&self) -> Result<(), Error> {
        self.election.check_invariants()?;

        if let Some((index, receipt)) = self
            .history
            .iter()
            .enumerate()
            .find(|(i, r)| r.seq != *i as u64)
        {
            return Err(invalid(format!(
                "receipt {} stored at position {}",
                receipt.seq, index
            )));
        }

        // Every accepted transaction bumps exactly one signer nonce.
        let nonces: u128 = self.nonces.values().map(|n| u128::from(*n)).sum();
        if nonces != self.history.len() as u128 {
            return Err(invalid(format!(
                "nonces account for {} transactions, history holds {}",
                nonces,
                self.history.len()
            )));
        }

        if let Some(last) = self.history.last() {
            if last.state_hash != self.state_hash()? {
                return Err(invalid("state hash differs from the last receipt"));
            }
        }
        Ok(())
    }
}

fn dispatch(election: &mut Election, caller: Identity, call: &Call) -> Result<(), Error> {
    match call {
        Call::AddVoter { voter } => election.add_voter(caller, *voter),
        Call::AddVotersBatch { voters } => election.add_voters_batch(caller, voters).map(|_| ()),
        Call::RemoveVoter { voter } => election.remove_voter(caller, *voter),
        Call::StartCommitPhase => election.start_commit_phase(caller),
        Call::StartRevealPhase => election.start_reveal_phase(caller),
        Call::EndElection => election.end_election(caller),
        Call::CommitVote { commitment } => election.commit_vote(caller, *commitment),
        Call::RevealVote { candidate_id, salt } => election.reveal_vote(caller, *candidate_id, salt),
    }
}
