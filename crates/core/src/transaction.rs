//! Signed transactions.
//!
//! A transaction carries one mutating [`Call`] together with the signer's
//! ed25519 public key, a per-signer nonce and a signature:
//! ```text
//! Transaction {
//!   signer    : [u8; 32]   // ed25519 verifying key
//!   nonce     : u64        // signer's next expected nonce
//!   call      : Call       // what to do
//!   signature : [u8; 64]   // over CBOR(signer, nonce, call)
//! }
//! ```

use crate::{Error, Hash, Identity, Salt};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// A mutating election operation. The caller is never part of the call; it
/// is derived from the transaction signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    AddVoter { voter: Identity },
    AddVotersBatch { voters: Vec<Identity> },
    RemoveVoter { voter: Identity },
    StartCommitPhase,
    StartRevealPhase,
    EndElection,
    CommitVote { commitment: Hash },
    RevealVote { candidate_id: u64, salt: Salt },
}

impl Call {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Call::AddVoter { .. } => "add_voter",
            Call::AddVotersBatch { .. } => "add_voters_batch",
            Call::RemoveVoter { .. } => "remove_voter",
            Call::StartCommitPhase => "start_commit_phase",
            Call::StartRevealPhase => "start_reveal_phase",
            Call::EndElection => "end_election",
            Call::CommitVote { .. } => "commit_vote",
            Call::RevealVote { .. } => "reveal_vote",
        }
    }
}

/// A signed, nonce-ordered call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ed25519 verifying key of the signer.
    #[serde(with = "crate::serde_hex")]
    pub signer: [u8; 32],

    /// Must equal the signer's next expected nonce.
    pub nonce: u64,

    pub call: Call,

    /// Ed25519 signature over the signable content.
    pub signature: Vec<u8>,
}

/// Helper struct for signing (excludes the signature).
#[derive(Serialize)]
struct SignableTransaction<'a> {
    #[serde(with = "crate::serde_hex")]
    signer: [u8; 32],
    nonce: u64,
    call: &'a Call,
}

impl Transaction {
    /// Create a transaction and sign it.
    pub fn new(call: Call, nonce: u64, signing_key: &SigningKey) -> Result<Self, Error> {
        let mut tx = Self {
            signer: signing_key.verifying_key().to_bytes(),
            nonce,
            call,
            signature: Vec::new(),
        };
        let signature = signing_key.sign(&tx.signable_content()?);
        tx.signature = signature.to_bytes().to_vec();
        Ok(tx)
    }

    /// Canonical CBOR of `(signer, nonce, call)`.
    pub fn signable_content(&self) -> Result<Vec<u8>, Error> {
        let signable = SignableTransaction {
            signer: self.signer,
            nonce: self.nonce,
            call: &self.call,
        };
        let mut buf = Vec::new();
        ciborium::into_writer(&signable, &mut buf)?;
        Ok(buf)
    }

    /// Content hash of the signed transaction.
    pub fn id(&self) -> Result<Hash, Error> {
        Hash::of_value(self)
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey, Error> {
        VerifyingKey::from_bytes(&self.signer).map_err(|_| Error::InvalidPublicKey)
    }

    /// Identity derived from the signer key. Not authenticated until
    /// [`verify_signature`](Self::verify_signature) succeeds.
    pub fn signer_identity(&self) -> Result<Identity, Error> {
        self.verifying_key()
            .map(|key| Identity::from_public_key(&key))
    }

    /// Check the signature against the embedded signer key.
    pub fn verify_signature(&self) -> Result<(), Error> {
        let key = self.verifying_key()?;
        let identity = Identity::from_public_key(&key);
        let signature =
            Signature::from_slice(&self.signature).map_err(|_| Error::InvalidSignature(identity))?;
        key.verify(&self.signable_content()?, &signature)
            .map_err(|_| Error::InvalidSignature(identity))
    }
}
