//! Load state, sign a call, apply it, save state.

use crate::{AppConfig, keys::Keyring, store::StateStore};
use anyhow::{Context, Result};
use sealvote_core::{Call, Engine, Identity, Receipt, SigningKey, Transaction};
use tracing::info;

/// Everything a command needs to act on the local election.
#[derive(Clone, Debug)]
pub struct Client {
    store: StateStore,
    keys: Keyring,
    batch_size: usize,
}

impl Client {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StateStore::new(&config.store.state_path),
            keys: Keyring::new(&config.store.keys_dir),
            batch_size: config.client.effective_batch_size(),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn keys(&self) -> &Keyring {
        &self.keys
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Create a new election owned by the named key.
    pub async fn create_election(
        &self,
        owner: &str,
        name: &str,
        candidates: &[String],
    ) -> Result<Engine> {
        let key = self.keys.load(owner).await?;
        let engine = Engine::genesis(&key.verifying_key(), name, candidates)?;
        let _lock = self.store.lock().await?;
        self.store.create(&engine).await?;
        info!(
            "Created election '{}' with {} candidates at {}",
            name,
            candidates.len(),
            self.store.path().display()
        );
        Ok(engine)
    }

    /// Sign `call` with the named key and apply it.
    pub async fn submit(&self, signer: &str, call: Call) -> Result<Receipt> {
        let mut receipts = self.submit_all(signer, vec![call]).await?;
        receipts
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No receipt returned"))
    }

    /// Apply several calls in order from one signer.
    ///
    /// The state file stays locked from load to the last save. State is saved
    /// after every accepted call, so a failure part-way keeps the calls that
    /// went through.
    pub async fn submit_all(&self, signer: &str, calls: Vec<Call>) -> Result<Vec<Receipt>> {
        let key = self.keys.load(signer).await?;
        let _lock = self.store.lock().await?;
        let mut engine = self.store.load().await?;
        let mut receipts = Vec::with_capacity(calls.len());

        for call in calls {
            let name = call.name();
            let receipt =
                apply(&mut engine, &key, call).with_context(|| format!("{} rejected", name))?;
            self.store.save(&engine).await?;
            receipts.push(receipt);
        }
        Ok(receipts)
    }

    /// Register identities in chunks of the configured batch size.
    /// Returns how many were newly added.
    ///
    /// Chunks before a rejected one stay applied; the error says how far the
    /// import got.
    pub async fn import_voters(&self, signer: &str, voters: &[Identity]) -> Result<usize> {
        let key = self.keys.load(signer).await?;
        let _lock = self.store.lock().await?;
        let mut engine = self.store.load().await?;
        let before = engine.election().total_eligible_voters();

        let chunks: Vec<&[Identity]> = voters.chunks(self.batch_size).collect();
        let total = chunks.len();
        let mut submitted = 0;
        for (done, chunk) in chunks.into_iter().enumerate() {
            let call = Call::AddVotersBatch {
                voters: chunk.to_vec(),
            };
            if let Err(e) = apply(&mut engine, &key, call) {
                let added = engine
                    .election()
                    .total_eligible_voters()
                    .saturating_sub(before);
                return Err(e.context(format!(
                    "add_voters_batch rejected at chunk {} of {}; {} chunks ({} identities, {} newly registered) were already applied and saved",
                    done + 1,
                    total,
                    done,
                    submitted,
                    added
                )));
            }
            self.store.save(&engine).await?;
            submitted += chunk.len();
        }
        info!("Imported {} identities in {} chunks", submitted, total);

        Ok(engine
            .election()
            .total_eligible_voters()
            .saturating_sub(before))
    }
}

fn apply(engine: &mut Engine, key: &SigningKey, call: Call) -> Result<Receipt> {
    let signer = Identity::from_public_key(&key.verifying_key());
    let tx = Transaction::new(call, engine.next_nonce(&signer), key)?;
    Ok(engine.submit(&tx)?)
}
