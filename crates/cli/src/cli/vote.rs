use crate::{AppConfig, Client};
use anyhow::Result;
use clap::Subcommand;
use sealvote_core::{Call, Hash, Salt, commit};

#[derive(Subcommand)]
pub enum VoteCommands {
    /// Seal a vote for a candidate during the commit phase
    Commit {
        /// Voter key name
        #[arg(long = "as")]
        signer: String,
        /// Candidate index
        candidate_id: u64,
        /// Salt as hex; a random one is generated when omitted
        #[arg(long)]
        salt: Option<Salt>,
    },
    /// Open a sealed vote during the reveal phase
    Reveal {
        /// Voter key name
        #[arg(long = "as")]
        signer: String,
        /// Candidate index that was committed to
        candidate_id: u64,
        /// Salt that was committed with
        salt: Salt,
    },
}

pub struct VoteHandler {
    client: Client,
}

impl VoteHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(&config),
        }
    }

    pub async fn handle(&self, command: &VoteCommands) -> Result<()> {
        match command {
            VoteCommands::Commit {
                signer,
                candidate_id,
                salt,
            } => {
                let (salt, commitment) = self.commit(signer, *candidate_id, *salt).await?;
                println!("Committed {}", commitment);
                println!("Keep this salt to reveal your vote: {}", salt.to_hex());
            }
            VoteCommands::Reveal {
                signer,
                candidate_id,
                salt,
            } => {
                self.reveal(signer, *candidate_id, salt).await?;
                println!("Revealed vote for candidate {}", candidate_id);
            }
        }
        Ok(())
    }

    pub(crate) async fn commit(
        &self,
        signer: &str,
        candidate_id: u64,
        salt: Option<Salt>,
    ) -> Result<(Salt, Hash)> {
        let salt = salt.unwrap_or_else(Salt::random);
        let commitment = commit(candidate_id, &salt);
        self.client
            .submit(signer, Call::CommitVote { commitment })
            .await?;
        Ok((salt, commitment))
    }

    pub(crate) async fn reveal(&self, signer: &str, candidate_id: u64, salt: &Salt) -> Result<()> {
        self.client
            .submit(
                signer,
                Call::RevealVote {
                    candidate_id,
                    salt: *salt,
                },
            )
            .await?;
        Ok(())
    }
}
