use crate::{AppConfig, Client};
use anyhow::{Context, Result};
use clap::Subcommand;
use sealvote_core::{Call, Identity};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Subcommand)]
pub enum VoterCommands {
    /// Register one eligible voter
    Add {
        /// Owner key name
        #[arg(long = "as")]
        signer: String,
        /// Voter identity (hex) or key name
        voter: String,
    },
    /// Revoke a voter's eligibility
    Remove {
        /// Owner key name
        #[arg(long = "as")]
        signer: String,
        /// Voter identity (hex) or key name
        voter: String,
    },
    /// Register every identity listed in a file, one per line
    Import {
        /// Owner key name
        #[arg(long = "as")]
        signer: String,
        /// File of identities; blank lines and `#` comments are ignored
        file: PathBuf,
    },
}

pub struct VoterHandler {
    client: Client,
}

impl VoterHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(&config),
        }
    }

    pub async fn handle(&self, command: &VoterCommands) -> Result<()> {
        match command {
            VoterCommands::Add { signer, voter } => {
                let voter = self.add(signer, voter).await?;
                println!("Registered {}", voter);
            }
            VoterCommands::Remove { signer, voter } => {
                let voter = self.remove(signer, voter).await?;
                println!("Removed {}", voter);
            }
            VoterCommands::Import { signer, file } => {
                let added = self.import(signer, file).await?;
                println!("Registered {} new voters", added);
            }
        }
        Ok(())
    }

    pub(crate) async fn add(&self, signer: &str, voter: &str) -> Result<Identity> {
        let voter = self.client.keys().resolve_identity(voter).await?;
        self.client.submit(signer, Call::AddVoter { voter }).await?;
        Ok(voter)
    }

    pub(crate) async fn remove(&self, signer: &str, voter: &str) -> Result<Identity> {
        let voter = self.client.keys().resolve_identity(voter).await?;
        self.client.submit(signer, Call::RemoveVoter { voter }).await?;
        Ok(voter)
    }

    pub(crate) async fn import(&self, signer: &str, file: &Path) -> Result<usize> {
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let voters = parse_identity_list(&content)?;
        info!(
            "Importing {} identities in batches of {}",
            voters.len(),
            self.client.batch_size()
        );
        self.client.import_voters(signer, &voters).await
    }
}

/// One hex identity per line. Blank lines and `#` comments are skipped.
fn parse_identity_list(content: &str) -> Result<Vec<Identity>> {
    content
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(n, line)| {
            line.parse::<Identity>()
                .with_context(|| format!("Line {}: invalid identity '{}'", n, line))
        })
        .collect()
}
