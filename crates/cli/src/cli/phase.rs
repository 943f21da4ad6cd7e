use crate::{AppConfig, Client};
use anyhow::Result;
use clap::Subcommand;
use sealvote_core::{Call, Phase};

#[derive(Subcommand)]
pub enum PhaseCommands {
    /// Close registration and open the commit phase
    Commit {
        /// Owner key name
        #[arg(long = "as")]
        signer: String,
    },
    /// Close commitments and open the reveal phase
    Reveal {
        /// Owner key name
        #[arg(long = "as")]
        signer: String,
    },
    /// Close reveals and end the election
    End {
        /// Owner key name
        #[arg(long = "as")]
        signer: String,
    },
}

pub struct PhaseHandler {
    client: Client,
}

impl PhaseHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(&config),
        }
    }

    pub async fn handle(&self, command: &PhaseCommands) -> Result<()> {
        let phase = match command {
            PhaseCommands::Commit { signer } => self.advance(signer, Call::StartCommitPhase).await?,
            PhaseCommands::Reveal { signer } => self.advance(signer, Call::StartRevealPhase).await?,
            PhaseCommands::End { signer } => self.advance(signer, Call::EndElection).await?,
        };
        println!("Election is now in the {} phase", phase);
        Ok(())
    }

    pub(crate) async fn advance(&self, signer: &str, call: Call) -> Result<Phase> {
        self.client.submit(signer, call).await?;
        Ok(self.client.store().load().await?.election().current_phase())
    }
}
