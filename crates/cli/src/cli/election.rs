use crate::{AppConfig, Client};
use anyhow::Result;
use clap::Subcommand;
use sealvote_core::Engine;

#[derive(Subcommand)]
pub enum ElectionCommands {
    /// Create a new election in the Registration phase
    Create {
        /// Name of the key that will own the election
        #[arg(long)]
        owner: String,
        /// Election name
        #[arg(long)]
        name: String,
        /// Candidate names, in ballot order (2 to 50)
        #[arg(required = true, num_args = 1..)]
        candidates: Vec<String>,
    },
}

pub struct ElectionHandler {
    client: Client,
}

impl ElectionHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(&config),
        }
    }

    pub async fn handle(&self, command: &ElectionCommands) -> Result<()> {
        match command {
            ElectionCommands::Create {
                owner,
                name,
                candidates,
            } => {
                let engine = self.create(owner, name, candidates).await?;
                let election = engine.election();
                println!("Created election '{}'", election.name());
                println!("Owner: {}", election.owner());
                for candidate in election.results() {
                    println!("  [{}] {}", candidate.id, candidate.name);
                }
                Ok(())
            }
        }
    }

    pub(crate) async fn create(
        &self,
        owner: &str,
        name: &str,
        candidates: &[String],
    ) -> Result<Engine> {
        self.client.create_election(owner, name, candidates).await
    }
}
