use crate::{AppConfig, config::expand_home_in_path};
use election::ElectionCommands;
use key::KeyCommands;
use phase::PhaseCommands;
use show::ShowCommands;
use vote::VoteCommands;
use voter::VoterCommands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use confique::Config;
use sealvote_core::{Salt, commit};
use std::path::PathBuf;

// Re-export PartialAppConfig for public usage
pub use crate::config::confique_app_config_layer::AppConfigLayer as PartialAppConfig;

mod election;
mod key;
mod phase;
mod show;
mod vote;
mod voter;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "sealvote")]
#[command(about = "Commit-reveal elections with sealed ballots")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "$HOME/.sealvote/config.toml")]
    config_path: PathBuf,

    /// Configuration object
    #[command(flatten)]
    config: PartialAppConfig,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Internal helper struct that holds the resolved configuration
pub struct ResolvedCli {
    command: Commands,
    config: AppConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Signing key management
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
    /// Create the local election
    Election {
        #[command(subcommand)]
        command: ElectionCommands,
    },
    /// Voter registry management (owner only)
    Voter {
        #[command(subcommand)]
        command: VoterCommands,
    },
    /// Advance the election phase (owner only)
    Phase {
        #[command(subcommand)]
        command: PhaseCommands,
    },
    /// Commit or reveal a ballot
    Vote {
        #[command(subcommand)]
        command: VoteCommands,
    },
    /// Inspect the election
    Show {
        #[command(subcommand)]
        command: ShowCommands,
    },
    /// Compute a commitment hash offline
    Commitment {
        /// Candidate index
        candidate_id: u64,
        /// 32-byte salt as hex
        salt: Salt,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let log_level = if self.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(format!("sealvote={},warn", log_level))
            .init();

        let resolved_cli = self.resolve_config().await?;
        resolved_cli.handle_command().await
    }

    /// Load the configuration and resolve all $HOME placeholders
    async fn resolve_config(self) -> Result<ResolvedCli> {
        let config_path = expand_home_in_path(&self.config_path)?;

        // CLI flags, then environment, then the config file
        let config = AppConfig::builder()
            .preloaded(self.config)
            .env()
            .file(&config_path)
            .load()?
            .with_resolved_paths()?;

        Ok(ResolvedCli {
            command: self.command,
            config,
        })
    }
}

impl ResolvedCli {
    async fn handle_command(&self) -> Result<()> {
        match &self.command {
            Commands::Key { command } => {
                key::KeyHandler::new(self.config.clone()).handle(command).await
            }
            Commands::Election { command } => {
                election::ElectionHandler::new(self.config.clone())
                    .handle(command)
                    .await
            }
            Commands::Voter { command } => {
                voter::VoterHandler::new(self.config.clone())
                    .handle(command)
                    .await
            }
            Commands::Phase { command } => {
                phase::PhaseHandler::new(self.config.clone())
                    .handle(command)
                    .await
            }
            Commands::Vote { command } => {
                vote::VoteHandler::new(self.config.clone()).handle(command).await
            }
            Commands::Show { command } => {
                show::ShowHandler::new(self.config.clone()).handle(command).await
            }
            Commands::Commitment { candidate_id, salt } => {
                println!("{}", commit(*candidate_id, salt));
                Ok(())
            }
        }
    }
}
