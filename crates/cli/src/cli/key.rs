use crate::{AppConfig, Keyring};
use anyhow::Result;
use clap::Subcommand;
use sealvote_core::Identity;

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Generate a new signing key and print its identity
    New {
        /// Name to store the key under
        name: String,
    },
    /// Print the identity of a stored key
    Show {
        /// Name of the key
        name: String,
    },
}

pub struct KeyHandler {
    keys: Keyring,
}

impl KeyHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            keys: Keyring::new(config.store.keys_dir),
        }
    }

    pub async fn handle(&self, command: &KeyCommands) -> Result<()> {
        let identity = match command {
            KeyCommands::New { name } => self.new_key(name).await?,
            KeyCommands::Show { name } => self.keys.identity_of(name).await?,
        };
        println!("{}", identity);
        Ok(())
    }

    pub(crate) async fn new_key(&self, name: &str) -> Result<Identity> {
        let key = self.keys.generate(name).await?;
        Ok(Identity::from_public_key(&key.verifying_key()))
    }
}
