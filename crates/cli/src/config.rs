use anyhow::Result;
use clap::Args;
use confique::Config;
use sealvote_core::MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Utility function to expand $HOME in a PathBuf
pub fn expand_home_in_path(path: &PathBuf) -> Result<PathBuf> {
    let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in path"))?;

    if path_str.contains("$HOME") {
        let expanded = path_str.replace("$HOME", home_dir.to_str().unwrap_or("."));
        Ok(PathBuf::from(expanded))
    } else {
        Ok(path.clone())
    }
}

#[derive(Config, Clone, Default, Serialize, Deserialize)]
#[config(layer_attr(derive(Args, Serialize, Clone)))]
pub struct AppConfig {
    #[config(nested, layer_attr(command(flatten)))]
    pub store: StoreConfig,

    #[config(nested, layer_attr(command(flatten)))]
    pub client: ClientConfig,
}

#[derive(Clone, Config, Deserialize, Serialize, Default)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct StoreConfig {
    /// Where the election state is persisted
    #[config(
        default = "$HOME/.sealvote/election.cbor",
        env = "SEALVOTE_STATE_PATH",
        layer_attr(arg(long))
    )]
    pub state_path: PathBuf,

    /// Directory holding named ed25519 signing keys
    #[config(
        default = "$HOME/.sealvote/keys",
        env = "SEALVOTE_KEYS_DIR",
        layer_attr(arg(long))
    )]
    pub keys_dir: PathBuf,
}

#[derive(Clone, Config, Deserialize, Serialize, Default)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct ClientConfig {
    /// How many identities to register per batch when importing voters
    #[config(default = 100, layer_attr(arg(long)))]
    pub batch_size: usize,
}

impl ClientConfig {
    /// Batch size clamped to what a single registration call accepts.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve all $HOME placeholders in configuration paths
    pub fn with_resolved_paths(mut self) -> Result<Self> {
        self.store.state_path = expand_home_in_path(&self.store.state_path)?;
        self.store.keys_dir = expand_home_in_path(&self.store.keys_dir)?;
        Ok(self)
    }
}
