//! Named ed25519 signing keys stored as hex files.

use anyhow::{Context, Result, bail};
use rand::rngs::OsRng;
use sealvote_core::{Identity, SigningKey};
use std::path::{Path, PathBuf};
use tracing::info;

const KEY_EXTENSION: &str = "key";

/// A directory of `<name>.key` files, each holding a 32-byte secret as hex.
#[derive(Clone, Debug)]
pub struct Keyring {
    dir: PathBuf,
}

impl Keyring {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{}.{}", name, KEY_EXTENSION)))
    }

    /// Generate and store a new key. Refuses to overwrite an existing one.
    pub async fn generate(&self, name: &str) -> Result<SigningKey> {
        let path = self.path_for(name)?;
        if tokio::fs::try_exists(&path).await? {
            bail!("Key '{}' already exists at {}", name, path.display());
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let key = SigningKey::generate(&mut OsRng);
        tokio::fs::write(&path, hex::encode(key.to_bytes()))
            .await
            .with_context(|| format!("Failed to write key file {}", path.display()))?;

        info!("Generated key '{}' at {}", name, path.display());
        Ok(key)
    }

    pub async fn load(&self, name: &str) -> Result<SigningKey> {
        let path = self.path_for(name)?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Key '{}' not found at {}", name, path.display()))?;

        let bytes: [u8; 32] = hex::decode(content.trim())
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| anyhow::anyhow!("Key file {} is not 32 bytes of hex", path.display()))?;
        Ok(SigningKey::from_bytes(&bytes))
    }

    pub async fn identity_of(&self, name: &str) -> Result<Identity> {
        let key = self.load(name).await?;
        Ok(Identity::from_public_key(&key.verifying_key()))
    }

    /// Accept either a 64-character hex identity or the name of a stored key.
    pub async fn resolve_identity(&self, token: &str) -> Result<Identity> {
        if let Ok(identity) = token.parse::<Identity>() {
            return Ok(identity);
        }
        self.identity_of(token)
            .await
            .with_context(|| format!("'{}' is neither an identity nor a known key", token))
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        bail!(
            "Invalid key name '{}': use letters, digits, '-' or '_'",
            name
        );
    }
    Ok(())
}
