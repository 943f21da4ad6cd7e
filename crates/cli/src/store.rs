//! On-disk persistence of the engine.

use anyhow::{Context, Result, bail};
use fs4::fs_std::FileExt;
use sealvote_core::Engine;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A single CBOR file holding the whole [`Engine`].
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

/// Exclusive hold on a [`StateStore`]. Released on drop.
#[derive(Debug)]
pub struct StateLock {
    _file: File,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used for the advisory lock, e.g. `election.cbor.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Wait for exclusive access to the state file.
    ///
    /// Every load-modify-save sequence must run while holding the returned
    /// guard, across processes as well as tasks.
    pub async fn lock(&self) -> Result<StateLock> {
        tokio::fs::create_dir_all(self.dir()).await?;
        let path = self.lock_path();

        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            file.lock_exclusive()
                .with_context(|| format!("Failed to lock {}", path.display()))?;
            Ok(file)
        })
        .await??;

        debug!("Locked {}", self.lock_path().display());
        Ok(StateLock { _file: file })
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    pub async fn load(&self) -> Result<Engine> {
        if !self.exists().await? {
            bail!(
                "No election found at {}; run `sealvote election create` first",
                self.path.display()
            );
        }
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let engine = Engine::from_bytes(&bytes)
            .with_context(|| format!("Corrupt election state in {}", self.path.display()))?;
        debug!("Loaded election state from {}", self.path.display());
        Ok(engine)
    }

    /// Write the engine, replacing any previous state atomically.
    ///
    /// The bytes go to a uniquely named temp file in the same directory,
    /// which is then renamed over the state file.
    pub async fn save(&self, engine: &Engine) -> Result<()> {
        let dir = self.dir();
        tokio::fs::create_dir_all(&dir).await?;
        let bytes = engine.to_bytes()?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)
                .with_context(|| format!("Failed to create a temp file in {}", dir.display()))?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path)
                .with_context(|| format!("Failed to replace {}", path.display()))?;
            Ok(())
        })
        .await??;

        debug!("Saved election state to {}", self.path.display());
        Ok(())
    }

    /// Save a freshly created engine, refusing to replace an existing election.
    pub async fn create(&self, engine: &Engine) -> Result<()> {
        if self.exists().await? {
            bail!(
                "An election already exists at {}; remove it or choose another --state-path",
                self.path.display()
            );
        }
        self.save(engine).await
    }
}
