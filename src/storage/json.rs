use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::AsyncWriteExt;

use crate::core::error::StorageError;
use crate::machine::MachineState;

use super::StateStore;

/// Machine state kept in a single JSON document
///
/// Writes go to a sibling temp file that is flushed to disk and then renamed
/// over the target, so readers only ever see a complete document and an
/// acknowledged save survives a crash.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write_atomically(&self, temp_path: &Path, body: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(temp_path).await?;
        file.write_all(body).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(temp_path, &self.path).await?;
        self.sync_parent_dir().await
    }

    /// Make the rename itself durable
    #[cfg(unix)]
    async fn sync_parent_dir(&self) -> std::io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        tokio::fs::File::open(parent).await?.sync_all().await
    }

    #[cfg(not(unix))]
    async fn sync_parent_dir(&self) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    fn kind(&self) -> &'static str {
        "json"
    }

    async fn load(&self) -> Result<Option<MachineState>, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(
                    "Error loading state from {}: {}. Creating new state.",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &MachineState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(state)?;
        let temp_path = self.temp_path();

        if let Err(e) = self.write_atomically(&temp_path, &body).await {
            // Don't leave a half-written temp file behind
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}
