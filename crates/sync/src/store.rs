//! The working artifact on disk

use postman_sync_common::{Result, SyncError, ARTIFACT_FILE_NAME};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Working directory used when none is configured
pub const DEFAULT_WORKING_DIR: &str = "./docs";

/// Owns `<working_dir>/document-postman.json`
///
/// The store does no locking; two runs sharing a working directory race on
/// reset, write and read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStore {
    working_dir: PathBuf,
    artifact_path: PathBuf,
}

impl CollectionStore {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        let working_dir = working_dir.into();
        let artifact_path = working_dir.join(ARTIFACT_FILE_NAME);
        Self {
            working_dir,
            artifact_path,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Remove the working directory if present, then recreate it empty
    pub async fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.working_dir).await {
            Ok(()) => debug!(dir = %self.working_dir.display(), "cleared working directory"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SyncError::write(
                    format!(
                        "Failed to clear working directory {}",
                        self.working_dir.display()
                    ),
                    e,
                ))
            }
        }

        fs::create_dir_all(&self.working_dir).await.map_err(|e| {
            SyncError::write(
                format!(
                    "Failed to create working directory {}",
                    self.working_dir.display()
                ),
                e,
            )
        })
    }

    /// Serialize `document` as JSON and store it at the artifact path
    pub async fn write<T>(&self, document: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(document)
            .map_err(|e| SyncError::write("error on generate file", e))?;

        fs::write(&self.artifact_path, json).await.map_err(|e| {
            SyncError::write(
                format!("error on generate file {}", self.artifact_path.display()),
                e,
            )
        })?;

        debug!(path = %self.artifact_path.display(), "wrote collection artifact");
        Ok(())
    }

    /// Whether the artifact is present
    ///
    /// Only a clean "absent" answer is `Ok(false)`; a failed lookup is `Io`.
    pub async fn exists(&self) -> Result<bool> {
        fs::try_exists(&self.artifact_path)
            .await
            .map_err(SyncError::Io)
    }

    /// Raw artifact contents
    pub async fn read(&self) -> Result<String> {
        fs::read_to_string(&self.artifact_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SyncError::NotFound {
                    path: self.artifact_path.clone(),
                },
                _ => SyncError::Io(e),
            })
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new(DEFAULT_WORKING_DIR)
    }
}
