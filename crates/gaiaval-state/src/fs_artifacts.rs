//! Filesystem-backed artifact store
//!
//! Layout: `<root>/<task_id>/attempt-<n>/<sha256 hex>`
//!
//! Blobs are written to a temp file in the target directory, synced, and
//! renamed into place, so a reader never observes a partial artifact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::storage_traits::{ArtifactRef, ArtifactStore, ContentDigest, StorageResult};

/// Filesystem-backed [`ArtifactStore`].
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a new store rooted at `root`. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn attempt_dir(&self, task_id: &str, attempt_number: u32) -> StorageResult<PathBuf> {
        validate_segment(task_id)?;
        Ok(self
            .root
            .join(task_id)
            .join(format!("attempt-{attempt_number}")))
    }
}

/// Task ids become directory names; reject anything that could escape the root.
fn validate_segment(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

fn write_blob(dir: &Path, digest: &ContentDigest, data: &[u8]) -> StorageResult<()> {
    let path = dir.join(digest.as_str());
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(())
}

fn blocking_error(err: tokio::task::JoinError) -> StorageError {
    StorageError::Backend(format!("artifact task failed: {err}"))
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn append_artifact(
        &self,
        task_id: &str,
        attempt_number: u32,
        blob: &[u8],
    ) -> StorageResult<ArtifactRef> {
        let dir = self.attempt_dir(task_id, attempt_number)?;
        let digest = ContentDigest::from_bytes(blob);
        let data = blob.to_vec();
        let write_digest = digest.clone();

        tokio::task::spawn_blocking(move || write_blob(&dir, &write_digest, &data))
            .await
            .map_err(blocking_error)??;

        debug!(task_id, attempt_number, digest = %digest.short(), "artifact stored");

        Ok(ArtifactRef {
            task_id: task_id.to_string(),
            attempt_number,
            digest,
            size_bytes: blob.len() as u64,
        })
    }

    async fn list_artifacts(
        &self,
        task_id: &str,
        attempt_number: u32,
    ) -> StorageResult<Vec<ArtifactRef>> {
        let dir = self.attempt_dir(task_id, attempt_number)?;
        let task_id = task_id.to_string();

        tokio::task::spawn_blocking(move || -> StorageResult<Vec<ArtifactRef>> {
            if !dir.is_dir() {
                return Ok(Vec::new());
            }
            let mut refs = Vec::new();
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                // Leftover temp files from interrupted writes are not artifacts.
                let Ok(digest) = ContentDigest::try_from(name) else {
                    continue;
                };
                refs.push(ArtifactRef {
                    task_id: task_id.clone(),
                    attempt_number,
                    digest,
                    size_bytes: entry.metadata()?.len(),
                });
            }
            refs.sort_by(|a, b| a.digest.as_str().cmp(b.digest.as_str()));
            Ok(refs)
        })
        .await
        .map_err(blocking_error)?
    }

    async fn read(&self, artifact: &ArtifactRef) -> StorageResult<Vec<u8>> {
        let path = self
            .attempt_dir(&artifact.task_id, artifact.attempt_number)?
            .join(artifact.digest.as_str());
        let what = format!(
            "artifact {} for {} attempt {}",
            artifact.digest.short(),
            artifact.task_id,
            artifact.attempt_number
        );

        tokio::task::spawn_blocking(move || {
            fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StorageError::NotFound { what }
                } else {
                    StorageError::Io(e)
                }
            })
        })
        .await
        .map_err(blocking_error)?
    }
}
