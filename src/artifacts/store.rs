//! Artifact Store
//!
//! Owns the scratch and download directories. Scratch files are handed out
//! as [`ScratchFile`] guards; outputs are reserved as [`PendingArtifact`]s
//! and become [`StoredArtifact`]s once the conversion succeeds.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use uuid::Uuid;

use super::ArtifactKind;
use crate::error::ToolError;
use crate::upload::ScratchFile;

/// Handle on the scratch and download areas
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    upload_dir: PathBuf,
    download_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(upload_dir: impl AsRef<Path>, download_dir: impl AsRef<Path>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                upload_dir: upload_dir.as_ref().to_path_buf(),
                download_dir: download_dir.as_ref().to_path_buf(),
            }),
        }
    }

    /// Create both directories if missing
    pub async fn init(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.inner.upload_dir).await?;
        tokio::fs::create_dir_all(&self.inner.download_dir).await?;
        Ok(())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.inner.upload_dir
    }

    pub fn download_dir(&self) -> &Path {
        &self.inner.download_dir
    }

    /// Persist uploaded bytes as `temp_<hex>.pdf` in the scratch area
    pub async fn stage_upload(&self, data: &[u8]) -> io::Result<ScratchFile> {
        let scratch = self.scratch_file("pdf");
        tokio::fs::write(scratch.path(), data).await?;

        tracing::debug!(
            path = %scratch.path().display(),
            bytes = data.len(),
            "Staged upload"
        );

        Ok(scratch)
    }

    /// Reserve a scratch path without writing it
    ///
    /// The guard removes whatever ends up at the path when dropped.
    pub fn scratch_file(&self, extension: &str) -> ScratchFile {
        let name = format!("temp_{}.{}", Uuid::new_v4().simple(), extension);
        ScratchFile::new(self.inner.upload_dir.join(name))
    }

    /// Reserve an output artifact in the download area
    pub fn reserve(&self, kind: ArtifactKind) -> PendingArtifact {
        let file_name = kind.file_name();
        let path = self.inner.download_dir.join(&file_name);
        PendingArtifact {
            file_name,
            path,
            kind,
            committed: false,
        }
    }

    /// Resolve a client-supplied name to an existing artifact
    pub async fn locate(&self, file_name: &str) -> Result<StoredArtifact, ToolError> {
        if !is_safe_file_name(file_name) {
            tracing::warn!("Rejected artifact name: {:?}", file_name);
            return Err(ToolError::NotFound);
        }

        let path = self.inner.download_dir.join(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(StoredArtifact {
                file_name: file_name.to_string(),
                path,
                size: meta.len(),
            }),
            Ok(_) => Err(ToolError::NotFound),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to stat artifact {}: {}", path.display(), e);
                }
                Err(ToolError::NotFound)
            }
        }
    }

    /// Open an artifact for streaming it back to the client
    pub async fn open(&self, file_name: &str) -> Result<(StoredArtifact, tokio::fs::File), ToolError> {
        let artifact = self.locate(file_name).await?;
        let file = tokio::fs::File::open(&artifact.path).await.map_err(|e| {
            tracing::warn!("Failed to open artifact {}: {}", artifact.path.display(), e);
            ToolError::NotFound
        })?;
        Ok((artifact, file))
    }

    /// Delete files older than `ttl` from both areas
    ///
    /// Returns the number of files removed.
    pub async fn purge_expired(&self, ttl: Duration) -> io::Result<usize> {
        let Some(cutoff) = SystemTime::now().checked_sub(ttl) else {
            return Ok(0);
        };

        let mut removed = 0;
        for dir in [&self.inner.upload_dir, &self.inner.download_dir] {
            removed += purge_dir(dir, cutoff).await?;
        }
        Ok(removed)
    }
}

async fn purge_dir(dir: &Path, cutoff: SystemTime) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let meta = match entry.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if !meta.is_file() {
            continue;
        }

        let expired = meta.modified().map(|m| m < cutoff).unwrap_or(false);
        if !expired {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => {
                tracing::debug!("Purged {}", entry.path().display());
                removed += 1;
            }
            Err(e) => tracing::warn!("Failed to purge {}: {}", entry.path().display(), e),
        }
    }

    Ok(removed)
}

/// Only bare names are served: no separators, no parent references, no
/// hidden files.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Output file being produced by a conversion
///
/// Dropping it without calling [`PendingArtifact::commit`] deletes the file.
#[derive(Debug)]
pub struct PendingArtifact {
    file_name: String,
    path: PathBuf,
    kind: ArtifactKind,
    committed: bool,
}

impl PendingArtifact {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Keep the file and hand out a retrievable reference
    pub async fn commit(mut self) -> io::Result<StoredArtifact> {
        let meta = tokio::fs::metadata(&self.path).await?;
        self.committed = true;

        Ok(StoredArtifact {
            file_name: self.file_name.clone(),
            path: self.path.clone(),
            size: meta.len(),
        })
    }
}

impl Drop for PendingArtifact {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed partial artifact {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove partial artifact {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// A finished artifact in the download area
#[derive(Debug, Clone, Serialize)]
pub struct StoredArtifact {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size: u64,
}

impl StoredArtifact {
    /// Retrieval path handed back to the client
    pub fn download_url(&self) -> String {
        format!("/download/{}", self.file_name)
    }
}
