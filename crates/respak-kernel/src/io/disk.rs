//! Disk backend.
//!
//! Provides access to real filesystem paths below a captured root.

use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use respak_types::VfsPath;
use tokio::fs;
use tokio_util::sync::CancellationToken;

use super::backend::{Backend, BackendKind, DirEntry, DirEntryKind, ReadStream};
use super::ProviderError;

/// Disk backend.
///
/// All operations are relative to `root`. For example, if `root` is
/// `/home/amy/packs`, then reading `faithful/pack.json` reads
/// `/home/amy/packs/faithful/pack.json`. Work runs through `tokio::fs`, which
/// moves the blocking calls onto the runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct DiskBackend {
    root: PathBuf,
    cancel: Option<CancellationToken>,
}

impl DiskBackend {
    /// Create a backend rooted at the given path.
    ///
    /// The root does not need to exist yet; operations on a missing root
    /// behave like operations on missing paths.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cancel: None,
        }
    }

    /// Abort in-flight and future operations once `token` is cancelled.
    ///
    /// Cancelled reads and listings fail with [`ProviderError::Cancelled`];
    /// cancelled existence checks report `false`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path to a real one.
    ///
    /// `..` segments would escape the root, so such paths resolve to nothing.
    fn resolve(&self, path: &VfsPath) -> Option<PathBuf> {
        if path.segments().any(|s| s == "..") {
            return None;
        }
        Some(self.root.join(path.as_str()))
    }

    async fn guarded<T, F>(&self, op: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>> + Send,
    {
        match &self.cancel {
            None => op.await,
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ProviderError::Cancelled),
                    result = op => result,
                }
            }
        }
    }

    async fn metadata(&self, path: &VfsPath) -> Option<std::fs::Metadata> {
        let full = self.resolve(path)?;
        self.guarded(async move { Ok(fs::metadata(&full).await.ok()) })
            .await
            .ok()
            .flatten()
    }
}

#[async_trait]
impl Backend for DiskBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Disk
    }

    async fn directory_exists(&self, path: &VfsPath) -> bool {
        self.metadata(path).await.is_some_and(|m| m.is_dir())
    }

    async fn file_exists(&self, path: &VfsPath) -> bool {
        self.metadata(path).await.is_some_and(|m| m.is_file())
    }

    async fn list(&self, path: &VfsPath) -> Result<Vec<DirEntry>, ProviderError> {
        let full = self
            .resolve(path)
            .ok_or_else(|| ProviderError::DirectoryNotFound(path.clone()))?;

        self.guarded(async move {
            let mut dir = fs::read_dir(&full)
                .await
                .map_err(|e| ProviderError::from_dir_io(path, e))?;

            let mut entries = Vec::new();
            while let Some(entry) = dir
                .next_entry()
                .await
                .map_err(|e| ProviderError::from_dir_io(path, e))?
            {
                // Follow symlinks; a dangling link is skipped.
                let Ok(metadata) = fs::metadata(entry.path()).await else {
                    continue;
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.push(DirEntry {
                    name,
                    kind: if metadata.is_dir() {
                        DirEntryKind::Directory
                    } else {
                        DirEntryKind::File
                    },
                    size: if metadata.is_dir() { 0 } else { metadata.len() },
                });
            }

            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
        .await
    }

    async fn read(&self, path: &VfsPath) -> Result<Vec<u8>, ProviderError> {
        let full = self
            .resolve(path)
            .ok_or_else(|| ProviderError::NotFound(path.clone()))?;
        self.guarded(async move {
            fs::read(&full)
                .await
                .map_err(|e| ProviderError::from_file_io(path, e))
        })
        .await
    }

    async fn open_read(&self, path: &VfsPath) -> Result<ReadStream, ProviderError> {
        let full = self
            .resolve(path)
            .ok_or_else(|| ProviderError::NotFound(path.clone()))?;
        self.guarded(async move {
            let file = fs::File::open(&full)
                .await
                .map_err(|e| ProviderError::from_file_io(path, e))?;
            Ok(Box::new(file) as ReadStream)
        })
        .await
    }
}
