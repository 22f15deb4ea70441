//! The storage backend trait behind every [`IoProvider`](super::IoProvider).

use std::fmt;
use std::io::Cursor;

use async_trait::async_trait;
use respak_types::VfsPath;
use tokio::io::AsyncRead;

use super::{MemoryBackend, ProviderError};

/// A readable byte stream returned by `open_read`.
pub type ReadStream = Box<dyn AsyncRead + Send + Unpin>;

/// Which storage a backend talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Disk,
    Memory,
    Null,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Disk => "disk",
            BackendKind::Memory => "memory",
            BackendKind::Null => "null",
        })
    }
}

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
}

/// A directory entry as reported by [`Backend::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    pub kind: DirEntryKind,
    /// Size in bytes (0 for directories and shortcut files).
    pub size: u64,
}

impl DirEntry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::Directory,
            size: 0,
        }
    }

    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::File,
            size,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == DirEntryKind::File
    }
}

/// Abstract storage interface.
///
/// Paths are relative to the backend root and already normalized. Existence
/// checks never fail: anything that cannot be resolved simply does not exist.
/// Enumeration of a path that is not a directory fails with
/// [`ProviderError::DirectoryNotFound`].
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// The in-memory backend behind this one, if it is one. Lets memory
    /// shortcuts be followed without recursion.
    fn as_memory(&self) -> Option<&MemoryBackend> {
        None
    }

    async fn directory_exists(&self, path: &VfsPath) -> bool;

    async fn file_exists(&self, path: &VfsPath) -> bool;

    /// List the direct children of a directory, sorted by name.
    async fn list(&self, path: &VfsPath) -> Result<Vec<DirEntry>, ProviderError>;

    /// Read the entire contents of a file.
    async fn read(&self, path: &VfsPath) -> Result<Vec<u8>, ProviderError>;

    /// Open a file for streaming reads.
    ///
    /// The default reads the whole file up front.
    async fn open_read(&self, path: &VfsPath) -> Result<ReadStream, ProviderError> {
        let data = self.read(path).await?;
        Ok(Box::new(Cursor::new(data)))
    }

    /// Every descendant of a directory, depth-first, parents before children.
    ///
    /// Returned paths are relative to `path`; the start directory itself is
    /// not included.
    async fn walk(&self, path: &VfsPath) -> Result<Vec<(VfsPath, DirEntry)>, ProviderError> {
        let mut out = Vec::new();
        let mut stack: Vec<(VfsPath, DirEntry)> = self
            .list(path)
            .await?
            .into_iter()
            .rev()
            .map(|e| (VfsPath::new(&e.name), e))
            .collect();

        while let Some((rel, entry)) = stack.pop() {
            if entry.is_dir() {
                let children = self.list(&path.join(&rel)).await?;
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|e| (rel.join(e.name.as_str()), e)),
                );
            }
            out.push((rel, entry));
        }
        Ok(out)
    }
}
