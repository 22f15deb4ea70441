use std::io;

use respak_types::VfsPath;

/// Errors raised by I/O providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("file not found: {0}")]
    NotFound(VfsPath),

    #[error("directory not found: {0}")]
    DirectoryNotFound(VfsPath),

    /// An entry of the other kind already occupies the path.
    #[error("conflicting entry at {0}")]
    Conflict(VfsPath),

    #[error("not valid UTF-8: {0}")]
    InvalidUtf8(VfsPath),

    /// A shortcut leads back to itself.
    #[error("shortcut cycle at {0}")]
    ShortcutCycle(VfsPath),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: VfsPath,
        #[source]
        source: io::Error,
    },
}

impl ProviderError {
    /// True for both file and directory misses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::NotFound(_) | ProviderError::DirectoryNotFound(_)
        )
    }

    /// Map an `io::Error` from a file operation.
    pub(crate) fn from_file_io(path: &VfsPath, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::IsADirectory => {
                ProviderError::NotFound(path.clone())
            }
            _ => ProviderError::Io {
                path: path.clone(),
                source: err,
            },
        }
    }

    /// Map an `io::Error` from a directory operation.
    pub(crate) fn from_dir_io(path: &VfsPath, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                ProviderError::DirectoryNotFound(path.clone())
            }
            _ => ProviderError::Io {
                path: path.clone(),
                source: err,
            },
        }
    }
}
