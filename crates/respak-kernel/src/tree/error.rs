use respak_types::VfsPath;

use crate::io::ProviderError;

/// Errors raised by [`VirtualTree`](super::VirtualTree) operations.
///
/// All of these are hard failures: they point at a bug in the caller's path
/// logic rather than at missing data.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The node, or the directory an operation started from, was deleted.
    #[error("node has been deleted: {0}")]
    Deleted(VfsPath),

    /// A directory was expected but a file occupies the path.
    #[error("not a directory: {0}")]
    NotADirectory(VfsPath),

    /// A file was expected but a directory occupies the path.
    #[error("not a file: {0}")]
    NotAFile(VfsPath),

    #[error("directory not found: {0}")]
    DirectoryNotFound(VfsPath),

    /// The file is already part of a tree; move or copy it instead.
    #[error("file already attached at {0}")]
    AlreadyAttached(VfsPath),

    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// The id does not belong to this tree.
    #[error("unknown node id {0}")]
    UnknownNode(usize),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
