use async_trait::async_trait;
use respak_types::VfsPath;

use super::backend::{Backend, BackendKind, DirEntry};
use super::ProviderError;

/// Backend with no storage.
///
/// Nothing exists and every directory lists as empty, so a provider over it
/// behaves like an unconfigured mount point. Reads fail with `NotFound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[async_trait]
impl Backend for NullBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Null
    }

    async fn directory_exists(&self, _path: &VfsPath) -> bool {
        false
    }

    async fn file_exists(&self, _path: &VfsPath) -> bool {
        false
    }

    async fn list(&self, _path: &VfsPath) -> Result<Vec<DirEntry>, ProviderError> {
        Ok(Vec::new())
    }

    async fn read(&self, path: &VfsPath) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::NotFound(path.clone()))
    }
}
