//! In-memory backend.
//!
//! A tree of directories, each guarding its own child maps with a
//! `tokio::sync::RwLock`. Files hold raw bytes or are shortcuts that fetch
//! their bytes from another [`IoProvider`] on every read.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use respak_types::VfsPath;
use tokio::sync::RwLock;

use super::backend::{Backend, BackendKind, DirEntry};
use super::{IoProvider, ProviderError};

/// File stored in a [`MemoryBackend`].
#[derive(Debug, Clone)]
enum MemFile {
    Bytes(Arc<[u8]>),
    Shortcut(IoProvider),
}

#[derive(Debug, Default)]
struct MemEntries {
    dirs: BTreeMap<String, Arc<MemDir>>,
    files: BTreeMap<String, MemFile>,
}

#[derive(Debug, Default)]
struct MemDir {
    entries: RwLock<MemEntries>,
}

/// In-memory backend.
///
/// Cloning shares the same tree. [`MemoryBackend::shared`] is the
/// process-wide instance; [`MemoryBackend::new`] creates an isolated one.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    root: Arc<MemDir>,
}

static SHARED: OnceLock<MemoryBackend> = OnceLock::new();

impl MemoryBackend {
    /// Create an empty, isolated backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide backend.
    pub fn shared() -> Self {
        SHARED.get_or_init(MemoryBackend::new).clone()
    }

    /// Walk to a directory. Any missing segment yields `None`.
    async fn find_dir(&self, path: &VfsPath) -> Option<Arc<MemDir>> {
        let mut current = Arc::clone(&self.root);
        for segment in path.segments() {
            let next = current.entries.read().await.dirs.get(segment).cloned()?;
            current = next;
        }
        Some(current)
    }

    async fn find_file(&self, path: &VfsPath) -> Option<MemFile> {
        if path.is_empty() {
            return None;
        }
        let dir = self.find_dir(&path.parent()).await?;
        let entries = dir.entries.read().await;
        entries.files.get(path.file_name()).cloned()
    }

    /// Walk to a directory, creating missing segments.
    async fn ensure_dir(&self, path: &VfsPath) -> Result<(Arc<MemDir>, bool), ProviderError> {
        let mut current = Arc::clone(&self.root);
        let mut created = false;
        let mut walked = VfsPath::empty();
        for segment in path.segments() {
            walked = walked.join(segment);
            let next = {
                let mut entries = current.entries.write().await;
                if entries.files.contains_key(segment) {
                    return Err(ProviderError::Conflict(walked));
                }
                match entries.dirs.get(segment) {
                    Some(dir) => Arc::clone(dir),
                    None => {
                        created = true;
                        let dir = Arc::new(MemDir::default());
                        entries.dirs.insert(segment.to_string(), Arc::clone(&dir));
                        dir
                    }
                }
            };
            current = next;
        }
        Ok((current, created))
    }

    /// Create a directory and any missing parents.
    ///
    /// Returns `true` if anything was created.
    pub async fn create_dir(&self, path: &VfsPath) -> Result<bool, ProviderError> {
        let (_, created) = self.ensure_dir(path).await?;
        Ok(created)
    }

    /// Store a file, creating parent directories. Overwrites an existing file.
    pub async fn insert(&self, path: &VfsPath, data: impl Into<Vec<u8>>) -> Result<(), ProviderError> {
        self.put(path, MemFile::Bytes(Arc::from(data.into()))).await
    }

    /// Store a shortcut whose reads are served by `target`.
    pub async fn insert_shortcut(&self, path: &VfsPath, target: IoProvider) -> Result<(), ProviderError> {
        self.put(path, MemFile::Shortcut(target)).await
    }

    async fn put(&self, path: &VfsPath, file: MemFile) -> Result<(), ProviderError> {
        if path.is_empty() {
            return Err(ProviderError::Conflict(path.clone()));
        }
        let (dir, _) = self.ensure_dir(&path.parent()).await?;
        let mut entries = dir.entries.write().await;
        let name = path.file_name();
        if entries.dirs.contains_key(name) {
            return Err(ProviderError::Conflict(path.clone()));
        }
        entries.files.insert(name.to_string(), file);
        tracing::trace!(path = %path, "memory backend: stored file");
        Ok(())
    }

    /// Remove a file or a whole directory. Returns `true` if something was removed.
    pub async fn remove(&self, path: &VfsPath) -> bool {
        if path.is_empty() {
            return false;
        }
        let Some(dir) = self.find_dir(&path.parent()).await else {
            return false;
        };
        let mut entries = dir.entries.write().await;
        let name = path.file_name();
        entries.files.remove(name).is_some() || entries.dirs.remove(name).is_some()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn as_memory(&self) -> Option<&MemoryBackend> {
        Some(self)
    }

    async fn directory_exists(&self, path: &VfsPath) -> bool {
        self.find_dir(path).await.is_some()
    }

    async fn file_exists(&self, path: &VfsPath) -> bool {
        self.find_file(path).await.is_some()
    }

    async fn list(&self, path: &VfsPath) -> Result<Vec<DirEntry>, ProviderError> {
        let dir = self
            .find_dir(path)
            .await
            .ok_or_else(|| ProviderError::DirectoryNotFound(path.clone()))?;
        let entries = dir.entries.read().await;

        let mut result: Vec<DirEntry> = entries
            .dirs
            .keys()
            .map(DirEntry::directory)
            .chain(entries.files.iter().map(|(name, file)| {
                let size = match file {
                    MemFile::Bytes(data) => data.len() as u64,
                    MemFile::Shortcut(_) => 0,
                };
                DirEntry::file(name, size)
            }))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    /// Shortcuts into memory backends are followed in a loop; revisiting a
    /// location fails with [`ProviderError::ShortcutCycle`].
    async fn read(&self, path: &VfsPath) -> Result<Vec<u8>, ProviderError> {
        let mut backend = self.clone();
        let mut path = path.clone();
        let mut visited = HashSet::new();
        loop {
            let location = (Arc::as_ptr(&backend.root) as usize, path.clone());
            if !visited.insert(location) {
                return Err(ProviderError::ShortcutCycle(path));
            }
            let target = match backend.find_file(&path).await {
                Some(MemFile::Bytes(data)) => return Ok(data.to_vec()),
                Some(MemFile::Shortcut(target)) => target,
                None => return Err(ProviderError::NotFound(path)),
            };
            match target.as_memory() {
                Some(next) => {
                    backend = next.clone();
                    path = target.path().clone();
                }
                None => return target.read_all_bytes().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_read() {
        let mem = MemoryBackend::new();
        mem.insert(&"a/b/c.txt".into(), b"nested".to_vec()).await.unwrap();
        assert_eq!(mem.read(&"a/b/c.txt".into()).await.unwrap(), b"nested");
        assert!(mem.directory_exists(&"a/b".into()).await);
        assert!(mem.directory_exists(&VfsPath::empty()).await);
    }

    #[tokio::test]
    async fn misses_are_not_errors_for_existence() {
        let mem = MemoryBackend::new();
        assert!(!mem.file_exists(&"x/y/z".into()).await);
        assert!(!mem.directory_exists(&"x".into()).await);
        assert!(!mem.file_exists(&VfsPath::empty()).await);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let mem = MemoryBackend::new();
        let err = mem.read(&"nope.txt".into()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn overwrite_file() {
        let mem = MemoryBackend::new();
        mem.insert(&"f".into(), b"first".to_vec()).await.unwrap();
        mem.insert(&"f".into(), b"second".to_vec()).await.unwrap();
        assert_eq!(mem.read(&"f".into()).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn file_and_directory_names_conflict() {
        let mem = MemoryBackend::new();
        mem.insert(&"a/file".into(), vec![]).await.unwrap();
        assert!(matches!(
            mem.create_dir(&"a/file/sub".into()).await,
            Err(ProviderError::Conflict(_))
        ));
        assert!(matches!(
            mem.insert(&"a".into(), vec![]).await,
            Err(ProviderError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn create_dir_reports_creation() {
        let mem = MemoryBackend::new();
        assert!(mem.create_dir(&"x/y".into()).await.unwrap());
        assert!(!mem.create_dir(&"x/y".into()).await.unwrap());
        assert!(mem.list(&"x/y".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_merges_and_sorts() {
        let mem = MemoryBackend::new();
        mem.insert(&"d/b.txt".into(), b"bb".to_vec()).await.unwrap();
        mem.insert(&"d/c/inner".into(), vec![]).await.unwrap();
        mem.insert(&"d/a.txt".into(), b"a".to_vec()).await.unwrap();

        let entries = mem.list(&"d".into()).await.unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry::file("a.txt", 1),
                DirEntry::file("b.txt", 2),
                DirEntry::directory("c"),
            ]
        );
    }

    #[tokio::test]
    async fn list_of_file_is_directory_not_found() {
        let mem = MemoryBackend::new();
        mem.insert(&"f".into(), vec![]).await.unwrap();
        assert!(matches!(
            mem.list(&"f".into()).await,
            Err(ProviderError::DirectoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn shortcut_delegates_reads() {
        let source = MemoryBackend::new();
        source.insert(&"real/data.bin".into(), vec![9, 8, 7]).await.unwrap();
        let target = IoProvider::memory(source.clone()).create_child("real/data.bin");

        let mem = MemoryBackend::new();
        mem.insert_shortcut(&"link.bin".into(), target).await.unwrap();
        assert!(mem.file_exists(&"link.bin".into()).await);
        assert_eq!(mem.read(&"link.bin".into()).await.unwrap(), vec![9, 8, 7]);

        // The shortcut follows later changes to its target.
        source.insert(&"real/data.bin".into(), vec![1]).await.unwrap();
        assert_eq!(mem.read(&"link.bin".into()).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn shortcut_cycles_are_reported() {
        let mem = MemoryBackend::new();
        let root = IoProvider::memory(mem.clone());
        mem.insert_shortcut(&"self.bin".into(), root.create_child("self.bin"))
            .await
            .unwrap();
        assert!(matches!(
            mem.read(&"self.bin".into()).await,
            Err(ProviderError::ShortcutCycle(p)) if p.as_str() == "self.bin"
        ));

        // a -> other:b -> a, across two backends.
        let other = MemoryBackend::new();
        mem.insert_shortcut(&"a".into(), IoProvider::memory(other.clone()).create_child("b"))
            .await
            .unwrap();
        other.insert_shortcut(&"b".into(), root.create_child("a")).await.unwrap();
        assert!(matches!(
            root.create_child("a").read_all_bytes().await,
            Err(ProviderError::ShortcutCycle(_))
        ));
    }

    #[tokio::test]
    async fn shortcut_chains_resolve() {
        let mem = MemoryBackend::new();
        let root = IoProvider::memory(mem.clone());
        mem.insert(&"data".into(), b"end".to_vec()).await.unwrap();
        mem.insert_shortcut(&"one".into(), root.create_child("data")).await.unwrap();
        mem.insert_shortcut(&"two".into(), root.create_child("one")).await.unwrap();
        assert_eq!(mem.read(&"two".into()).await.unwrap(), b"end");

        mem.insert_shortcut(&"dangling".into(), root.create_child("nope")).await.unwrap();
        assert!(matches!(
            mem.read(&"dangling".into()).await,
            Err(ProviderError::NotFound(p)) if p.as_str() == "nope"
        ));
    }

    #[tokio::test]
    async fn remove_file_and_directory() {
        let mem = MemoryBackend::new();
        mem.insert(&"d/f".into(), vec![]).await.unwrap();
        assert!(mem.remove(&"d/f".into()).await);
        assert!(!mem.remove(&"d/f".into()).await);
        assert!(mem.remove(&"d".into()).await);
        assert!(!mem.directory_exists(&"d".into()).await);
    }

    #[tokio::test]
    async fn walk_is_depth_first() {
        let mem = MemoryBackend::new();
        mem.insert(&"r/a/x".into(), vec![]).await.unwrap();
        mem.insert(&"r/b".into(), vec![]).await.unwrap();
        let walked: Vec<String> = mem
            .walk(&"r".into())
            .await
            .unwrap()
            .into_iter()
            .map(|(p, _)| p.to_string())
            .collect();
        assert_eq!(walked, vec!["a", "a/x", "b"]);
    }

    #[tokio::test]
    async fn shared_is_one_instance() {
        let a = MemoryBackend::shared();
        let b = MemoryBackend::shared();
        a.insert(&"shared-instance-test/x".into(), vec![1]).await.unwrap();
        assert!(b.file_exists(&"shared-instance-test/x".into()).await);
        assert!(a.remove(&"shared-instance-test".into()).await);
    }
}
