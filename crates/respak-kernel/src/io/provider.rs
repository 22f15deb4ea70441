//! `IoProvider`: an addressed location on some backend.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use respak_glob::{ExtensionFilter, WildcardPattern};
use respak_types::VfsPath;

use super::backend::{Backend, BackendKind, DirEntryKind, ReadStream};
use super::{DiskBackend, MemoryBackend, NullBackend, ProviderError};

/// One link of a provider chain.
#[derive(Debug)]
struct ProviderNode {
    parent: Option<Arc<ProviderNode>>,
    /// The segment this node appends to its parent.
    child_path: VfsPath,
    /// Parent's full path plus `child_path`.
    full_path: VfsPath,
}

/// A path on a storage backend.
///
/// Providers form a chain: [`create_child`](Self::create_child) appends one
/// node per path segment, so every intermediate directory is addressable
/// through [`parent`](Self::parent). A provider never changes after
/// construction and is cheap to clone; create them per lookup instead of
/// holding on to them.
///
/// [`IoProvider::null()`] is the "no storage configured" provider. It reports
/// nothing as existing and fails every read, so callers never need to
/// special-case a missing provider.
#[derive(Clone)]
pub struct IoProvider {
    backend: Arc<dyn Backend>,
    node: Arc<ProviderNode>,
}

impl IoProvider {
    /// A provider at the root of `backend`.
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::from_backend(Arc::new(backend))
    }

    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            node: Arc::new(ProviderNode {
                parent: None,
                child_path: VfsPath::empty(),
                full_path: VfsPath::empty(),
            }),
        }
    }

    /// A provider rooted at a directory on disk.
    pub fn disk(root: impl Into<PathBuf>) -> Self {
        Self::new(DiskBackend::new(root))
    }

    /// A provider at the root of an in-memory backend.
    pub fn memory(backend: MemoryBackend) -> Self {
        Self::new(backend)
    }

    /// The provider with no backing storage.
    pub fn null() -> Self {
        Self::new(NullBackend)
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub(crate) fn as_memory(&self) -> Option<&MemoryBackend> {
        self.backend.as_memory()
    }

    /// The segment this provider appends to its parent.
    pub fn name(&self) -> &VfsPath {
        &self.node.child_path
    }

    /// Full path from the backend root.
    pub fn path(&self) -> &VfsPath {
        &self.node.full_path
    }

    pub fn parent(&self) -> Option<IoProvider> {
        self.node.parent.as_ref().map(|parent| IoProvider {
            backend: Arc::clone(&self.backend),
            node: Arc::clone(parent),
        })
    }

    /// Whether both providers address the same path on the same backend.
    pub fn same_location(&self, other: &IoProvider) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend) && self.path() == other.path()
    }

    /// Address `path` below this provider, one chain node per segment.
    ///
    /// An empty path returns this provider.
    pub fn create_child(&self, path: impl Into<VfsPath>) -> IoProvider {
        let path = path.into();
        let mut node = Arc::clone(&self.node);
        for segment in path.segments() {
            let child_path = VfsPath::new(segment);
            let full_path = node.full_path.join(&child_path);
            node = Arc::new(ProviderNode {
                parent: Some(node),
                child_path,
                full_path,
            });
        }
        IoProvider {
            backend: Arc::clone(&self.backend),
            node,
        }
    }

    /// A sibling addressing this path with `extension` appended, e.g.
    /// `lang/en_us` + `.json`. Separators in `extension` are dropped.
    pub fn add_extension(&self, extension: &str) -> IoProvider {
        IoProvider {
            backend: Arc::clone(&self.backend),
            node: Arc::new(ProviderNode {
                parent: self.node.parent.clone(),
                child_path: self.node.child_path.with_suffix(extension),
                full_path: self.node.full_path.with_suffix(extension),
            }),
        }
    }

    pub async fn directory_exists(&self) -> bool {
        self.backend.directory_exists(self.path()).await
    }

    pub async fn file_exists(&self) -> bool {
        self.backend.file_exists(self.path()).await
    }

    /// Probe each extension in order; the first existing file wins.
    pub async fn file_exists_with_extension(&self, filter: &ExtensionFilter) -> Option<IoProvider> {
        for extension in filter.extensions() {
            let candidate = self.add_extension(extension);
            if candidate.file_exists().await {
                return Some(candidate);
            }
        }
        None
    }

    /// Direct child directories.
    pub async fn list_directories(&self) -> Result<Vec<IoProvider>, ProviderError> {
        let entries = self.backend.list(self.path()).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == DirEntryKind::Directory)
            .map(|e| self.create_child(e.name.as_str()))
            .collect())
    }

    /// Direct child files, optionally filtered by name.
    pub async fn list_files(
        &self,
        filter: Option<&WildcardPattern>,
    ) -> Result<Vec<IoProvider>, ProviderError> {
        let entries = self.backend.list(self.path()).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == DirEntryKind::File)
            .filter(|e| filter.is_none_or(|f| f.matches(&e.name)))
            .map(|e| self.create_child(e.name.as_str()))
            .collect())
    }

    /// Every directory below this one, depth-first.
    pub async fn list_all_directories(&self) -> Result<Vec<IoProvider>, ProviderError> {
        let entries = self.backend.walk(self.path()).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, e)| e.kind == DirEntryKind::Directory)
            .map(|(rel, _)| self.create_child(rel))
            .collect())
    }

    /// Every file below this directory, depth-first, optionally filtered by
    /// file name.
    pub async fn list_all_files(
        &self,
        filter: Option<&WildcardPattern>,
    ) -> Result<Vec<IoProvider>, ProviderError> {
        let entries = self.backend.walk(self.path()).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, e)| e.kind == DirEntryKind::File)
            .filter(|(_, e)| filter.is_none_or(|f| f.matches(&e.name)))
            .map(|(rel, _)| self.create_child(rel))
            .collect())
    }

    pub async fn read_all_bytes(&self) -> Result<Vec<u8>, ProviderError> {
        self.backend.read(self.path()).await
    }

    pub async fn read_all_text(&self) -> Result<String, ProviderError> {
        let bytes = self.read_all_bytes().await?;
        String::from_utf8(bytes).map_err(|_| ProviderError::InvalidUtf8(self.path().clone()))
    }

    pub async fn read_lines(&self) -> Result<Vec<String>, ProviderError> {
        let text = self.read_all_text().await?;
        Ok(text.lines().map(str::to_string).collect())
    }

    pub async fn open_read(&self) -> Result<ReadStream, ProviderError> {
        self.backend.open_read(self.path()).await
    }
}

impl fmt::Debug for IoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoProvider")
            .field("backend", &self.backend.kind())
            .field("path", self.path())
            .finish()
    }
}

impl fmt::Display for IoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}", self.backend.kind(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(providers: &[IoProvider]) -> Vec<&str> {
        providers.iter().map(|p| p.path().as_str()).collect()
    }

    async fn sample() -> IoProvider {
        let mem = MemoryBackend::new();
        mem.insert(&"assets/lang/en_us.json".into(), b"{}".to_vec()).await.unwrap();
        mem.insert(&"assets/lang/de_de.json".into(), b"{}".to_vec()).await.unwrap();
        mem.insert(&"assets/textures/stone.png".into(), vec![1, 2]).await.unwrap();
        mem.insert(&"assets/textures/block/dirt.png".into(), vec![3]).await.unwrap();
        mem.insert(&"pack.json".into(), b"{}".to_vec()).await.unwrap();
        IoProvider::memory(mem)
    }

    #[test]
    fn create_child_builds_one_node_per_segment() {
        let root = IoProvider::null();
        let leaf = root.create_child("a/b/c");
        assert_eq!(leaf.path().as_str(), "a/b/c");
        assert_eq!(leaf.name().as_str(), "c");

        let b = leaf.parent().unwrap();
        assert_eq!(b.path().as_str(), "a/b");
        assert_eq!(b.name().as_str(), "b");
        let a = b.parent().unwrap();
        assert_eq!(a.path().as_str(), "a");
        assert!(a.parent().unwrap().path().is_empty());
        assert!(a.parent().unwrap().parent().is_none());
    }

    #[test]
    fn create_child_empty_is_identity() {
        let root = IoProvider::null().create_child("x");
        let same = root.create_child("");
        assert!(same.same_location(&root));
        assert_eq!(same.name().as_str(), "x");
    }

    #[test]
    fn add_extension_makes_a_sibling() {
        let base = IoProvider::null().create_child("lang/en_us");
        let json = base.add_extension(".json");
        assert_eq!(json.path().as_str(), "lang/en_us.json");
        assert_eq!(json.name().as_str(), "en_us.json");
        assert_eq!(json.parent().unwrap().path().as_str(), "lang");
    }

    #[test]
    fn add_extension_keeps_one_segment_per_node() {
        let base = IoProvider::null().create_child("lang/en_us");
        let odd = base.add_extension(".d/json");
        assert_eq!(odd.name().as_str(), "en_us.djson");
        assert_eq!(odd.name().depth(), 1);
        assert_eq!(odd.path().as_str(), "lang/en_us.djson");
        assert_eq!(odd.parent().unwrap().path().as_str(), "lang");
    }

    #[tokio::test]
    async fn existence() {
        let root = sample().await;
        assert!(root.create_child("assets/lang").directory_exists().await);
        assert!(!root.create_child("assets/lang").file_exists().await);
        assert!(root.create_child("pack.json").file_exists().await);
        assert!(!root.create_child("assets/missing/deeper").directory_exists().await);
    }

    #[tokio::test]
    async fn extensions_are_tried_in_order() {
        let root = sample().await;
        let stone = root.create_child("assets/textures/stone");
        let filter = ExtensionFilter::parse(".jpg|.png").unwrap();
        let found = stone.file_exists_with_extension(&filter).await.unwrap();
        assert_eq!(found.path().as_str(), "assets/textures/stone.png");

        let none = ExtensionFilter::parse(".tga").unwrap();
        assert!(stone.file_exists_with_extension(&none).await.is_none());
    }

    #[tokio::test]
    async fn listing() {
        let root = sample().await;
        let assets = root.create_child("assets");

        let dirs = assets.list_directories().await.unwrap();
        assert_eq!(names(&dirs), vec!["assets/lang", "assets/textures"]);

        let all_dirs = assets.list_all_directories().await.unwrap();
        assert_eq!(
            names(&all_dirs),
            vec!["assets/lang", "assets/textures", "assets/textures/block"]
        );

        let png = WildcardPattern::parse("*.png").unwrap();
        let files = assets.list_all_files(Some(&png)).await.unwrap();
        assert_eq!(
            names(&files),
            vec!["assets/textures/block/dirt.png", "assets/textures/stone.png"]
        );

        let top = root.list_files(None).await.unwrap();
        assert_eq!(names(&top), vec!["pack.json"]);
    }

    #[tokio::test]
    async fn listing_missing_directory_fails() {
        let root = sample().await;
        let err = root.create_child("nope").list_files(None).await.unwrap_err();
        assert!(matches!(err, ProviderError::DirectoryNotFound(_)));
    }

    #[tokio::test]
    async fn reads() {
        let mem = MemoryBackend::new();
        mem.insert(&"notes.txt".into(), b"one\ntwo\n".to_vec()).await.unwrap();
        mem.insert(&"blob.bin".into(), vec![0xff, 0xfe]).await.unwrap();
        let root = IoProvider::memory(mem);

        let notes = root.create_child("notes.txt");
        assert_eq!(notes.read_all_text().await.unwrap(), "one\ntwo\n");
        assert_eq!(notes.read_lines().await.unwrap(), vec!["one", "two"]);

        let blob = root.create_child("blob.bin");
        assert!(matches!(
            blob.read_all_text().await,
            Err(ProviderError::InvalidUtf8(_))
        ));

        use tokio::io::AsyncReadExt;
        let mut stream = notes.open_read().await.unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).await.unwrap();
        assert_eq!(buf, "one\ntwo\n");
    }

    #[tokio::test]
    async fn null_provider_is_empty() {
        let null = IoProvider::null().create_child("anything/at/all");
        assert!(!null.file_exists().await);
        assert!(!null.directory_exists().await);
        assert!(null.list_files(None).await.unwrap().is_empty());
        assert!(null.list_all_directories().await.unwrap().is_empty());
        assert!(matches!(
            null.read_all_bytes().await,
            Err(ProviderError::NotFound(_))
        ));
        assert_eq!(null.backend_kind(), BackendKind::Null);
    }
}
