//! In-memory directory tree.
//!
//! [`VirtualTree`] is an explicit namespace of directories and files that is
//! independent of any [`IoProvider`](crate::io::IoProvider). Nodes live in an
//! arena and are addressed by [`DirId`] / [`FileId`]; parents and roots are
//! stored as ids, while the owning direction is each directory's child map.
//!
//! Deleting a node tombstones it and its whole subtree, releasing the slots
//! and any file content they held. Slots are reused under a new generation,
//! so ids of deleted nodes still observe the deletion through
//! [`VirtualTree::is_deleted`]; every other operation on them fails with
//! [`TreeError::Deleted`]. Ids carry the tree they came from and are
//! rejected by any other tree.
//!
//! Directory lookups are memoized per absolute path, including misses. Any
//! structural change clears the whole cache.
//!
//! Lookups take `&self` and mutations `&mut self`. The tree has no internal
//! locking beyond its cache; share it across tasks behind a lock.

mod error;
mod node;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use respak_types::VfsPath;
use tracing::{debug, trace};

use crate::io::ProviderError;

pub use error::TreeError;
use node::{Entry, Key, Node, NodeKind, Slot};
pub use node::{DirId, FileContent, FileId, NodeId};

type LookupCache = HashMap<VfsPath, Option<DirId>>;

static NEXT_TREE: AtomicU32 = AtomicU32::new(0);

/// A tree of directories and files rooted at a single directory.
#[derive(Debug)]
pub struct VirtualTree {
    tag: u32,
    entries: Vec<Entry>,
    /// Released slots, reused before the arena grows.
    free: Vec<usize>,
    root: DirId,
    cache: Mutex<LookupCache>,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTree {
    /// Create a tree holding only its root directory.
    pub fn new() -> Self {
        let tag = NEXT_TREE.fetch_add(1, Ordering::Relaxed);
        let root = DirId(Key {
            tree: tag,
            index: 0,
            generation: 0,
        });
        Self {
            tag,
            entries: vec![Entry {
                generation: 0,
                slot: Slot::Live(Node {
                    root: Some(root),
                    parent: None,
                    name: String::new(),
                    full_path: VfsPath::empty(),
                    kind: NodeKind::Directory {
                        children: BTreeMap::new(),
                    },
                }),
            }],
            free: Vec::new(),
            root,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The topmost directory.
    pub fn root(&self) -> DirId {
        self.root
    }

    // ------------------------------------------------------------------
    // Node access
    // ------------------------------------------------------------------

    fn entry(&self, key: Key) -> Result<&Entry, TreeError> {
        if key.tree != self.tag {
            return Err(TreeError::UnknownNode(key.index));
        }
        self.entries.get(key.index).ok_or(TreeError::UnknownNode(key.index))
    }

    /// A node that has not been deleted.
    fn live(&self, id: impl Into<NodeId>) -> Result<&Node, TreeError> {
        let id = id.into();
        self.entry(id.key())?.check(id)
    }

    fn live_mut(&mut self, id: impl Into<NodeId>) -> Result<&mut Node, TreeError> {
        let id = id.into();
        let key = id.key();
        if key.tree != self.tag {
            return Err(TreeError::UnknownNode(key.index));
        }
        self.entries
            .get_mut(key.index)
            .ok_or(TreeError::UnknownNode(key.index))?
            .check_mut(id)
    }

    fn children(&self, dir: DirId) -> Result<&BTreeMap<String, NodeId>, TreeError> {
        match &self.live(dir)?.kind {
            NodeKind::Directory { children } => Ok(children),
            NodeKind::File { .. } => Err(TreeError::UnknownNode(dir.0.index)),
        }
    }

    fn children_mut(&mut self, dir: DirId) -> Result<&mut BTreeMap<String, NodeId>, TreeError> {
        match &mut self.live_mut(dir)?.kind {
            NodeKind::Directory { children } => Ok(children),
            NodeKind::File { .. } => Err(TreeError::UnknownNode(dir.0.index)),
        }
    }

    /// Store `node` in a released slot if there is one, else grow the arena.
    fn alloc(&mut self, node: Node) -> Key {
        if let Some(index) = self.free.pop() {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.slot = Slot::Live(node);
                return Key {
                    tree: self.tag,
                    index,
                    generation: entry.generation,
                };
            }
        }
        let index = self.entries.len();
        self.entries.push(Entry {
            generation: 0,
            slot: Slot::Live(node),
        });
        Key {
            tree: self.tag,
            index,
            generation: 0,
        }
    }

    // ------------------------------------------------------------------
    // Lookup cache
    // ------------------------------------------------------------------

    fn cache(&self) -> MutexGuard<'_, LookupCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn invalidate(&mut self) {
        let cache = self.cache.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !cache.is_empty() {
            trace!(entries = cache.len(), "tree lookup cache cleared");
            cache.clear();
        }
    }

    /// Uncached walk from the root.
    fn resolve_dir(&self, absolute: &VfsPath) -> Option<DirId> {
        let mut current = self.root;
        for segment in absolute.segments() {
            match self.children(current).ok()?.get(segment) {
                Some(NodeId::Dir(dir)) => current = *dir,
                _ => return None,
            }
        }
        Some(current)
    }

    // ------------------------------------------------------------------
    // Directories
    // ------------------------------------------------------------------

    /// Create `path` below `at`, including missing intermediate directories.
    ///
    /// Returns `true` if at least one directory was created and `false` if
    /// the whole path already existed. Fails with
    /// [`TreeError::NotADirectory`] if a file sits on the path.
    pub fn create_directory(&mut self, at: DirId, path: impl Into<VfsPath>) -> Result<bool, TreeError> {
        let path = path.into();
        self.live(at)?;

        let mut current = at;
        let mut created = false;
        for segment in path.segments() {
            let existing = self.children(current)?.get(segment).copied();
            match existing {
                Some(NodeId::Dir(dir)) => current = dir,
                Some(NodeId::File(_)) => {
                    let occupied = self.live(current)?.full_path.join(segment);
                    return Err(TreeError::NotADirectory(occupied));
                }
                None => {
                    if !created {
                        self.invalidate();
                    }
                    current = self.attach_directory(current, segment)?;
                    created = true;
                }
            }
        }

        if created {
            debug!(path = %self.live(current)?.full_path, "created directory");
        }
        Ok(created)
    }

    fn attach_directory(&mut self, parent: DirId, name: &str) -> Result<DirId, TreeError> {
        let parent_node = self.live(parent)?;
        let node = Node {
            root: parent_node.root,
            parent: Some(parent),
            name: name.to_string(),
            full_path: parent_node.full_path.join(name),
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        };
        let id = DirId(self.alloc(node));
        self.children_mut(parent)?.insert(name.to_string(), NodeId::Dir(id));
        Ok(id)
    }

    /// Delete the directory at `path` and tombstone its subtree.
    ///
    /// Returns `false` if nothing exists at that name.
    pub fn delete_directory(&mut self, at: DirId, path: impl Into<VfsPath>) -> Result<bool, TreeError> {
        let path = path.into();
        let (parent, name) = self.split_target(at, &path)?;
        let existing = self.children(parent)?.get(&name).copied();
        match existing {
            None => Ok(false),
            Some(NodeId::File(file)) => Err(TreeError::NotADirectory(self.live(file)?.full_path.clone())),
            Some(NodeId::Dir(dir)) => {
                let deleted = self.live(dir)?.full_path.clone();
                self.invalidate();
                self.children_mut(parent)?.remove(&name);
                let released = self.tombstone(NodeId::Dir(dir));
                debug!(path = %deleted, released, "deleted directory");
                Ok(true)
            }
        }
    }

    /// Resolve `path` below `at` to a directory.
    ///
    /// Results are cached by absolute path, so repeated misses are as cheap
    /// as hits. An empty path resolves to `at` itself.
    pub fn get_directory(&self, at: DirId, path: impl Into<VfsPath>) -> Result<Option<DirId>, TreeError> {
        let absolute = self.live(at)?.full_path.join(path.into());

        let mut cache = self.cache();
        if let Some(hit) = cache.get(&absolute) {
            trace!(path = %absolute, found = hit.is_some(), "tree lookup cache hit");
            return Ok(*hit);
        }
        let found = self.resolve_dir(&absolute);
        cache.insert(absolute, found);
        Ok(found)
    }

    fn require_directory(&self, at: DirId, path: &VfsPath) -> Result<DirId, TreeError> {
        match self.get_directory(at, path)? {
            Some(dir) => Ok(dir),
            None => Err(TreeError::DirectoryNotFound(self.live(at)?.full_path.join(path))),
        }
    }

    /// Split a non-empty target path into its resolved parent directory and
    /// final segment.
    fn split_target(&self, at: DirId, path: &VfsPath) -> Result<(DirId, String), TreeError> {
        self.live(at)?;
        if path.is_empty() {
            return Err(TreeError::InvalidPath(path.to_string()));
        }
        let parent = self.require_directory(at, &path.parent())?;
        Ok((parent, path.file_name().to_string()))
    }

    /// Mark `id` and everything below it deleted and release their slots.
    /// Returns the number of nodes released.
    fn tombstone(&mut self, id: NodeId) -> usize {
        let mut released = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let index = id.key().index;
            let Some(entry) = self.entries.get_mut(index) else {
                continue;
            };
            let Ok(last_path) = entry.check(id).map(|node| node.full_path.clone()) else {
                continue;
            };
            let Slot::Live(node) = std::mem::replace(&mut entry.slot, Slot::Deleted { last_path }) else {
                continue;
            };
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(index);
            released += 1;

            if let NodeKind::Directory { children } = node.kind {
                stack.extend(children.into_values());
            }
        }
        released
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Create an independent file, not yet part of any directory.
    pub fn new_file(&mut self, content: impl Into<FileContent>) -> FileId {
        FileId(self.alloc(Node {
            root: None,
            parent: None,
            name: String::new(),
            full_path: VfsPath::empty(),
            kind: NodeKind::File {
                content: content.into(),
            },
        }))
    }

    /// Attach an independent file at `path` below `at`.
    ///
    /// An existing file of the same name is replaced and tombstoned. Fails
    /// with [`TreeError::AlreadyAttached`] if `file` already belongs to a
    /// directory; use [`move_file`](Self::move_file) or
    /// [`copy_file`](Self::copy_file) for that.
    pub fn write_file(&mut self, at: DirId, path: impl Into<VfsPath>, file: FileId) -> Result<(), TreeError> {
        let path = path.into();
        let node = self.live(file)?;
        if node.root.is_some() {
            return Err(TreeError::AlreadyAttached(node.full_path.clone()));
        }
        let (parent, name) = self.split_target(at, &path)?;
        self.attach_file(parent, name, file)
    }

    /// The file currently stored under `name`, or a type mismatch if a
    /// directory holds the name.
    fn file_slot(&self, parent: DirId, name: &str) -> Result<Option<FileId>, TreeError> {
        match self.children(parent)?.get(name) {
            Some(NodeId::Dir(dir)) => Err(TreeError::NotAFile(self.live(*dir)?.full_path.clone())),
            Some(NodeId::File(existing)) => Ok(Some(*existing)),
            None => Ok(None),
        }
    }

    fn attach_file(&mut self, parent: DirId, name: String, file: FileId) -> Result<(), TreeError> {
        let replaced = self.file_slot(parent, &name)?;
        let parent_node = self.live(parent)?;
        let root = parent_node.root;
        let full_path = parent_node.full_path.join(name.as_str());

        self.invalidate();
        if let Some(existing) = replaced {
            self.tombstone(NodeId::File(existing));
        }
        self.children_mut(parent)?.insert(name.clone(), NodeId::File(file));

        let node = self.live_mut(file)?;
        node.root = root;
        node.parent = Some(parent);
        node.name = name;
        node.full_path = full_path;
        trace!(path = %node.full_path, replaced = replaced.is_some(), "wrote file");
        Ok(())
    }

    /// Detach an attached file, making it independent again.
    fn detach_file(&mut self, file: FileId) -> Result<(), TreeError> {
        let node = self.live(file)?;
        if let Some(parent) = node.parent {
            let name = node.name.clone();
            self.children_mut(parent)?.remove(&name);
            self.invalidate();
        }
        let node = self.live_mut(file)?;
        node.root = None;
        node.parent = None;
        node.name.clear();
        node.full_path = VfsPath::empty();
        Ok(())
    }

    /// Delete the file at `path`. Returns `false` if nothing exists at that
    /// name.
    pub fn delete_file(&mut self, at: DirId, path: impl Into<VfsPath>) -> Result<bool, TreeError> {
        let path = path.into();
        let (parent, name) = self.split_target(at, &path)?;
        let existing = self.file_slot(parent, &name)?;
        match existing {
            None => Ok(false),
            Some(file) => {
                let deleted = self.live(file)?.full_path.clone();
                self.invalidate();
                self.children_mut(parent)?.remove(&name);
                self.tombstone(NodeId::File(file));
                debug!(path = %deleted, "deleted file");
                Ok(true)
            }
        }
    }

    /// Resolve `path` below `at` to a file.
    ///
    /// `None` if the parent directory does not exist or the name holds no
    /// file.
    pub fn get_file(&self, at: DirId, path: impl Into<VfsPath>) -> Result<Option<FileId>, TreeError> {
        let path = path.into();
        self.live(at)?;
        if path.is_empty() {
            return Ok(None);
        }
        let Some(parent) = self.get_directory(at, path.parent())? else {
            return Ok(None);
        };
        match self.children(parent)?.get(path.file_name()) {
            Some(NodeId::File(file)) => Ok(Some(*file)),
            _ => Ok(None),
        }
    }

    /// Move a file, attached or independent, to `path` below `at`.
    pub fn move_file(&mut self, file: FileId, at: DirId, path: impl Into<VfsPath>) -> Result<(), TreeError> {
        let path = path.into();
        self.live(file)?;
        let (parent, name) = self.split_target(at, &path)?;
        if self.file_slot(parent, &name)? == Some(file) {
            return Ok(());
        }
        self.detach_file(file)?;
        self.attach_file(parent, name, file)
    }

    /// Write a new file with the same content as `file` at `path` below `at`.
    pub fn copy_file(&mut self, file: FileId, at: DirId, path: impl Into<VfsPath>) -> Result<FileId, TreeError> {
        let path = path.into();
        let content = self.file_content(file)?.clone();
        let (parent, name) = self.split_target(at, &path)?;
        self.file_slot(parent, &name)?;
        let copy = self.new_file(content);
        self.attach_file(parent, name, copy)?;
        Ok(copy)
    }

    pub fn file_content(&self, file: FileId) -> Result<&FileContent, TreeError> {
        match &self.live(file)?.kind {
            NodeKind::File { content } => Ok(content),
            NodeKind::Directory { .. } => Err(TreeError::UnknownNode(file.0.index)),
        }
    }

    /// Read a file's bytes. Shortcut files read through their provider.
    pub async fn read_all_bytes(&self, file: FileId) -> Result<Vec<u8>, TreeError> {
        match self.file_content(file)?.clone() {
            FileContent::Bytes(data) => Ok(data.to_vec()),
            FileContent::Shortcut(provider) => Ok(provider.read_all_bytes().await?),
        }
    }

    pub async fn read_all_text(&self, file: FileId) -> Result<String, TreeError> {
        let bytes = self.read_all_bytes(file).await?;
        String::from_utf8(bytes)
            .map_err(|_| TreeError::Provider(ProviderError::InvalidUtf8(self.full_path_lossy(file))))
    }

    fn full_path_lossy(&self, file: FileId) -> VfsPath {
        self.live(file).map(|n| n.full_path.clone()).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    /// Direct subdirectories of `path`, sorted by name.
    pub fn list_directories(&self, at: DirId, path: impl Into<VfsPath>) -> Result<Vec<DirId>, TreeError> {
        let dir = self.require_directory(at, &path.into())?;
        Ok(self
            .children(dir)?
            .values()
            .filter_map(|id| match id {
                NodeId::Dir(d) => Some(*d),
                NodeId::File(_) => None,
            })
            .collect())
    }

    /// Direct files of `path`, sorted by name.
    pub fn list_files(&self, at: DirId, path: impl Into<VfsPath>) -> Result<Vec<FileId>, TreeError> {
        let dir = self.require_directory(at, &path.into())?;
        Ok(self
            .children(dir)?
            .values()
            .filter_map(|id| match id {
                NodeId::File(f) => Some(*f),
                NodeId::Dir(_) => None,
            })
            .collect())
    }

    /// Every directory below `path`, depth-first. The start directory is
    /// not included.
    pub fn list_all_directories(&self, at: DirId, path: impl Into<VfsPath>) -> Result<Vec<DirId>, TreeError> {
        let start = self.require_directory(at, &path.into())?;
        Ok(self
            .walk(start)?
            .into_iter()
            .filter_map(|id| match id {
                NodeId::Dir(d) => Some(d),
                NodeId::File(_) => None,
            })
            .collect())
    }

    /// Every file below `path`, depth-first.
    pub fn list_all_files(&self, at: DirId, path: impl Into<VfsPath>) -> Result<Vec<FileId>, TreeError> {
        let start = self.require_directory(at, &path.into())?;
        Ok(self
            .walk(start)?
            .into_iter()
            .filter_map(|id| match id {
                NodeId::File(f) => Some(f),
                NodeId::Dir(_) => None,
            })
            .collect())
    }

    /// Pre-order traversal below `start`.
    fn walk(&self, start: DirId) -> Result<Vec<NodeId>, TreeError> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(start)?.values().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let NodeId::Dir(dir) = id {
                stack.extend(self.children(dir)?.values().rev().copied());
            }
            out.push(id);
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Node properties
    // ------------------------------------------------------------------

    /// Whether the node was deleted. Never fails; unknown ids report `false`.
    pub fn is_deleted(&self, id: impl Into<NodeId>) -> bool {
        matches!(self.live(id), Err(TreeError::Deleted(_)))
    }

    /// Whether the file is not attached to any directory.
    pub fn is_independent(&self, file: FileId) -> Result<bool, TreeError> {
        Ok(self.live(file)?.root.is_none())
    }

    pub fn name(&self, id: impl Into<NodeId>) -> Result<&str, TreeError> {
        Ok(&self.live(id)?.name)
    }

    pub fn full_path(&self, id: impl Into<NodeId>) -> Result<&VfsPath, TreeError> {
        Ok(&self.live(id)?.full_path)
    }

    pub fn parent(&self, id: impl Into<NodeId>) -> Result<Option<DirId>, TreeError> {
        Ok(self.live(id)?.parent)
    }

    /// The topmost ancestor; `None` for independent files.
    pub fn root_of(&self, id: impl Into<NodeId>) -> Result<Option<DirId>, TreeError> {
        Ok(self.live(id)?.root)
    }

    /// Number of arena slots, live or released.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn cached_lookups(&self) -> usize {
        self.cache().len()
    }
}
