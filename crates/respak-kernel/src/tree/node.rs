//! Arena node types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use respak_types::VfsPath;

use super::TreeError;
use crate::io::IoProvider;

/// Address of an arena slot: which tree, which slot, and which occupant of
/// that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) struct Key {
    pub(super) tree: u32,
    pub(super) index: usize,
    pub(super) generation: u32,
}

/// Handle to a directory in a [`VirtualTree`](super::VirtualTree).
///
/// Ids stay meaningful after deletion: operations on them fail with
/// [`TreeError::Deleted`] even once the slot has been reused. Ids from
/// another tree are rejected with [`TreeError::UnknownNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirId(pub(super) Key);

/// Handle to a file in a [`VirtualTree`](super::VirtualTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(super) Key);

/// Either kind of node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Dir(DirId),
    File(FileId),
}

impl NodeId {
    pub(super) fn key(self) -> Key {
        match self {
            NodeId::Dir(DirId(key)) | NodeId::File(FileId(key)) => key,
        }
    }
}

impl From<DirId> for NodeId {
    fn from(id: DirId) -> Self {
        NodeId::Dir(id)
    }
}

impl From<FileId> for NodeId {
    fn from(id: FileId) -> Self {
        NodeId::File(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Dir(DirId(key)) => write!(f, "dir#{}.{}", key.index, key.generation),
            NodeId::File(FileId(key)) => write!(f, "file#{}.{}", key.index, key.generation),
        }
    }
}

/// What a file holds.
#[derive(Debug, Clone)]
pub enum FileContent {
    Bytes(Arc<[u8]>),
    /// Bytes are fetched from the provider on every read.
    Shortcut(IoProvider),
}

impl FileContent {
    pub fn is_shortcut(&self) -> bool {
        matches!(self, FileContent::Shortcut(_))
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(data: Vec<u8>) -> Self {
        FileContent::Bytes(Arc::from(data))
    }
}

impl From<&[u8]> for FileContent {
    fn from(data: &[u8]) -> Self {
        FileContent::Bytes(Arc::from(data))
    }
}

impl<const N: usize> From<[u8; N]> for FileContent {
    fn from(data: [u8; N]) -> Self {
        FileContent::Bytes(Arc::from(data.as_slice()))
    }
}

impl From<Arc<[u8]>> for FileContent {
    fn from(data: Arc<[u8]>) -> Self {
        FileContent::Bytes(data)
    }
}

impl From<IoProvider> for FileContent {
    fn from(provider: IoProvider) -> Self {
        FileContent::Shortcut(provider)
    }
}

#[derive(Debug)]
pub(super) enum NodeKind {
    Directory { children: BTreeMap<String, NodeId> },
    File { content: FileContent },
}

#[derive(Debug)]
pub(super) struct Node {
    /// Topmost ancestor. `None` only for independent files.
    pub(super) root: Option<DirId>,
    pub(super) parent: Option<DirId>,
    pub(super) name: String,
    pub(super) full_path: VfsPath,
    pub(super) kind: NodeKind,
}

impl Node {
    fn matches(&self, id: NodeId) -> bool {
        matches!(
            (id, &self.kind),
            (NodeId::Dir(_), NodeKind::Directory { .. }) | (NodeId::File(_), NodeKind::File { .. })
        )
    }
}

/// Lifecycle of a slot. `Live -> Deleted`; a deleted slot may later be
/// handed to a new node under the next generation.
#[derive(Debug)]
pub(super) enum Slot {
    Live(Node),
    /// Only the path survives, for errors on stale ids.
    Deleted { last_path: VfsPath },
}

/// One arena slot. `generation` increases each time the slot is released,
/// so ids of an earlier occupant stop matching.
#[derive(Debug)]
pub(super) struct Entry {
    pub(super) generation: u32,
    pub(super) slot: Slot,
}

impl Entry {
    /// The node `id` names, if it is still the live occupant.
    pub(super) fn check(&self, id: NodeId) -> Result<&Node, TreeError> {
        let key = id.key();
        match &self.slot {
            Slot::Live(node) if self.generation == key.generation => {
                if node.matches(id) {
                    Ok(node)
                } else {
                    Err(TreeError::UnknownNode(key.index))
                }
            }
            Slot::Deleted { last_path } if self.generation == key.generation.wrapping_add(1) => {
                Err(TreeError::Deleted(last_path.clone()))
            }
            _ if key.generation < self.generation => Err(TreeError::Deleted(VfsPath::empty())),
            _ => Err(TreeError::UnknownNode(key.index)),
        }
    }

    pub(super) fn check_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.check(id)?;
        match &mut self.slot {
            Slot::Live(node) => Ok(node),
            Slot::Deleted { .. } => Err(TreeError::UnknownNode(id.key().index)),
        }
    }
}
