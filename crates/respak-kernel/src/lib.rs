//! respak-kernel: storage-agnostic paths and reference-counted resources.
//!
//! This crate provides:
//!
//! - **I/O providers** ([`io`]): address files by logical path on disk, in
//!   memory, or nowhere at all ([`IoProvider::null`])
//! - **Virtual tree** ([`tree`]): an in-memory directory/file hierarchy with
//!   cached lookups and cascading deletion
//! - **Resources** ([`resource`]): handles that load on demand and unload
//!   after the last scope is returned, registries that index resource packs,
//!   and the catalog that ties registries together
//! - **Configuration** ([`CatalogConfig`]): pack discovery and selection

pub mod config;
pub mod io;
pub mod resource;
pub mod tree;

pub use config::CatalogConfig;
pub use io::{Backend, DiskBackend, IoProvider, MemoryBackend, NullBackend, ProviderError};
pub use resource::{
    AssetKind, AssetRegistry, CachedLoader, Decode, Language, LanguageRegistry, RegistryError,
    ResourceCatalog, ResourceHandle, ResourceLoader, ResourcePack, ResourceRegistry, ResourceScope,
};
pub use tree::{DirId, FileContent, FileId, NodeId, TreeError, VirtualTree};

// Re-export the value types callers need alongside the kernel.
pub use respak_glob::{ExtensionFilter, WildcardPattern};
pub use respak_types::{ResourceId, VfsPath};
